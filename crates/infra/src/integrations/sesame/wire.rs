//! Sesame wire format
//!
//! Lenient mirrors of the vendor JSON. Every field is optional so one bad
//! record never fails a whole page; required-field checks happen during
//! normalization, where they can be reported per record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response envelope shared by every Sesame endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl Meta {
    /// Cursor for the following page: an explicit `nextCursor` wins,
    /// otherwise the next page number while `currentPage < lastPage`.
    pub fn next_cursor(&self) -> Option<String> {
        if let Some(cursor) = self.next_cursor.as_ref().filter(|c| !c.trim().is_empty()) {
            return Some(cursor.clone());
        }
        match (self.current_page, self.last_page) {
            (Some(current), Some(last)) if current < last => Some((current + 1).to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WireRef {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireNamed {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireStamp {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireInfo {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<WireNamed>,
    #[serde(default)]
    pub plan: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEmployee {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub department: Option<WireNamed>,
    #[serde(default)]
    pub custom_fields: Option<Vec<WireCustomField>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireCustomField {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkedHours {
    #[serde(default, deserialize_with = "lenient_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee: Option<WireRef>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub seconds_worked: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub seconds_to_work: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub employee: Option<WireRef>,
    #[serde(default)]
    pub work_entry_type: Option<String>,
    #[serde(default)]
    pub work_entry_in: Option<WireStamp>,
    #[serde(default)]
    pub work_entry_out: Option<WireStamp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTimeEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub employee: Option<WireRef>,
    #[serde(default)]
    pub project: Option<WireNamed>,
    #[serde(default)]
    pub time_entry_in: Option<WireStamp>,
    #[serde(default)]
    pub time_entry_out: Option<WireStamp>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub worked_seconds: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tags: Option<WireTags>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireTags {
    #[serde(default)]
    pub data: Vec<WireNamed>,
}

/// Identifiers arrive as strings or numbers; blank strings count as absent.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))
        }
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_i64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

/// Sesame `workEntryType` of a clock interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalType {
    Work,
    Pause,
    Unknown(String),
}

hrlink_domain::impl_vendor_enum!(IntervalType {
    Work => "work" | "remote" | "online",
    Pause => "pause" | "break",
});

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn meta_prefers_explicit_cursor() {
        let meta: Meta =
            serde_json::from_value(json!({"currentPage": 1, "lastPage": 3, "nextCursor": "abc"}))
                .unwrap();
        assert_eq!(meta.next_cursor().as_deref(), Some("abc"));
    }

    #[test]
    fn meta_derives_next_page_number() {
        let meta: Meta =
            serde_json::from_value(json!({"currentPage": "2", "lastPage": 3})).unwrap();
        assert_eq!(meta.next_cursor().as_deref(), Some("3"));

        let last: Meta = serde_json::from_value(json!({"currentPage": 3, "lastPage": 3})).unwrap();
        assert_eq!(last.next_cursor(), None);
    }

    #[test]
    fn ids_accept_numbers_and_skip_blanks() {
        let numeric: WireRef = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(numeric.id.as_deref(), Some("42"));

        let blank: WireRef = serde_json::from_value(json!({"id": "  "})).unwrap();
        assert_eq!(blank.id, None);

        let missing: WireRef = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.id, None);
    }

    #[test]
    fn numeric_strings_are_accepted_for_seconds() {
        let row: WireWorkedHours =
            serde_json::from_value(json!({"employeeId": "E1", "secondsWorked": "3600"})).unwrap();
        assert_eq!(row.seconds_worked, Some(3600));
    }
}
