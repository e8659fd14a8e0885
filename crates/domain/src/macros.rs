//! Macro for vendor enumerations with an explicit unknown bucket
//!
//! Vendor enumerations drift: new values appear without notice. Enums built
//! with this macro map every known spelling (case-insensitive, with aliases)
//! to a variant and keep anything else in an `Unknown(String)` variant
//! instead of failing.
//!
//! # Example
//!
//! ```rust
//! use hrlink_domain::impl_vendor_enum;
//!
//! #[derive(Debug, Clone, PartialEq, Eq)]
//! pub enum ShiftState {
//!     Open,
//!     Closed,
//!     Unknown(String),
//! }
//!
//! impl_vendor_enum!(ShiftState {
//!     Open => "open" | "opened",
//!     Closed => "closed",
//! });
//!
//! assert_eq!(ShiftState::from_vendor("OPENED"), ShiftState::Open);
//! assert_eq!(ShiftState::from_vendor("archived"), ShiftState::Unknown("archived".into()));
//! ```

/// Implements `from_vendor`, `as_str`, `Display` and `From<&str>` for a
/// vendor enum that has an `Unknown(String)` variant.
///
/// The first literal of each arm is the canonical spelling used by
/// `as_str`/`Display`; further literals are accepted aliases.
#[macro_export]
macro_rules! impl_vendor_enum {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $enum_name {
            /// Coerce a raw vendor value, falling back to `Unknown`.
            pub fn from_vendor(raw: &str) -> Self {
                let trimmed = raw.trim();
                match trimmed.to_lowercase().as_str() {
                    $($str $(| $alias)* => Self::$variant,)+
                    _ => Self::Unknown(trimmed.to_string()),
                }
            }

            /// Canonical spelling, or the raw vendor value for `Unknown`.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $str,)+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown(_))
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $enum_name {
            fn from(raw: &str) -> Self {
                Self::from_vendor(raw)
            }
        }
    };
}
