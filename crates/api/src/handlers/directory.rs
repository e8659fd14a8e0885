//! Handlers exposing the HR directory operations

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use hrlink_domain::{AccountInfo, Employee, TimeEntry, WorkEntry, WorkedHoursRecord};

use super::{PageBody, RecordBody};
use crate::context::AppContext;
use crate::error::ApiError;
use crate::requests::{EmployeeQuery, TimeEntriesRequest, WorkEntriesRequest, WorkedHoursRequest};

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn account_info(State(ctx): State<AppContext>) -> ApiResult<RecordBody<AccountInfo>> {
    let fetched = ctx.directory.account_info().await?;
    Ok(Json(fetched.into()))
}

pub async fn list_employees(
    State(ctx): State<AppContext>,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> ApiResult<PageBody<Employee>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let page = ctx.directory.list_employees(&filter).await?;
    Ok(Json(page.into()))
}

pub async fn get_employee(
    State(ctx): State<AppContext>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<RecordBody<Employee>> {
    let Path(id) = id?;
    let fetched = ctx.directory.get_employee(&id).await?;
    Ok(Json(fetched.into()))
}

pub async fn list_worked_hours(
    State(ctx): State<AppContext>,
    body: Result<Json<WorkedHoursRequest>, JsonRejection>,
) -> ApiResult<PageBody<WorkedHoursRecord>> {
    let Json(request) = body?;
    let filter = request.into_filter()?;
    let page = ctx.directory.list_worked_hours(&filter).await?;
    Ok(Json(page.into()))
}

pub async fn list_work_entries(
    State(ctx): State<AppContext>,
    body: Result<Json<WorkEntriesRequest>, JsonRejection>,
) -> ApiResult<PageBody<WorkEntry>> {
    let Json(request) = body?;
    let filter = request.into_filter()?;
    let page = ctx.directory.list_work_entries(&filter).await?;
    Ok(Json(page.into()))
}

pub async fn list_time_entries(
    State(ctx): State<AppContext>,
    body: Result<Json<TimeEntriesRequest>, JsonRejection>,
) -> ApiResult<PageBody<TimeEntry>> {
    let Json(request) = body?;
    let filter = request.into_filter()?;
    let page = ctx.directory.list_time_entries(&filter).await?;
    Ok(Json(page.into()))
}
