//! Router assembly

use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::context::AppContext;
use crate::handlers;
use crate::middleware::{request_span, require_api_key};

/// Full service router: open `/health` plus the authenticated `/api/v1`
/// surface, every request wrapped in a request-id span.
pub fn router(ctx: AppContext) -> Router {
    let api = Router::new()
        .route("/account", get(handlers::account_info))
        .route("/employees", get(handlers::list_employees))
        .route("/employees/{id}", get(handlers::get_employee))
        .route("/worked-hours", post(handlers::list_worked_hours))
        .route("/work-entries", post(handlers::list_work_entries))
        .route("/time-entries", post(handlers::list_time_entries))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_api_key));

    Router::new()
        .route("/health", get(handlers::healthcheck))
        .nest("/api/v1", api)
        .layer(middleware::from_fn(request_span))
        .with_state(ctx)
}
