//! Defines the HTTP routes for the role dashboards.

use axum::routing::get;
use axum::Router;

use super::handlers::dashboard;
use crate::auth::access::AccessTable;
use crate::AppState;

/// One dashboard route per role-scoped prefix in `table`.
pub fn dashboard_router(table: &AccessTable) -> Router<AppState> {
    table
        .rules()
        .iter()
        .fold(Router::new(), |router, rule| {
            router.route(rule.prefix, get(dashboard))
        })
}
