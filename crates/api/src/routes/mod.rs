pub mod checks;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// ```text
/// /checks                              list, create
/// /checks/stats                        dashboard counters
/// /checks/reminders                    overdue and due-soon follow-ups
/// /checks/{id}                         get, update, delete
/// /checks/{id}/advance-follow-up       mark retrieved, push follow-up
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/checks", checks::router())
}
