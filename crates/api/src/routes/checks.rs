//! Route definitions for the `/checks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::checks;
use crate::state::AppState;

/// Routes mounted at `/checks`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /stats                     -> stats
/// GET    /reminders                 -> list_reminders
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/advance-follow-up    -> advance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(checks::list).post(checks::create))
        .route("/stats", get(checks::stats))
        .route("/reminders", get(checks::list_reminders))
        .route(
            "/{id}",
            get(checks::get_by_id)
                .put(checks::update)
                .delete(checks::delete),
        )
        .route("/{id}/advance-follow-up", post(checks::advance))
}
