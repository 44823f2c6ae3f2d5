//! Handlers for the `/checks` resource.
//!
//! Bodies are validated before any store call. Every successful write
//! invalidates the list snapshot; every successful list refreshes it.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bounce_core::check::{CheckPatch, CheckRecord, NewCheck};
use bounce_core::follow_up::{advance_follow_up, reminders, Reminder};
use bounce_core::stats::CheckStats;
use bounce_core::types::today;
use bounce_store::normalize::normalize_id;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::query::{AsOfParams, ListParams};
use crate::response::{DeleteResponse, CHECKS_SOURCE_HEADER, SNAPSHOT_TAKEN_AT_HEADER};
use crate::state::AppState;

type JsonBody = Result<Json<Map<String, Value>>, JsonRejection>;

/// Fetch the full list and refresh the snapshot, unless a write landed
/// while the list was in flight.
async fn list_fresh(state: &AppState) -> AppResult<Vec<CheckRecord>> {
    let seen = state.cache.generation();
    let records = state.store.list().await?;
    state.cache.remember(seen, &records).await;
    Ok(records)
}

/// GET /checks
///
/// With `fallback=cache`, an unreachable store is answered from the last
/// snapshot, marked by the `x-checks-source: cache` header.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let filter = params.filter()?;
    let allows_cache = params.allows_cache()?;

    match list_fresh(&state).await {
        Ok(records) => Ok(Json(filter.apply(records)).into_response()),
        Err(AppError::Store(err)) if allows_cache && err.is_unavailable() => {
            let Some(snapshot) = state.cache.current().await else {
                return Err(err.into());
            };
            tracing::warn!(
                error = %err,
                taken_at = %snapshot.taken_at,
                "Serving check list from snapshot"
            );
            let taken_at = snapshot.taken_at.to_rfc3339();
            Ok((
                [
                    (CHECKS_SOURCE_HEADER, "cache"),
                    (SNAPSHOT_TAKEN_AT_HEADER, taken_at.as_str()),
                ],
                Json(filter.apply(snapshot.records)),
            )
                .into_response())
        }
        Err(err) => Err(err),
    }
}

/// POST /checks
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<CheckRecord>)> {
    let Json(candidate) = body?;
    let fields = NewCheck::from_candidate(candidate)?.into_fields(today());

    let record = state.store.create(&fields).await?;
    state.cache.invalidate().await;

    tracing::info!(id = %record.id, check_number = %record.fields.check_number, "Check created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /checks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CheckRecord>> {
    let record = state.store.get(&id).await?;
    Ok(Json(record))
}

/// PUT /checks/{id}
///
/// A body `id` is tolerated only when it names the same record. Present
/// fields are validated on their own; the CPV requirement is checked on the
/// stored record with the patch applied.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> AppResult<Json<CheckRecord>> {
    let Json(mut candidate) = body?;
    if let Some(body_id) = candidate.remove("id") {
        if normalize_id(&body_id).as_deref() != Some(id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "body id {body_id} does not match path id {id}"
            )));
        }
    }

    let patch = CheckPatch::from_candidate(candidate)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }
    let current = state.store.get(&id).await?;
    patch.merged_onto(&current.fields)?;

    let record = state.store.update(&id, &patch).await?;
    state.cache.invalidate().await;

    tracing::info!(id = %record.id, status = %record.fields.status, "Check updated");
    Ok(Json(record))
}

/// DELETE /checks/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    state.store.delete(&id).await?;
    state.cache.invalidate().await;

    tracing::info!(id = %id, "Check deleted");
    Ok(Json(DeleteResponse::ok()))
}

/// POST /checks/{id}/advance-follow-up
///
/// Marks the check retrieved and pushes its follow-up two weeks out.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CheckRecord>> {
    let current = state.store.get(&id).await?;
    let patch = advance_follow_up(&current);

    let record = state.store.update(&id, &patch).await?;
    state.cache.invalidate().await;

    tracing::info!(
        id = %record.id,
        follow_up_date = %record.fields.follow_up_date,
        "Follow-up advanced"
    );
    Ok(Json(record))
}

/// GET /checks/stats
pub async fn stats(
    State(state): State<AppState>,
    params: Result<Query<AsOfParams>, QueryRejection>,
) -> AppResult<Json<CheckStats>> {
    let Query(params) = params?;
    let day = params.day()?;
    let records = list_fresh(&state).await?;
    Ok(Json(CheckStats::compute(&records, day)))
}

/// GET /checks/reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    params: Result<Query<AsOfParams>, QueryRejection>,
) -> AppResult<Json<Vec<Reminder>>> {
    let Query(params) = params?;
    let day = params.day()?;
    let records = list_fresh(&state).await?;
    Ok(Json(reminders(&records, day)))
}
