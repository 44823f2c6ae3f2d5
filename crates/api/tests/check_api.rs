//! HTTP-level integration tests for the `/checks` resource.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router,
//! backed by a local cache store in a temporary directory.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_check, delete, get, local_app, post_empty, post_json, put_json, valid_check,
};
use serde_json::{json, Value};

fn with(mut base: Value, extra: Value) -> Value {
    for (k, v) in extra.as_object().unwrap() {
        base[k] = v.clone();
    }
    base
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_defaults() {
    let (app, _dir) = local_app();
    let body = with(valid_check(), json!({ "returnDate": "2025-01-01" }));

    let response = post_json(app, "/checks", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(!json["id"].as_str().unwrap().is_empty());
    assert_eq!(json["checkNumber"], "CHK-100");
    assert_eq!(json["amount"].as_f64(), Some(1500.0));
    assert_eq!(json["status"], "bounced");
    assert_eq!(json["returnDate"], "2025-01-01");
    assert_eq!(json["followUpDate"], "2025-01-15");
    assert_eq!(json["reason"], "");
    assert_eq!(json["paymentWay"], "");
    assert_eq!(json["cpvNumber"], "");
    assert_eq!(json["notes"], "");
}

#[tokio::test]
async fn explicit_follow_up_is_kept_without_return_date() {
    let (app, _dir) = local_app();
    let body = with(valid_check(), json!({ "followUpDate": "2025-03-01" }));

    let json = body_json(post_json(app, "/checks", body).await).await;
    assert_eq!(json["followUpDate"], "2025-03-01");
    assert_eq!(json["returnDate"], "");
}

#[tokio::test]
async fn return_date_overrides_explicit_follow_up() {
    let (app, _dir) = local_app();
    let body = with(
        valid_check(),
        json!({ "followUpDate": "2025-03-01", "returnDate": "2025-02-01" }),
    );

    let json = body_json(post_json(app, "/checks", body).await).await;
    assert_eq!(json["followUpDate"], "2025-02-15");
}

#[tokio::test]
async fn missing_date_defaults_to_today() {
    let (app, _dir) = local_app();
    let mut body = valid_check();
    body.as_object_mut().unwrap().remove("date");

    let json = body_json(post_json(app, "/checks", body).await).await;
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(json["date"], today.as_str());
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_id_returns_created_record() {
    let (app, _dir) = local_app();
    let created = body_json(post_json(app.clone(), "/checks", valid_check()).await).await;
    let id = created["id"].as_str().unwrap();

    let response = get(app, &format!("/checks/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let (app, _dir) = local_app();
    let response = get(app, "/checks/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_filters_by_search_and_status() {
    let (app, _dir) = local_app();
    create_check(&app, valid_check()).await;
    create_check(
        &app,
        with(
            valid_check(),
            json!({ "checkNumber": "CHK-200", "name": "Karim Adel", "building": "Tower C", "status": "pending" }),
        ),
    )
    .await;

    let all = body_json(get(app.clone(), "/checks").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let by_name = body_json(get(app.clone(), "/checks?q=layla").await).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);
    assert_eq!(by_name[0]["name"], "Layla Hassan");

    let by_building = body_json(get(app.clone(), "/checks?q=tower%20c").await).await;
    assert_eq!(by_building[0]["checkNumber"], "CHK-200");

    let by_status = body_json(get(app.clone(), "/checks?status=pending").await).await;
    assert_eq!(by_status.as_array().unwrap().len(), 1);
    assert_eq!(by_status[0]["status"], "pending");

    let everything = body_json(get(app, "/checks?status=all&q=").await).await;
    assert_eq!(everything.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_store_lists_empty_array() {
    let (app, _dir) = local_app();
    let response = get(app, "/checks").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_changes_only_status() {
    let (app, _dir) = local_app();
    let created = body_json(post_json(app.clone(), "/checks", valid_check()).await).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(app, &format!("/checks/{id}"), json!({ "status": "resolved" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut expected = created.clone();
    expected["status"] = json!("resolved");
    assert_eq!(body_json(response).await, expected);
}

#[tokio::test]
async fn update_can_clear_return_date() {
    let (app, _dir) = local_app();
    let id = create_check(&app, with(valid_check(), json!({ "returnDate": "2025-01-01" }))).await;

    let json = body_json(put_json(app, &format!("/checks/{id}"), json!({ "returnDate": "" })).await).await;
    assert_eq!(json["returnDate"], "");
    assert_eq!(json["followUpDate"], "2025-01-15");
}

#[tokio::test]
async fn update_accepts_matching_body_id() {
    let (app, _dir) = local_app();
    let id = create_check(&app, valid_check()).await;

    let response = put_json(
        app,
        &format!("/checks/{id}"),
        json!({ "id": id, "notes": "called tenant" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["notes"], "called tenant");
}

#[tokio::test]
async fn update_rejects_mismatched_body_id() {
    let (app, _dir) = local_app();
    let id = create_check(&app, valid_check()).await;

    let response = put_json(app, &format!("/checks/{id}"), json!({ "id": "other", "notes": "x" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn update_with_no_fields_is_bad_request() {
    let (app, _dir) = local_app();
    let id = create_check(&app, valid_check()).await;

    let response = put_json(app, &format!("/checks/{id}"), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_id_returns_404() {
    let (app, _dir) = local_app();
    let response = put_json(app, "/checks/12345", json!({ "status": "pending" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_then_get_returns_404() {
    let (app, _dir) = local_app();
    let id = create_check(&app, valid_check()).await;

    let response = delete(app.clone(), &format!("/checks/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let response = get(app.clone(), &format!("/checks/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app, &format!("/checks/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Follow-ups and stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn advance_follow_up_marks_retrieved_and_pushes_date() {
    let (app, _dir) = local_app();
    let id = create_check(&app, with(valid_check(), json!({ "returnDate": "2025-01-01" }))).await;

    let response = post_empty(app.clone(), &format!("/checks/{id}/advance-follow-up")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "retrieved");
    assert_eq!(json["followUpDate"], "2025-01-29");
    assert_eq!(json["name"], "Layla Hassan");

    let response = post_empty(app, "/checks/missing/advance-follow-up").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_count_statuses_and_overdue() {
    let (app, _dir) = local_app();
    create_check(&app, with(valid_check(), json!({ "returnDate": "2025-01-01" }))).await;
    create_check(
        &app,
        with(
            valid_check(),
            json!({ "amount": 500, "status": "resolved", "returnDate": "2025-01-01" }),
        ),
    )
    .await;
    create_check(
        &app,
        with(
            valid_check(),
            json!({ "amount": "250.5", "status": "deal_close", "cpvNumber": "CPV-1", "followUpDate": "2025-06-01" }),
        ),
    )
    .await;

    let response = get(app, "/checks/stats?as_of=2025-02-01").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["bounced"], 1);
    assert_eq!(json["resolved"], 1);
    assert_eq!(json["dealClose"], 1);
    assert_eq!(json["partialPaid"], 0);
    assert_eq!(json["totalAmount"].as_f64(), Some(2250.5));
    assert_eq!(json["dueFollowUps"], 1);
}

#[tokio::test]
async fn reminders_list_overdue_and_due_soon() {
    let (app, _dir) = local_app();
    let overdue = create_check(&app, with(valid_check(), json!({ "returnDate": "2025-01-01" }))).await;
    let soon = create_check(&app, with(valid_check(), json!({ "followUpDate": "2025-02-03" }))).await;
    create_check(&app, with(valid_check(), json!({ "followUpDate": "2025-04-01" }))).await;
    create_check(
        &app,
        with(valid_check(), json!({ "status": "resolved", "returnDate": "2025-01-01" })),
    )
    .await;

    let json = body_json(get(app, "/checks/reminders?as_of=2025-02-01").await).await;
    let reminders = json.as_array().unwrap();
    assert_eq!(reminders.len(), 2);

    assert_eq!(reminders[0]["id"], overdue.as_str());
    assert_eq!(reminders[0]["overdue"], true);
    assert_eq!(reminders[0]["daysUntil"], -17);

    assert_eq!(reminders[1]["id"], soon.as_str());
    assert_eq!(reminders[1]["overdue"], false);
    assert_eq!(reminders[1]["daysUntil"], 2);
}
