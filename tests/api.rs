use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use reverie_api::config::Config;
use reverie_api::{build_router, AppState};

fn test_app() -> Router {
    let config = Arc::new(Config {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
    });
    build_router(AppState::in_memory(config))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn creating_an_entry_feeds_streak_and_timeline() {
    let app = test_app();

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({
            "content": "five words of quiet reflection",
            "mood": "🌟",
            "mood_score": 8
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["word_count"], 5);

    let (status, streak) = send(&app, Method::GET, "/api/analytics/streak", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["current_streak"], 1);
    assert_eq!(streak["longest_streak"], 1);

    let (status, timeline) =
        send(&app, Method::GET, "/api/analytics/mood-timeline?days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    let days = timeline.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["entries_count"], 1);
    assert_eq!(days[0]["total_word_count"], 5);
    assert_eq!(days[0]["daily_mood"], "🌟");
}

#[tokio::test]
async fn invalid_entries_are_rejected_before_any_state_change() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "content": "fine", "mood_score": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, streak) = send(&app, Method::GET, "/api/analytics/streak", None).await;
    assert_eq!(streak["current_streak"], 0);
    assert_eq!(streak["longest_streak"], 0);
}

#[tokio::test]
async fn entry_crud_round_trip_keeps_analytics_in_step() {
    let app = test_app();

    let (_, entry) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "content": "first draft of the morning" })),
    )
    .await;
    let id = entry["id"].as_str().unwrap().to_string();

    let (status, listing) = send(&app, Method::GET, "/api/entries?page=1&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["pagination"]["total"], 1);
    assert_eq!(listing["entries"][0]["id"], entry["id"]);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{}", id),
        Some(json!({ "content": "rewritten" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["word_count"], 1);

    let (_, timeline) =
        send(&app, Method::GET, "/api/analytics/mood-timeline?days=7", None).await;
    assert_eq!(timeline[0]["entries_count"], 1);
    assert_eq!(timeline[0]["total_word_count"], 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/entries/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/entries/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, streak) = send(&app, Method::GET, "/api/analytics/streak", None).await;
    assert_eq!(streak["current_streak"], 0);
}

#[tokio::test]
async fn prompt_selection_404s_on_an_empty_pool() {
    let app = test_app();

    for uri in [
        "/api/prompts/random",
        "/api/prompts/daily",
        "/api/prompts/personalized",
    ] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} should 404", uri);
    }
}

#[tokio::test]
async fn prompt_lifecycle_with_soft_delete() {
    let app = test_app();

    let (status, prompt) = send(
        &app,
        Method::POST,
        "/api/prompts",
        Some(json!({
            "question": "What are you grateful for today?",
            "title": "Gratitude check",
            "category": "gratitude",
            "priority": 7
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = prompt["id"].as_str().unwrap().to_string();

    let (status, picked) = send(&app, Method::GET, "/api/prompts/daily", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(picked["id"], prompt["id"]);
    assert_eq!(picked["usage_count"], 1);
    assert!(!picked["last_used"].is_null());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/prompts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/prompts/random", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = send(&app, Method::GET, "/api/prompts", None).await;
    assert_eq!(listing["pagination"]["total"], 0);
}

#[tokio::test]
async fn personalized_prompt_rejects_unknown_topics() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/prompts/personalized?topics=nonsense",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn monthly_summary_and_insights_reflect_journaled_days() {
    let app = test_app();

    send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "content": "an evening of writing", "mood": "😌" })),
    )
    .await;

    let (status, monthly) = send(&app, Method::GET, "/api/analytics/monthly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(monthly.as_array().unwrap().len(), 1);

    let (status, weekly) = send(&app, Method::GET, "/api/analytics/weekly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weekly.as_array().unwrap().len(), 1);

    let (status, insights) = send(&app, Method::GET, "/api/analytics/insights", None).await;
    assert_eq!(status, StatusCode::OK);
    let insights = insights.as_array().unwrap();
    assert!(insights
        .iter()
        .any(|i| i["type"] == "consistency" && i["data"]["active_days"] == 1));

    let (status, _) = send(&app, Method::GET, "/api/analytics/monthly?month=13", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
