pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use engine::ReflectionEngine;
use store::memory::MemoryStore;
use store::{DailyRecordStore, EntryStore, PromptStore};

#[derive(Clone)]
pub struct AppState {
    pub entries: Arc<dyn EntryStore>,
    pub records: Arc<dyn DailyRecordStore>,
    pub prompts: Arc<dyn PromptStore>,
    pub engine: Arc<ReflectionEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        records: Arc<dyn DailyRecordStore>,
        prompts: Arc<dyn PromptStore>,
        config: Arc<Config>,
    ) -> Self {
        let engine = Arc::new(ReflectionEngine::new(records.clone(), prompts.clone()));
        Self {
            entries,
            records,
            prompts,
            engine,
            config,
        }
    }

    /// All three stores backed by one in-memory instance. Used by the test
    /// suite and when no `DATABASE_URL` is configured.
    pub fn in_memory(config: Arc<Config>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, config)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ]),
        Err(_) => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        // Entries
        .route("/api/entries", post(handlers::entries::create_entry))
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries/:id", get(handlers::entries::get_entry))
        .route("/api/entries/:id", put(handlers::entries::update_entry))
        .route("/api/entries/:id", delete(handlers::entries::delete_entry))
        // Prompts
        .route("/api/prompts", get(handlers::prompts::list_prompts))
        .route("/api/prompts", post(handlers::prompts::create_prompt))
        .route("/api/prompts/random", get(handlers::prompts::random_prompt))
        .route("/api/prompts/daily", get(handlers::prompts::daily_prompt))
        .route(
            "/api/prompts/personalized",
            get(handlers::prompts::personalized_prompt),
        )
        .route("/api/prompts/:id", get(handlers::prompts::get_prompt))
        .route("/api/prompts/:id", put(handlers::prompts::update_prompt))
        .route("/api/prompts/:id", delete(handlers::prompts::delete_prompt))
        // Analytics
        .route("/api/analytics/streak", get(handlers::analytics::get_streak))
        .route(
            "/api/analytics/mood-timeline",
            get(handlers::analytics::mood_timeline),
        )
        .route(
            "/api/analytics/weekly",
            get(handlers::analytics::weekly_summary),
        )
        .route(
            "/api/analytics/monthly",
            get(handlers::analytics::monthly_summary),
        )
        .route(
            "/api/analytics/insights",
            get(handlers::analytics::get_insights),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
