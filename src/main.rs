use std::sync::Arc;

use reverie_api::config::Config;
use reverie_api::store::postgres::{create_pool, PgStore};
use reverie_api::{build_router, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reverie_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let state = match config.database_url.as_deref() {
        Some(url) => {
            let db = create_pool(url).await;

            sqlx::migrate!("./migrations")
                .run(&db)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store = Arc::new(PgStore::new(db));
            AppState::new(store.clone(), store.clone(), store, config.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set; journal state will not survive restarts");
            AppState::in_memory(config.clone())
        }
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
