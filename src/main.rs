use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use agora_checkin::config::Config;
use agora_checkin::routes::create_routes;
use agora_checkin::store::{MemoryStore, PgStore, RecordStore};
use agora_checkin::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => Arc::new(
            PgStore::connect(database_url, config.max_connections)
                .await
                .expect("Failed to connect to database"),
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = create_routes(AppState::new(store, config.frame_queue));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Check-in server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
