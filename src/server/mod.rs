// file: src/server/mod.rs
// description: axum http api over the retrieval pipeline
// reference: https://docs.rs/axum
//
// | Method | Path          | Description                                  |
// |--------|---------------|----------------------------------------------|
// | GET    | `/health`     | Upstream health report                       |
// | POST   | `/documents`  | Semantic passage retrieval                   |
// | POST   | `/compress`   | Key-point compression of text chunks         |
// | POST   | `/answer`     | Retrieve, optionally compress, then answer   |
// | POST   | `/summarize`  | Summary or question-driven summary           |
// | POST   | `/embeddings` | Normalized sentence embeddings               |

pub mod handlers;

use crate::config::ServerConfig;
use crate::pipeline::RagPipeline;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::info;

pub use handlers::AppState;

pub fn router(pipeline: Arc<RagPipeline>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/documents", post(handlers::documents))
        .route("/compress", post(handlers::compress))
        .route("/answer", post(handlers::answer))
        .route("/summarize", post(handlers::summarize))
        .route("/embeddings", post(handlers::embeddings))
        .with_state(pipeline)
}

pub async fn serve(config: &ServerConfig, pipeline: Arc<RagPipeline>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}
