//! # HTTP Server for Label Rendering
//!
//! Exposes previews, sheet capacity, composite generation and the QR codec
//! over HTTP. Paths in requests are resolved inside the asset directory.
//!
//! ## Usage
//!
//! ```bash
//! labelpress serve --listen 0.0.0.0:8080 --assets /srv/labels
//! ```
//!
//! ## Endpoints
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | POST | `/api/labels/preview` | `image/png` |
//! | GET | `/api/sheets/capacity` | packing layout JSON |
//! | POST | `/api/sheets/composite` | composite report JSON |
//! | GET | `/api/qr/encode` | `{payload, url}` |
//! | GET | `/api/qr/decode` | decoded fields |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::RenderConfig;
use crate::error::LabelError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/labels/preview", post(handlers::labels::preview))
        .route("/api/sheets/capacity", get(handlers::sheets::capacity))
        .route("/api/sheets/composite", post(handlers::sheets::composite))
        .route("/api/qr/encode", get(handlers::qr::encode))
        .route("/api/qr/decode", get(handlers::qr::decode))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use labelpress::config::RenderConfig;
/// use labelpress::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), labelpress::LabelError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     asset_root: "/srv/labels".into(),
/// };
///
/// serve(config, RenderConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, render: RenderConfig) -> Result<(), LabelError> {
    let app_state = Arc::new(AppState::new(config.clone(), render));
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            LabelError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        assets = %config.asset_root.display(),
        "labelpress HTTP server started"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| LabelError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
