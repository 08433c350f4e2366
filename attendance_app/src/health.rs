//! Minimal HTTP endpoint so hosting platforms can tell the bot is alive.

use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use axum::routing::get;

use crate::config::HHealthConfig;
use crate::prelude::*;

/// Builds the health router.
pub fn router() -> Router {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> &'static str {
    "Bot is running!"
}

/// Serves the health endpoint until the process exits.
///
/// Returns immediately if the endpoint is disabled.
pub async fn serve(config: HHealthConfig) -> Result {
    if !config.enabled {
        log::debug!("Health endpoint disabled.");
        return Ok(());
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind health endpoint to {addr}"))?;

    log::info!("Health endpoint listening on {addr}.");
    axum::serve(listener, router())
        .await
        .context("health endpoint shut down unexpectedly")
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    use super::router;

    #[tokio::test]
    async fn root_reports_running() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).expect("valid request"))
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"Bot is running!");
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let response = router()
            .oneshot(Request::get("/status").body(Body::empty()).expect("valid request"))
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
