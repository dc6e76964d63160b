//! Liveness endpoint for load balancers and orchestrators.

use axum::http::StatusCode;

/// Simple health check endpoint (for basic liveness).
///
/// Does not touch the store; a database outage shows up as 503s on the order
/// endpoint instead.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
