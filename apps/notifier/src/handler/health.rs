//! # ヘルスチェックハンドラ
//!
//! ロードバランサーやコンテナの liveness probe 向け。
//! メール送信バックエンドへの疎通は確認しない。
//!
//! ```text
//! GET /health
//! ```

use axum::Json;
use bercert_shared::HealthResponse;

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_checkはhealthyとバージョンを返す() {
        // Given
        let sut = Router::new().route("/health", get(health_check));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, HealthResponse::healthy(env!("CARGO_PKG_VERSION")));
    }
}
