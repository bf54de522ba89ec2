//! # Notifier エラー定義
//!
//! 通知リレー固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | エラー | ステータス | ボディ |
//! |--------|-----------|--------|
//! | JSON の構文・型不正 | 400 | `{"error": "<理由>"}` |
//! | 必須項目の不足 | 400 | `{"error": "Missing required fields: ..."}` |
//! | レンダリング・送信失敗 | 500 | `{"error": "<エンドポイント固有の文言>"}` |
//!
//! 500 の原因はログにのみ出力し、レスポンスには含めない。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bercert_domain::NotificationError;
use bercert_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

use crate::handler::NotificationEndpoint;

/// 通知リレーで発生するエラー
#[derive(Debug, Error)]
pub enum NotifierError {
    /// リクエストボディを JSON として解釈できない
    #[error("不正なリクエストボディ: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// 通知の検証・レンダリング・送信のいずれかに失敗
    #[error("{endpoint} の通知に失敗: {source}")]
    Notification {
        endpoint: NotificationEndpoint,
        #[source]
        source:   NotificationError,
    },
}

impl NotifierError {
    pub fn notification(endpoint: NotificationEndpoint, source: NotificationError) -> Self {
        Self::Notification { endpoint, source }
    }
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            NotifierError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(rejection.body_text()),
            ),
            NotifierError::Notification {
                source: NotificationError::MissingFields(fields),
                ..
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::missing_fields(&fields),
            ),
            NotifierError::Notification { endpoint, source } => {
                let (error_category, error_kind) = match &source {
                    NotificationError::TemplateFailed(_) => (category::INTERNAL, kind::TEMPLATE),
                    NotificationError::Timeout(_) => {
                        (category::EXTERNAL_SERVICE, kind::MAIL_TIMEOUT)
                    }
                    _ => (category::EXTERNAL_SERVICE, kind::MAIL_TRANSPORT),
                };
                tracing::error!(
                    error.category = error_category,
                    error.kind = error_kind,
                    endpoint = %endpoint,
                    "通知に失敗しました: {}",
                    source
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(endpoint.failure_message()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn into_parts(error: NotifierError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn 必須項目不足は400で項目を列挙する() {
        let error = NotifierError::notification(
            NotificationEndpoint::RequestSubmitted,
            NotificationError::MissingFields(vec![
                "customerEmail".to_string(),
                "requestDetails".to_string(),
            ]),
        );

        let (status, body) = into_parts(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"error": "Missing required fields: customerEmail, requestDetails"})
        );
    }

    #[rstest]
    #[case(NotificationEndpoint::BookingConfirmation, "Failed to send emails.")]
    #[case(NotificationEndpoint::SignupWelcome, "Failed to send signup email.")]
    #[case(NotificationEndpoint::RequestSubmitted, "Failed to send request email.")]
    #[case(NotificationEndpoint::QuoteAvailable, "Failed to send new quote email.")]
    #[tokio::test]
    async fn 送信失敗は500でエンドポイント固有の文言を返す(
        #[case] endpoint: NotificationEndpoint,
        #[case] expected: &str,
    ) {
        let error = NotifierError::notification(
            endpoint,
            NotificationError::SendFailed("535 authentication failed".to_string()),
        );

        let (status, body) = into_parts(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": expected}));
    }

    #[tokio::test]
    async fn 送信失敗の原因はレスポンスに含めない() {
        let error = NotifierError::notification(
            NotificationEndpoint::BookingConfirmation,
            NotificationError::Timeout(Duration::from_secs(30)),
        );

        let (_, body) = into_parts(error).await;

        assert!(!body.to_string().contains("30"));
    }
}
