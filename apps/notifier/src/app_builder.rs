//! # Notifier アプリケーション構築
//!
//! 送信バックエンド・サービス・State の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use bercert_domain::NotificationError;
use bercert_infra::{
    NoopNotificationSender,
    NotificationSender,
    SesNotificationSender,
    SmtpNotificationSender,
};
use bercert_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::{MailBackend, NotificationConfig},
    handler::{
        NotificationEndpoint,
        NotifierState,
        health_check,
        send_booking_emails,
        send_new_quote_email,
        send_request_email,
        send_signup_emails,
    },
    usecase::{NotificationService, TemplateRenderer},
};

/// 設定に応じた送信バックエンドを作成する
pub async fn build_sender(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationSender>, NotificationError> {
    let sender: Arc<dyn NotificationSender> = match &config.backend {
        MailBackend::Smtp(settings) => Arc::new(SmtpNotificationSender::new(settings)?),
        MailBackend::Ses => {
            Arc::new(SesNotificationSender::from_env(config.from_address.clone()).await)
        }
        MailBackend::Noop => Arc::new(NoopNotificationSender),
    };
    Ok(sender)
}

/// 送信バックエンドからサービスを組み立てる
pub fn build_service(
    config: &NotificationConfig,
    sender: Arc<dyn NotificationSender>,
) -> Result<NotificationService, NotificationError> {
    let template_renderer = TemplateRenderer::new(&config.site_url, &config.support_email)?;
    Ok(NotificationService::new(
        sender,
        template_renderer,
        config.send_timeout,
    ))
}

/// ルーターを構築する
pub fn build_router(service: NotificationService) -> Router {
    let state = Arc::new(NotifierState { service });

    Router::new()
        .route("/health", get(health_check))
        .route(
            NotificationEndpoint::BookingConfirmation.path(),
            post(send_booking_emails),
        )
        .route(
            NotificationEndpoint::SignupWelcome.path(),
            post(send_signup_emails),
        )
        .route(
            NotificationEndpoint::RequestSubmitted.path(),
            post(send_request_email),
        )
        .route(
            NotificationEndpoint::QuoteAvailable.path(),
            post(send_new_quote_email),
        )
        .with_state(state)
        // 呼び出し元はブラウザ上のフロントエンド（任意のオリジン）
        .layer(CorsLayer::permissive())
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（クライアント提供値があればそれを使用）
        // 2. TraceLayer: request_id を含むスパンを作成
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. CanonicalLogLineLayer: スパン内で完了サマリを出力
        .layer(CanonicalLogLineLayer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
