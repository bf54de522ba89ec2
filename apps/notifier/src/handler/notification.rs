//! # 通知 API ハンドラ
//!
//! 通知イベントごとのエンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! | メソッド・パス | ボディ | 成功時メッセージ |
//! |---------------|--------|-----------------|
//! | `POST /send-emails` | [`BookingConfirmationPayload`] | `Emails sent successfully!` |
//! | `POST /send-signup-emails` | [`SignupWelcomePayload`] | `Signup email sent successfully!` |
//! | `POST /send-request-email` | [`RequestSubmittedPayload`] | `Request email sent successfully!` |
//! | `POST /send-new-quote-email` | [`QuoteAvailablePayload`] | `New quote email sent successfully!` |
//!
//! 失敗時のレスポンスは [`NotifierError`] を参照。

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use bercert_domain::notification::payload::{
    BookingConfirmationPayload,
    NotificationPayload,
    QuoteAvailablePayload,
    RequestSubmittedPayload,
    SignupWelcomePayload,
};
use bercert_shared::MessageResponse;

use crate::{error::NotifierError, usecase::NotificationService};

/// 通知ハンドラの State
pub struct NotifierState {
    pub service: NotificationService,
}

/// 通知エンドポイント
///
/// ルートとレスポンス文言の対応を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationEndpoint {
    BookingConfirmation,
    SignupWelcome,
    RequestSubmitted,
    QuoteAvailable,
}

impl NotificationEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::BookingConfirmation => "/send-emails",
            Self::SignupWelcome => "/send-signup-emails",
            Self::RequestSubmitted => "/send-request-email",
            Self::QuoteAvailable => "/send-new-quote-email",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::BookingConfirmation => "Emails sent successfully!",
            Self::SignupWelcome => "Signup email sent successfully!",
            Self::RequestSubmitted => "Request email sent successfully!",
            Self::QuoteAvailable => "New quote email sent successfully!",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::BookingConfirmation => "Failed to send emails.",
            Self::SignupWelcome => "Failed to send signup email.",
            Self::RequestSubmitted => "Failed to send request email.",
            Self::QuoteAvailable => "Failed to send new quote email.",
        }
    }
}

/// POST /send-emails
///
/// 予約確定メールを顧客 → 事業者の順に送信する。
pub async fn send_booking_emails(
    State(state): State<Arc<NotifierState>>,
    payload: Result<Json<BookingConfirmationPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, NotifierError> {
    dispatch(&state, NotificationEndpoint::BookingConfirmation, payload).await
}

/// POST /send-signup-emails
pub async fn send_signup_emails(
    State(state): State<Arc<NotifierState>>,
    payload: Result<Json<SignupWelcomePayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, NotifierError> {
    dispatch(&state, NotificationEndpoint::SignupWelcome, payload).await
}

/// POST /send-request-email
pub async fn send_request_email(
    State(state): State<Arc<NotifierState>>,
    payload: Result<Json<RequestSubmittedPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, NotifierError> {
    dispatch(&state, NotificationEndpoint::RequestSubmitted, payload).await
}

/// POST /send-new-quote-email
pub async fn send_new_quote_email(
    State(state): State<Arc<NotifierState>>,
    payload: Result<Json<QuoteAvailablePayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, NotifierError> {
    dispatch(&state, NotificationEndpoint::QuoteAvailable, payload).await
}

async fn dispatch<P: NotificationPayload>(
    state: &NotifierState,
    endpoint: NotificationEndpoint,
    payload: Result<Json<P>, JsonRejection>,
) -> Result<Json<MessageResponse>, NotifierError> {
    let Json(payload) = payload?;

    state
        .service
        .dispatch(payload)
        .await
        .map_err(|e| NotifierError::notification(endpoint, e))?;

    Ok(Json(MessageResponse::new(endpoint.success_message())))
}
