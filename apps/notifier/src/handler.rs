//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、検証・レンダリング・送信は [`NotificationService`] に委譲
//!
//! [`NotificationService`]: crate::usecase::NotificationService

pub mod health;
pub mod notification;

pub use health::health_check;
pub use notification::{
    NotificationEndpoint,
    NotifierState,
    send_booking_emails,
    send_new_quote_email,
    send_request_email,
    send_signup_emails,
};
