//! # BERCERT4U インフラ層
//!
//! 外部システム（メールリレー）との通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **メール送信**: SMTP リレー / Amazon SES へのメッセージ送信
//! - **送信手段の抽象化**: [`notification::NotificationSender`] トレイトで
//!   アプリケーション層から送信手段を隠す
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと実装（SMTP / SES / Noop）
//! - `mock` - テスト用のモック送信（`test-utils` feature）

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use notification::{
    NoopNotificationSender,
    NotificationSender,
    SesNotificationSender,
    SmtpNotificationSender,
    SmtpSettings,
    SmtpTls,
};
