//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（Gmail 等のリレー）、SES（AWS）、Noop（開発用）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **プロセス単位で 1 インスタンス**: 起動時に生成し `Arc` で共有する。
//!   実装は内部に可変状態を持たない

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
use bercert_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSettings, SmtpTls};

/// メール送信トレイト
///
/// 通知リレーの外部協調者。送信元アドレスは実装が保持する。
/// `Ok(())` はリレーが受理したことを意味し、配送完了は保証しない。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
