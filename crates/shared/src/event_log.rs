//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側クレートは `tracing` に依存していること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.template`: 使用したテンプレート
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        /// 1 通のメールを送信した
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        /// 1 通のメールの送信に失敗した
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        /// 要求全体の送信が完了した
        pub const NOTIFICATION_DISPATCHED: &str = "notification.dispatched";
        /// 入力不備で要求を拒否した（送信は行っていない）
        pub const NOTIFICATION_REJECTED: &str = "notification.rejected";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const EMAIL_MESSAGE: &str = "email_message";
        pub const NOTIFICATION_REQUEST: &str = "notification_request";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 外部サービス呼び出し（SMTP リレー、SES）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// 自サービス内部（テンプレート等）
        pub const INTERNAL: &str = "internal";
    }

    /// エラー種別
    pub mod kind {
        pub const MAIL_TRANSPORT: &str = "mail_transport";
        pub const MAIL_TIMEOUT: &str = "mail_timeout";
        pub const TEMPLATE: &str = "template";
    }
}
