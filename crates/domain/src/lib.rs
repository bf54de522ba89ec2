//! # BERCERT4U ドメイン層
//!
//! 通知リレーのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **永続化なし**: すべてのエンティティはリクエスト単位で生成・破棄される
//! - **検証はドメインで行う**: ワイヤ形式（JSON）の必須項目チェックは
//!   [`notification::payload`] が担い、検証済みの値だけが [`Notification`] になる
//! - **外部依存なし**: メール送信やテンプレートエンジンには依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘               ↑
//!       ─────────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`money`] - 見積金額と予約手数料
//! - [`notification`] - 通知イベント、テンプレート ID、メールメッセージ
//!
//! ## 使用例
//!
//! ```rust
//! use bercert_domain::money::QuoteAmount;
//!
//! let amount = QuoteAmount::new(300.0).unwrap();
//! assert_eq!(amount.balance_after_fee().to_string(), "280");
//! ```

pub mod money;
pub mod notification;

pub use notification::{Notification, NotificationError};
