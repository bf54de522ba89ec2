//! # BERCERT4U 共有ユーティリティ
//!
//! 通知リレーの各クレートで使用する共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - HTTP サーバー周りの依存（tracing-subscriber, tower-http）は
//!   `observability` feature の背後に置く

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod message_response;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
pub use message_response::MessageResponse;
