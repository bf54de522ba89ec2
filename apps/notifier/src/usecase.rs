//! # ユースケース層
//!
//! 通知要求の検証・メール生成・送信を統合する。

pub mod notification;

pub use notification::{NotificationService, TemplateRenderer};
