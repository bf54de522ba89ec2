//! # 通知ユースケース
//!
//! 通知要求からメールを生成し、送信する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`service`] - 検証 + レンダリング + 送信の統合サービス

pub mod service;
pub mod template_renderer;

pub use service::NotificationService;
pub use template_renderer::TemplateRenderer;
