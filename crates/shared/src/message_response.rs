//! # 成功レスポンス
//!
//! 通知エンドポイントが成功時に返す `{"message": "..."}` 形式のレスポンス。

use serde::{Deserialize, Serialize};

/// 成功メッセージ
///
/// ## 使用例
///
/// ```
/// use bercert_shared::MessageResponse;
///
/// let response = MessageResponse::new("Emails sent successfully!");
/// assert_eq!(response.message, "Emails sent successfully!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
