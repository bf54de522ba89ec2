//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発や送信を止めたい環境で使用する。

use async_trait::async_trait;
use bercert_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            html = email.body.is_html(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bercert_domain::notification::EmailBody;

    use super::*;

    #[tokio::test]
    async fn send_emailがエラーを返さない() {
        let sender = NoopNotificationSender;
        let email = EmailMessage {
            to:      "test@example.com".to_string(),
            subject: "テスト件名".to_string(),
            body:    EmailBody::Html("<p>テスト</p>".to_string()),
        };

        let result = sender.send_email(&email).await;
        assert!(result.is_ok());
    }
}
