//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。
//! 認証情報は AWS のデフォルトチェーン（環境変数、IAM ロール等）から取得する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use bercert_domain::notification::{EmailBody, EmailMessage, NotificationError};

use super::NotificationSender;

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
pub struct SesNotificationSender {
    client:       Client,
    from_address: String,
}

impl SesNotificationSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }

    /// AWS のデフォルト設定からクライアントを作成する
    pub async fn from_env(from_address: String) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), from_address)
    }
}

fn content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{part}構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let destination = Destination::builder().to_addresses(&email.to).build();

        let body = match &email.body {
            EmailBody::Text(text) => Body::builder().text(content(text, "テキスト本文")?),
            EmailBody::Html(html) => Body::builder().html(content(html, "HTML 本文")?),
        }
        .build();

        let message = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(content(&email.subject, "件名")?)
                    .body(body)
                    .build(),
            )
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(message)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}
