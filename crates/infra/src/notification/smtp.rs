//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 本番では Gmail 等の SMTP リレーに認証付きで接続し、
//! 開発環境では Mailpit（ローカル SMTP サーバー）に平文で接続する。

use std::time::Duration;

use async_trait::async_trait;
use bercert_domain::notification::{EmailBody, EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::NotificationSender;

/// SMTP 接続の暗号化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SmtpTls {
    /// 接続直後から TLS（ポート 465）
    #[default]
    Tls,
    /// STARTTLS で昇格（ポート 587）
    StartTls,
    /// 暗号化なし・認証なし（Mailpit 等のローカル SMTP 向け）
    #[strum(serialize = "none")]
    Plain,
}

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名（例: "smtp.gmail.com"）
    pub host:         String,
    /// SMTP サーバーのポート番号
    pub port:         u16,
    /// 暗号化方式
    pub tls:          SmtpTls,
    /// 認証ユーザー名
    pub username:     String,
    /// 認証パスワード（アプリパスワード）
    pub password:     String,
    /// 送信元メールアドレス
    pub from_address: String,
    /// 接続・応答のタイムアウト
    pub timeout:      Duration,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// 起動時に 1 つだけ生成し、リクエスト間で共有する。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 送信元アドレスの形式不正や TLS 設定の構築失敗はここでエラーになる
    /// （起動時に検出する）。接続はまだ行わない。
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let from: Mailbox = settings
            .from_address
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("送信元アドレス不正: {e}")))?;

        let transport = match settings.tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map(|b| b.credentials(Self::credentials(settings))),
            SmtpTls::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map(|b| b.credentials(Self::credentials(settings)))
            }
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            SmtpTls::Plain => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &settings.host,
            )),
        }
        .map_err(|e| NotificationError::SendFailed(format!("SMTP トランスポート構築失敗: {e}")))?
        .port(settings.port)
        .timeout(Some(settings.timeout))
        .build();

        tracing::debug!(
            host = %settings.host,
            port = settings.port,
            tls = %settings.tls,
            "SMTP トランスポートを構築しました"
        );

        Ok(Self { transport, from })
    }

    fn credentials(settings: &SmtpSettings) -> Credentials {
        Credentials::new(settings.username.clone(), settings.password.clone())
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message, NotificationError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("宛先アドレス不正: {e}")))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject);

        match &email.body {
            EmailBody::Text(text) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
            EmailBody::Html(html) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        }
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}
