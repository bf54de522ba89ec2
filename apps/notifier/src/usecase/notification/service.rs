//! # 通知サービス
//!
//! 必須項目の検証 → テンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **同期送信**: 送信結果を待ってから応答する。失敗は呼び出し元にそのまま返す
//! - **全件レンダリングしてから送信**: レンダリング失敗時は 1 通も送らない
//! - **逐次送信・最大 1 回**: 前のメールの送信に失敗したら以降は試行しない（再送なし）
//! - **送信ごとのタイムアウト**: `tokio::time::timeout` で上限を設け、超過は送信失敗として扱う
//! - **依存性注入**: `NotificationSender` は trait オブジェクトで受け取る

use std::{sync::Arc, time::Duration};

use bercert_domain::notification::{
    EmailMessage,
    NotificationError,
    payload::NotificationPayload,
};
use bercert_infra::NotificationSender;
use bercert_shared::{event_log::event, log_business_event};

use super::TemplateRenderer;

/// 通知サービス
pub struct NotificationService {
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    send_timeout:      Duration,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        send_timeout: Duration,
    ) -> Self {
        Self {
            sender,
            template_renderer,
            send_timeout,
        }
    }

    /// 通知要求を処理する
    ///
    /// 成功時は送信したメールの件数を返す。
    ///
    /// # エラー
    ///
    /// - [`NotificationError::MissingFields`]: 必須項目の不足（送信なし）
    /// - [`NotificationError::TemplateFailed`]: レンダリング失敗（送信なし）
    /// - [`NotificationError::SendFailed`] / [`NotificationError::Timeout`]:
    ///   送信失敗。それ以前のメールは送信済みのまま
    pub async fn dispatch<P: NotificationPayload>(
        &self,
        payload: P,
    ) -> Result<usize, NotificationError> {
        let event_type: &str = P::EVENT_TYPE.into();

        let notification = payload.into_notification().inspect_err(|e| {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_REJECTED,
                event.entity_type = event::entity_type::NOTIFICATION_REQUEST,
                event.result = event::result::FAILURE,
                notification.event_type = event_type,
                error = %e,
                "通知要求を拒否"
            );
        })?;

        let emails = self
            .template_renderer
            .render_notification(&notification)
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    notification.event_type = event_type,
                    "通知テンプレートのレンダリングに失敗"
                );
            })?;

        let total = emails.len();
        for (index, email) in emails.iter().enumerate() {
            let step = index + 1;
            match self.send(email).await {
                Ok(()) => {
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::NOTIFICATION_SENT,
                        event.entity_type = event::entity_type::EMAIL_MESSAGE,
                        event.result = event::result::SUCCESS,
                        notification.event_type = event_type,
                        notification.recipient = %email.to,
                        notification.step = step,
                        notification.total = total,
                        "通知メール送信成功"
                    );
                }
                Err(e) => {
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::NOTIFICATION_FAILED,
                        event.entity_type = event::entity_type::EMAIL_MESSAGE,
                        event.result = event::result::FAILURE,
                        notification.event_type = event_type,
                        notification.recipient = %email.to,
                        notification.step = step,
                        notification.total = total,
                        notification.accepted = index,
                        error = %e,
                        "通知メール送信失敗"
                    );
                    return Err(e);
                }
            }
        }

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_DISPATCHED,
            event.entity_type = event::entity_type::NOTIFICATION_REQUEST,
            event.result = event::result::SUCCESS,
            notification.event_type = event_type,
            notification.total = total,
            "通知要求を処理"
        );

        Ok(total)
    }

    async fn send(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tokio::time::timeout(self.send_timeout, self.sender.send_email(email))
            .await
            .map_err(|_| NotificationError::Timeout(self.send_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use bercert_domain::notification::payload::{
        BookingConfirmationPayload,
        QuoteAvailablePayload,
        SignupWelcomePayload,
    };
    use bercert_infra::mock::MockNotificationSender;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_service(sender: MockNotificationSender, send_timeout: Duration) -> NotificationService {
        let template_renderer =
            TemplateRenderer::new("https://bercert4u.ie", "domesticfixesie@gmail.com").unwrap();
        NotificationService::new(Arc::new(sender), template_renderer, send_timeout)
    }

    fn booking_payload() -> BookingConfirmationPayload {
        serde_json::from_value(serde_json::json!({
            "customerEmail": "jane@example.com",
            "handymanEmail": "bob@example.com",
            "customerDetails": {"name": "Jane", "phone": "087 123 4567", "county": "Cork"},
            "handymanDetails": {"name": "Bob", "email": "bob.walsh@example.com"},
            "quoteAmount": 300
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn 予約確定は顧客_事業者の順に二通送信する() {
        let sender = MockNotificationSender::new();
        let service = make_service(sender.clone(), Duration::from_secs(5));

        let sent = service.dispatch(booking_payload()).await.unwrap();

        assert_eq!(sent, 2);
        let recipients: Vec<String> = sender.sent_emails().into_iter().map(|e| e.to).collect();
        assert_eq!(recipients, vec!["jane@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn 一通目の送信に失敗したら二通目は試行しない() {
        let sender = MockNotificationSender::failing_on(1);
        let service = make_service(sender.clone(), Duration::from_secs(5));

        let result = service.dispatch(booking_payload()).await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert_eq!(sender.attempts().len(), 1);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn 二通目の失敗でも一通目は送信済みのまま() {
        let sender = MockNotificationSender::failing_on(2);
        let service = make_service(sender.clone(), Duration::from_secs(5));

        let result = service.dispatch(booking_payload()).await;

        assert!(result.is_err());
        assert_eq!(sender.attempts().len(), 2);
        let sent: Vec<String> = sender.sent_emails().into_iter().map(|e| e.to).collect();
        assert_eq!(sent, vec!["jane@example.com"]);
    }

    #[tokio::test]
    async fn 必須項目不足では送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(sender.clone(), Duration::from_secs(5));

        let result = service
            .dispatch(QuoteAvailablePayload::default())
            .await;

        assert!(matches!(result, Err(NotificationError::MissingFields(_))));
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn 送信がタイムアウトを超えたらtimeoutを返す() {
        let sender = MockNotificationSender::with_delay(Duration::from_secs(60));
        let service = make_service(sender.clone(), Duration::from_secs(30));
        let payload: SignupWelcomePayload = serde_json::from_value(serde_json::json!({
            "userEmail": "ann@example.com",
            "userDetails": {"name": "Ann"}
        }))
        .unwrap();

        let result = service.dispatch(payload).await;

        assert!(matches!(
            result,
            Err(NotificationError::Timeout(d)) if d == Duration::from_secs(30)
        ));
        assert!(sender.sent_emails().is_empty());
    }
}
