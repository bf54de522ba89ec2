//! # テスト用モック送信
//!
//! ユースケース・ハンドラのテストで使用するインメモリのメール送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! bercert-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use bercert_domain::notification::{EmailMessage, NotificationError};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信要求を記録するモック
///
/// `attempts()` は失敗した呼び出しも含む全呼び出し、
/// `sent_emails()` は成功した呼び出しだけを返す。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    attempts: Arc<Mutex<Vec<EmailMessage>>>,
    sent:     Arc<Mutex<Vec<EmailMessage>>>,
    fail_on:  Option<usize>,
    delay:    Option<Duration>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// `call`（1 始まり）回目の呼び出しを失敗させる
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    /// 送信のたびに指定時間待機する
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<EmailMessage> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let call = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(email.clone());
            attempts.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on == Some(call) {
            return Err(NotificationError::SendFailed(format!(
                "mock: {call} 回目の送信を失敗させました"
            )));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
