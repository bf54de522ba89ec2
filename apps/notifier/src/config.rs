//! # Notifier 設定
//!
//! 環境変数から通知リレーサーバーの設定を読み込む。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFIER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NOTIFIER_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `smtp`） |
//! | `EMAIL_USER` | **Yes** | 送信元アドレス。SMTP の認証ユーザーも兼ねる |
//! | `EMAIL_PASS` | smtp のみ | SMTP 認証パスワード（アプリパスワード） |
//! | `SMTP_HOST` | No | デフォルト: `smtp.gmail.com` |
//! | `SMTP_TLS` | No | `tls` / `starttls` / `none`（デフォルト: `tls`） |
//! | `SMTP_PORT` | No | デフォルト: `tls` は 465、`starttls` は 587、`none` は 1025 |
//! | `SITE_URL` | No | メール内リンクの基点（デフォルト: `https://bercert4u.ie`） |
//! | `SUPPORT_EMAIL` | No | 問い合わせ先（デフォルト: `domesticfixesie@gmail.com`） |
//! | `MAIL_SEND_TIMEOUT_SECS` | No | 1 通あたりの送信タイムアウト秒（デフォルト: `30`） |

use std::{env, str::FromStr, time::Duration};

use bercert_infra::{SmtpSettings, SmtpTls};
use thiserror::Error;

/// 設定の読み込みエラー
///
/// いずれも起動を中止する。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("環境変数 {0} が設定されていません")]
    Missing(&'static str),

    #[error("環境変数 {name} の値が不正です: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// 通知リレーサーバーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// 通知設定
    pub notification: NotificationConfig,
}

/// メール送信バックエンド
#[derive(Debug, Clone)]
pub enum MailBackend {
    /// SMTP リレー経由で送信
    Smtp(SmtpSettings),
    /// Amazon SES v2 経由で送信（認証情報は AWS のデフォルトチェーン）
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
enum BackendKind {
    Smtp,
    Ses,
    Noop,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:       MailBackend,
    /// 送信元メールアドレス
    pub from_address:  String,
    /// メール内リンクの基点（末尾の `/` は除去済み）
    pub site_url:      String,
    /// 問い合わせ先メールアドレス
    pub support_email: String,
    /// 1 通あたりの送信タイムアウト
    pub send_timeout:  Duration,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の検索関数から設定を読み込む
    ///
    /// 空文字の値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        Ok(Self {
            host:         vars.get("NOTIFIER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port:         vars.parse("NOTIFIER_PORT")?.unwrap_or(3000),
            notification: NotificationConfig::from_vars(&vars)?,
        })
    }
}

impl NotificationConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let from_address = vars.require("EMAIL_USER")?;

        let send_timeout = Duration::from_secs(vars.parse("MAIL_SEND_TIMEOUT_SECS")?.unwrap_or(30));
        if send_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name:  "MAIL_SEND_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let backend = match vars.parse("NOTIFICATION_BACKEND")?.unwrap_or(BackendKind::Smtp) {
            BackendKind::Smtp => {
                let tls: SmtpTls = vars.parse("SMTP_TLS")?.unwrap_or_default();
                let default_port = match tls {
                    SmtpTls::Tls => 465,
                    SmtpTls::StartTls => 587,
                    SmtpTls::Plain => 1025,
                };
                MailBackend::Smtp(SmtpSettings {
                    host: vars
                        .get("SMTP_HOST")
                        .unwrap_or_else(|| "smtp.gmail.com".to_string()),
                    port: vars.parse("SMTP_PORT")?.unwrap_or(default_port),
                    tls,
                    username: from_address.clone(),
                    password: vars.require("EMAIL_PASS")?,
                    from_address: from_address.clone(),
                    // SMTP のソケットタイムアウトも送信タイムアウトに揃える
                    timeout: send_timeout,
                })
            }
            BackendKind::Ses => MailBackend::Ses,
            BackendKind::Noop => MailBackend::Noop,
        };

        Ok(Self {
            backend,
            from_address,
            site_url: vars
                .get("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://bercert4u.ie".to_string()),
            support_email: vars
                .get("SUPPORT_EMAIL")
                .unwrap_or_else(|| "domesticfixesie@gmail.com".to_string()),
            send_timeout,
        })
    }
}

struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn require(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(name)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { name, value })
            })
            .transpose()
    }
}
