//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Notification`] | 通知イベント | 検証済みの通知要求。4 種類 |
//! | [`NotificationEventType`] | 通知イベント種別 | 予約確定、登録完了、依頼受付、見積到着 |
//! | [`TemplateId`] | テンプレート ID | 件名・本文形式を持つテンプレートの登録簿 |
//! | [`EmailMessage`] | メールメッセージ | レンダリング結果。送信 1 回分 |
//!
//! ## 設計方針
//!
//! - **enum による通知イベント**: 各バリアントが HTTP エンドポイント 1 つに対応
//! - **同期送信**: 送信結果は呼び出し元にそのまま返す（キューイング・再送なし）
//! - **テンプレート分離**: 通知イベントとメール生成は分離（TemplateRenderer は notifier）

pub mod payload;

use std::time::Duration;

use strum::IntoStaticStr;
use thiserror::Error;

use crate::money::QuoteAmount;

/// 通知エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 必須項目の不足（JSON パスの一覧）
    #[error("必須項目が不足しています: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// メール送信がタイムアウト
    #[error("メール送信がタイムアウトしました（{0:?}）")]
    Timeout(Duration),
}

/// 通知イベント種別
///
/// ログの `notification.event_type` フィールドに出力される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationEventType {
    /// 予約確定: 顧客と事業者の双方に送信
    BookingConfirmed,
    /// アカウント登録完了: 登録したユーザーに送信
    SignupWelcome,
    /// 依頼受付: 依頼を送信した顧客に送信
    RequestSubmitted,
    /// 見積到着: 顧客に送信
    QuoteAvailable,
}

/// ユーザー種別
///
/// `userType` が `"customer"` のときだけ顧客、それ以外（空文字・未指定を含む）は
/// すべて事業者として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    Customer,
    Provider,
}

impl UserRole {
    /// `userType` の値からユーザー種別を決定する
    pub fn from_user_type(user_type: Option<&str>) -> Self {
        match user_type {
            Some("customer") => Self::Customer,
            _ => Self::Provider,
        }
    }
}

/// 宛先（メールアドレス + 表示名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub name:  String,
}

/// 依頼内容
///
/// 物件の属性。すべて任意項目で、指定されたものだけがメールに表示される。
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub property_type:   Option<String>,
    pub property_size:   Option<String>,
    pub bedrooms:        Option<u32>,
    pub county:          Option<String>,
    pub address:         Option<String>,
    pub preferred_date:  Option<String>,
    pub additional_info: Option<String>,
}

/// 通知イベント（検証済み）
///
/// [`payload`] モジュールのリクエスト型から変換される。
/// 各テンプレートが参照する項目はすべて揃っている。
#[derive(Debug, Clone)]
pub enum Notification {
    /// 予約確定: 顧客 → 事業者の順に 2 通送信
    BookingConfirmed {
        customer:         Recipient,
        customer_phone:   String,
        customer_county:  Option<String>,
        provider:         Recipient,
        provider_contact: String,
        quote_amount:     QuoteAmount,
    },
    /// アカウント登録完了: ユーザー種別でテンプレートを切り替える
    SignupWelcome { user: Recipient, role: UserRole },
    /// 依頼受付: ログイン済みかどうかで案内リンクを切り替える
    RequestSubmitted {
        customer:       Recipient,
        customer_phone: Option<String>,
        request:        RequestDetails,
        is_signed_up:   bool,
    },
    /// 見積到着: 顧客に事業者名と金額を知らせる
    QuoteAvailable {
        customer:      Recipient,
        provider_name: String,
        quote_amount:  QuoteAmount,
    },
}

impl Notification {
    /// 通知イベント種別を返す
    pub fn event_type(&self) -> NotificationEventType {
        match self {
            Self::BookingConfirmed { .. } => NotificationEventType::BookingConfirmed,
            Self::SignupWelcome { .. } => NotificationEventType::SignupWelcome,
            Self::RequestSubmitted { .. } => NotificationEventType::RequestSubmitted,
            Self::QuoteAvailable { .. } => NotificationEventType::QuoteAvailable,
        }
    }

    /// 送信するテンプレートと宛先アドレスを送信順に返す
    pub fn deliveries(&self) -> Vec<(TemplateId, &str)> {
        match self {
            Self::BookingConfirmed {
                customer, provider, ..
            } => vec![
                (TemplateId::BookingCustomer, customer.email.as_str()),
                (TemplateId::BookingProvider, provider.email.as_str()),
            ],
            Self::SignupWelcome { user, role } => {
                let template = match role {
                    UserRole::Customer => TemplateId::SignupCustomer,
                    UserRole::Provider => TemplateId::SignupProvider,
                };
                vec![(template, user.email.as_str())]
            }
            Self::RequestSubmitted { customer, .. } => {
                vec![(TemplateId::RequestSubmitted, customer.email.as_str())]
            }
            Self::QuoteAvailable { customer, .. } => {
                vec![(TemplateId::QuoteAvailable, customer.email.as_str())]
            }
        }
    }
}

/// 本文形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Text,
    Html,
}

/// テンプレート ID
///
/// テンプレートの登録簿。件名は固定文言で、差し込みは本文のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TemplateId {
    BookingCustomer,
    BookingProvider,
    SignupCustomer,
    SignupProvider,
    RequestSubmitted,
    QuoteAvailable,
}

impl TemplateId {
    /// 件名
    pub fn subject(&self) -> &'static str {
        match self {
            Self::BookingCustomer => "Your BER Certificate Booking with BERCERT4U is Confirmed!",
            Self::BookingProvider => "New BER Certificate Request Assigned to You!",
            Self::SignupCustomer => "Welcome to BERCERT4U – Your Account is Ready 🎉",
            Self::SignupProvider => "BERCERT4U Assessor Account Created – Welcome Aboard ✅",
            Self::RequestSubmitted => "We've Received Your BER Certification Request",
            Self::QuoteAvailable => "A New Quote is Available for Your BER Certification",
        }
    }

    /// 本文形式
    pub fn format(&self) -> BodyFormat {
        match self {
            Self::BookingCustomer | Self::BookingProvider => BodyFormat::Text,
            Self::SignupCustomer
            | Self::SignupProvider
            | Self::RequestSubmitted
            | Self::QuoteAvailable => BodyFormat::Html,
        }
    }

    /// テンプレートファイル名（例: `booking_customer.txt`）
    pub fn file_name(&self) -> String {
        let extension = match self.format() {
            BodyFormat::Text => "txt",
            BodyFormat::Html => "html",
        };
        format!("{self}.{extension}")
    }
}

/// メール本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

impl EmailBody {
    /// 形式に応じた本文を作成する
    pub fn new(format: BodyFormat, content: String) -> Self {
        match format {
            BodyFormat::Text => Self::Text(content),
            BodyFormat::Html => Self::Html(content),
        }
    }

    /// 本文の文字列
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Html(s) => s,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html(_))
    }
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
/// 送信元アドレスは送信側が保持するため含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:      String,
    /// 件名
    pub subject: String,
    /// 本文
    pub body:    EmailBody,
}
