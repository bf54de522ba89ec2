//! # 通知リクエストのワイヤ形式
//!
//! HTTP リクエストボディ（camelCase JSON）をそのまま受け取る型と、
//! 必須項目の検証を経て [`Notification`] に変換する処理を定義する。
//!
//! すべての項目を `Option` で受け取り、不足している項目を JSON パスで列挙する。
//! 空文字（空白のみを含む）は未指定と同じ扱いにする。
//! 氏名・電話番号などの表示項目は数値で送られても文字列として受け付ける。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{
    Notification,
    NotificationError,
    NotificationEventType,
    Recipient,
    RequestDetails,
    UserRole,
};
use crate::money::QuoteAmount;

/// 顧客情報
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailsPayload {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name:   Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub phone:  Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub county: Option<String>,
}

/// 事業者（査定員）情報
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandymanDetailsPayload {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name:  Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
}

/// ユーザー情報（アカウント登録）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsPayload {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
}

/// `POST /send-emails`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmationPayload {
    pub customer_email:   Option<String>,
    pub handyman_email:   Option<String>,
    pub customer_details: Option<CustomerDetailsPayload>,
    pub handyman_details: Option<HandymanDetailsPayload>,
    pub quote_amount:     Option<QuoteAmount>,
}

/// `POST /send-signup-emails`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupWelcomePayload {
    pub user_email:   Option<String>,
    /// 型は問わない。文字列 `"customer"` 以外はすべて事業者扱い
    pub user_type:    Option<Value>,
    pub user_details: Option<UserDetailsPayload>,
}

/// `POST /send-request-email`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSubmittedPayload {
    pub customer_email:   Option<String>,
    pub customer_details: Option<CustomerDetailsPayload>,
    pub request_details:  Option<RequestDetails>,
    pub is_signed_up:     Option<bool>,
}

/// `POST /send-new-quote-email`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAvailablePayload {
    pub customer_email:   Option<String>,
    pub customer_details: Option<CustomerDetailsPayload>,
    pub handyman_details: Option<HandymanDetailsPayload>,
    pub quote_amount:     Option<QuoteAmount>,
}

/// 表示用の文字列項目
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Number(serde_json::Number),
}

/// 文字列または数値を文字列として受け取る
///
/// 数値は JSON 上の表記のまま文字列化する（`871234567` → `"871234567"`）。
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<ScalarText>::deserialize(deserializer)?.map(|value| match value {
            ScalarText::Text(text) => text,
            ScalarText::Number(number) => number.to_string(),
        }),
    )
}

/// 通知リクエストのワイヤ形式
///
/// エンドポイントごとのリクエストボディが実装する。
pub trait NotificationPayload {
    /// 変換後の通知イベント種別
    const EVENT_TYPE: NotificationEventType;

    /// 必須項目を検証して通知イベントに変換する
    ///
    /// 不足項目があれば [`NotificationError::MissingFields`] にすべて列挙する。
    fn into_notification(self) -> Result<Notification, NotificationError>;
}

/// 必須項目の不足を記録する
#[derive(Debug, Default)]
struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    /// 空でない文字列を要求する
    fn text(&mut self, path: &str, value: Option<String>) -> Option<String> {
        let value = value.filter(|v| !v.trim().is_empty());
        if value.is_none() {
            self.missing.push(path.to_string());
        }
        value
    }

    /// 値の存在を要求する
    fn value<T>(&mut self, path: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(path.to_string());
        }
        value
    }

    fn into_error(self) -> NotificationError {
        NotificationError::MissingFields(self.missing)
    }
}

impl NotificationPayload for BookingConfirmationPayload {
    const EVENT_TYPE: NotificationEventType = NotificationEventType::BookingConfirmed;

    /// `customerDetails.county` は任意。
    fn into_notification(self) -> Result<Notification, NotificationError> {
        let mut fields = RequiredFields::default();

        let customer_email = fields.text("customerEmail", self.customer_email);
        let provider_email = fields.text("handymanEmail", self.handyman_email);
        let customer_details = fields.value("customerDetails", self.customer_details);
        let (customer_name, customer_phone, customer_county) = match customer_details {
            Some(d) => (
                fields.text("customerDetails.name", d.name),
                fields.text("customerDetails.phone", d.phone),
                d.county.filter(|c| !c.trim().is_empty()),
            ),
            None => (None, None, None),
        };
        let handyman_details = fields.value("handymanDetails", self.handyman_details);
        let (provider_name, provider_contact) = match handyman_details {
            Some(d) => (
                fields.text("handymanDetails.name", d.name),
                fields.text("handymanDetails.email", d.email),
            ),
            None => (None, None),
        };
        let quote_amount = fields.value("quoteAmount", self.quote_amount);

        let (
            Some(customer_email),
            Some(provider_email),
            Some(customer_name),
            Some(customer_phone),
            Some(provider_name),
            Some(provider_contact),
            Some(quote_amount),
        ) = (
            customer_email,
            provider_email,
            customer_name,
            customer_phone,
            provider_name,
            provider_contact,
            quote_amount,
        )
        else {
            return Err(fields.into_error());
        };

        Ok(Notification::BookingConfirmed {
            customer: Recipient {
                email: customer_email,
                name:  customer_name,
            },
            customer_phone,
            customer_county,
            provider: Recipient {
                email: provider_email,
                name:  provider_name,
            },
            provider_contact,
            quote_amount,
        })
    }
}

impl NotificationPayload for SignupWelcomePayload {
    const EVENT_TYPE: NotificationEventType = NotificationEventType::SignupWelcome;

    /// `userType` は検証しない。`"customer"` 以外はすべて事業者として扱う。
    fn into_notification(self) -> Result<Notification, NotificationError> {
        let mut fields = RequiredFields::default();

        let user_email = fields.text("userEmail", self.user_email);
        let user_name = match fields.value("userDetails", self.user_details) {
            Some(d) => fields.text("userDetails.name", d.name),
            None => None,
        };

        let (Some(email), Some(name)) = (user_email, user_name) else {
            return Err(fields.into_error());
        };

        Ok(Notification::SignupWelcome {
            user: Recipient { email, name },
            role: UserRole::from_user_type(self.user_type.as_ref().and_then(Value::as_str)),
        })
    }
}

impl NotificationPayload for RequestSubmittedPayload {
    const EVENT_TYPE: NotificationEventType = NotificationEventType::RequestSubmitted;

    /// `isSignedUp` が未指定の場合は未登録（`false`）として扱う。
    fn into_notification(self) -> Result<Notification, NotificationError> {
        let mut fields = RequiredFields::default();

        let customer_email = fields.text("customerEmail", self.customer_email);
        let (customer_name, customer_phone) =
            match fields.value("customerDetails", self.customer_details) {
                Some(d) => (
                    fields.text("customerDetails.name", d.name),
                    d.phone.filter(|p| !p.trim().is_empty()),
                ),
                None => (None, None),
            };
        let request = fields.value("requestDetails", self.request_details);

        let (Some(email), Some(name), Some(request)) = (customer_email, customer_name, request)
        else {
            return Err(fields.into_error());
        };

        Ok(Notification::RequestSubmitted {
            customer: Recipient { email, name },
            customer_phone,
            request,
            is_signed_up: self.is_signed_up.unwrap_or(false),
        })
    }
}

impl NotificationPayload for QuoteAvailablePayload {
    const EVENT_TYPE: NotificationEventType = NotificationEventType::QuoteAvailable;

    fn into_notification(self) -> Result<Notification, NotificationError> {
        let mut fields = RequiredFields::default();

        let customer_email = fields.text("customerEmail", self.customer_email);
        let customer_name = match fields.value("customerDetails", self.customer_details) {
            Some(d) => fields.text("customerDetails.name", d.name),
            None => None,
        };
        let provider_name = match fields.value("handymanDetails", self.handyman_details) {
            Some(d) => fields.text("handymanDetails.name", d.name),
            None => None,
        };
        let quote_amount = fields.value("quoteAmount", self.quote_amount);

        let (Some(email), Some(name), Some(provider_name), Some(quote_amount)) =
            (customer_email, customer_name, provider_name, quote_amount)
        else {
            return Err(fields.into_error());
        };

        Ok(Notification::QuoteAvailable {
            customer: Recipient { email, name },
            provider_name,
            quote_amount,
        })
    }
}
