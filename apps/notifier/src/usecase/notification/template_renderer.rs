//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名は固定文言**: [`TemplateId::subject`] が持ち、差し込みは本文のみ
//! - **エスケープは拡張子で決まる**: `.html` は tera の自動エスケープ対象、`.txt` は対象外
//! - **金額は文字列で渡す**: [`QuoteAmount`] の表示形式（`300`、`250.5`、`-5`）をそのまま使う
//! - **サイト URL・問い合わせ先は設定値**: 全テンプレート共通のコンテキストとして差し込む

use bercert_domain::{
    money::{BOOKING_FEE, QuoteAmount},
    notification::{
        EmailBody,
        EmailMessage,
        Notification,
        NotificationError,
        RequestDetails,
        TemplateId,
    },
};
use serde::Serialize;
use strum::IntoEnumIterator;
use tera::{Context, Tera};

/// テンプレート本体
fn template_source(template: TemplateId) -> &'static str {
    match template {
        TemplateId::BookingCustomer => {
            include_str!("../../../templates/notifications/booking_customer.txt")
        }
        TemplateId::BookingProvider => {
            include_str!("../../../templates/notifications/booking_provider.txt")
        }
        TemplateId::SignupCustomer => {
            include_str!("../../../templates/notifications/signup_customer.html")
        }
        TemplateId::SignupProvider => {
            include_str!("../../../templates/notifications/signup_provider.html")
        }
        TemplateId::RequestSubmitted => {
            include_str!("../../../templates/notifications/request_submitted.html")
        }
        TemplateId::QuoteAvailable => {
            include_str!("../../../templates/notifications/quote_available.html")
        }
    }
}

/// 依頼内容の 1 行（`request_submitted` で使用）
#[derive(Debug, Serialize)]
struct DetailRow {
    label: &'static str,
    value: String,
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、[`Notification`] から
/// 送信順の [`EmailMessage`] を生成する。
pub struct TemplateRenderer {
    engine:        Tera,
    site_url:      String,
    support_email: String,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// [`TemplateId`] の全テンプレートを tera に登録する。
    /// 構文エラーはここで検出される。
    pub fn new(
        site_url: impl Into<String>,
        support_email: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(
                TemplateId::iter().map(|template| (template.file_name(), template_source(template))),
            )
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self {
            engine,
            site_url: site_url.into(),
            support_email: support_email.into(),
        })
    }

    /// テンプレートを 1 つレンダリングする
    ///
    /// `site_url` と `support_email` は自動で追加される。
    pub fn render(
        &self,
        template: TemplateId,
        to: &str,
        context: &Context,
    ) -> Result<EmailMessage, NotificationError> {
        let mut full_context = Context::new();
        full_context.insert("site_url", &self.site_url);
        full_context.insert("support_email", &self.support_email);
        full_context.extend(context.clone());

        let body = self
            .engine
            .render(&template.file_name(), &full_context)
            .map_err(|e| NotificationError::TemplateFailed(format!("{template}: {e}")))?;

        Ok(EmailMessage {
            to:      to.to_string(),
            subject: template.subject().to_string(),
            body:    EmailBody::new(template.format(), body),
        })
    }

    /// 通知イベントの全メールを送信順に生成する
    ///
    /// 1 通でも失敗した場合はエラーを返す（部分的な結果は返さない）。
    pub fn render_notification(
        &self,
        notification: &Notification,
    ) -> Result<Vec<EmailMessage>, NotificationError> {
        let context = build_context(notification);

        notification
            .deliveries()
            .into_iter()
            .map(|(template, to)| self.render(template, to, &context))
            .collect()
    }
}

/// 通知イベントからテンプレートコンテキストを構築する
///
/// 同じイベントの複数テンプレート（予約確定の顧客宛・事業者宛）は
/// 同じコンテキストを共有する。
fn build_context(notification: &Notification) -> Context {
    let mut context = Context::new();

    match notification {
        Notification::BookingConfirmed {
            customer,
            customer_phone,
            customer_county,
            provider,
            provider_contact,
            quote_amount,
        } => {
            context.insert("customer_name", &customer.name);
            context.insert("customer_phone", customer_phone);
            context.insert("customer_county", customer_county);
            context.insert("provider_name", &provider.name);
            context.insert("provider_contact", provider_contact);
            insert_amounts(&mut context, *quote_amount);
        }
        Notification::SignupWelcome { user, .. } => {
            context.insert("user_name", &user.name);
        }
        Notification::RequestSubmitted {
            customer,
            customer_phone,
            request,
            is_signed_up,
        } => {
            context.insert("customer_name", &customer.name);
            context.insert("customer_phone", customer_phone);
            context.insert("details", &detail_rows(request));
            context.insert("is_signed_up", is_signed_up);
        }
        Notification::QuoteAvailable {
            customer,
            provider_name,
            quote_amount,
        } => {
            context.insert("customer_name", &customer.name);
            context.insert("provider_name", provider_name);
            insert_amounts(&mut context, *quote_amount);
        }
    }

    context
}

/// 見積金額・予約手数料・残額を表示用文字列で追加する
fn insert_amounts(context: &mut Context, quote_amount: QuoteAmount) {
    context.insert("quote_amount", &quote_amount.to_string());
    context.insert("balance", &quote_amount.balance_after_fee().to_string());
    context.insert("booking_fee", &BOOKING_FEE.to_string());
}

/// 依頼内容のうち値がある項目だけを表示順に並べる
fn detail_rows(request: &RequestDetails) -> Vec<DetailRow> {
    let text = |label: &'static str, value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| DetailRow {
                label,
                value: v.to_string(),
            })
    };

    [
        text("Property Type", &request.property_type),
        text("Property Size", &request.property_size),
        request.bedrooms.map(|n| DetailRow {
            label: "Bedrooms",
            value: n.to_string(),
        }),
        text("County", &request.county),
        text("Address", &request.address),
        text("Preferred Date", &request.preferred_date),
        text("Additional Information", &request.additional_info),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use bercert_domain::notification::{Recipient, UserRole};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn make_renderer() -> TemplateRenderer {
        TemplateRenderer::new("https://bercert4u.ie", "domesticfixesie@gmail.com").unwrap()
    }

    fn recipient(email: &str, name: &str) -> Recipient {
        Recipient {
            email: email.to_string(),
            name:  name.to_string(),
        }
    }

    fn make_booking(quote: f64, county: Option<&str>) -> Notification {
        Notification::BookingConfirmed {
            customer:         recipient("jane@example.com", "Jane Murphy"),
            customer_phone:   "087 123 4567".to_string(),
            customer_county:  county.map(str::to_string),
            provider:         recipient("bob@example.com", "Bob Walsh"),
            provider_contact: "bob.walsh@example.com".to_string(),
            quote_amount:     QuoteAmount::new(quote).unwrap(),
        }
    }

    fn make_request(is_signed_up: bool) -> Notification {
        Notification::RequestSubmitted {
            customer: recipient("jane@example.com", "Jane Murphy"),
            customer_phone: None,
            request: RequestDetails {
                property_type: Some("Semi-detached".to_string()),
                bedrooms: Some(3),
                county: Some("Cork".to_string()),
                ..Default::default()
            },
            is_signed_up,
        }
    }

    #[test]
    fn newが正常に初期化される() {
        assert!(TemplateRenderer::new("https://bercert4u.ie", "support@example.com").is_ok());
    }

    #[test]
    fn 予約確定の顧客宛本文が既存の文面と一致する() {
        let emails = make_renderer()
            .render_notification(&make_booking(300.0, Some("Cork")))
            .unwrap();

        let expected = "Dear Jane Murphy,

Thank you for choosing BERCERT4U! Your booking has been successfully confirmed. 

Here are the details of your BER certification appointment:

Assessor Details:
Name: Bob Walsh
Contact: bob.walsh@example.com

Booking Details:
Quote Amount: €300

Customer Details:
Name: Jane Murphy
Contact: 087 123 4567

Payment Details:
You have paid a booking fee of €20. The remaining balance (€280) is to be paid directly to the BER Assessor upon completion of the service.

For any questions or further assistance, please reach out to us at domesticfixesie@gmail.com.

We look forward to serving you!

Warm regards,  
The BERCERT4U Team";

        assert_eq!(emails[0].to, "jane@example.com");
        assert_eq!(
            emails[0].subject,
            "Your BER Certificate Booking with BERCERT4U is Confirmed!"
        );
        assert_eq!(emails[0].body, EmailBody::Text(expected.to_string()));
    }

    #[test]
    fn 予約確定の事業者宛本文に顧客情報と残額が入る() {
        let emails = make_renderer()
            .render_notification(&make_booking(300.0, Some("Cork")))
            .unwrap();

        let provider = &emails[1];
        assert_eq!(provider.to, "bob@example.com");
        assert_eq!(
            provider.subject,
            "New BER Certificate Request Assigned to You!"
        );
        let body = provider.body.as_str();
        assert!(body.starts_with("Dear Bob Walsh,\n"));
        assert!(body.contains("Contact: 087 123 4567\nCounty: Cork\n\nBooking Details:"));
        assert!(body.contains("Total Quote Amount: €300\n"));
        assert!(body.contains("Balance Due to You: €280 (after deduction of the €20 booking fee)"));
    }

    #[test]
    fn countyがなければcounty行を出さない() {
        let emails = make_renderer()
            .render_notification(&make_booking(300.0, None))
            .unwrap();

        let body = emails[1].body.as_str();
        assert!(!body.contains("County:"));
        assert!(body.contains("Contact: 087 123 4567\n\nBooking Details:"));
    }

    #[rstest]
    #[case(20.0, "€0")]
    #[case(15.0, "€-5")]
    #[case(250.5, "€230.5")]
    fn 残額は見積から手数料を引いた値で検証しない(#[case] quote: f64, #[case] expected: &str) {
        let emails = make_renderer()
            .render_notification(&make_booking(quote, None))
            .unwrap();

        assert!(
            emails[0]
                .body
                .as_str()
                .contains(&format!("The remaining balance ({expected})"))
        );
        assert!(
            emails[1]
                .body
                .as_str()
                .contains(&format!("Balance Due to You: {expected} "))
        );
    }

    #[test]
    fn テキスト本文はエスケープしない() {
        let notification = Notification::BookingConfirmed {
            customer:         recipient("jane@example.com", "<b>Jane</b> & Co"),
            customer_phone:   "087".to_string(),
            customer_county:  None,
            provider:         recipient("bob@example.com", "Bob"),
            provider_contact: "bob@example.com".to_string(),
            quote_amount:     QuoteAmount::new(100.0).unwrap(),
        };

        let emails = make_renderer().render_notification(&notification).unwrap();

        assert!(emails[0].body.as_str().starts_with("Dear <b>Jane</b> & Co,"));
    }

    #[rstest]
    #[case(UserRole::Customer, "Welcome to BERCERT4U – Your Account is Ready 🎉", "/customer_form.html")]
    #[case(UserRole::Provider, "BERCERT4U Assessor Account Created – Welcome Aboard ✅", "/ber_login.html")]
    fn 登録完了はユーザー種別の文面でhtmlを生成する(
        #[case] role: UserRole,
        #[case] subject: &str,
        #[case] link: &str,
    ) {
        let notification = Notification::SignupWelcome {
            user: recipient("ann@example.com", "Ann"),
            role,
        };

        let emails = make_renderer().render_notification(&notification).unwrap();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, subject);
        assert!(emails[0].body.is_html());
        let body = emails[0].body.as_str();
        assert!(body.contains("<p>Dear Ann,</p>"));
        assert!(body.contains(&format!("href=\"https://bercert4u.ie{link}\"")));
        assert!(body.contains("href=\"mailto:domesticfixesie@gmail.com\""));
    }

    #[test]
    fn html本文は利用者の入力をエスケープする() {
        let notification = Notification::SignupWelcome {
            user: recipient("ann@example.com", "<script>alert(1)</script>"),
            role: UserRole::Customer,
        };

        let emails = make_renderer().render_notification(&notification).unwrap();

        let body = emails[0].body.as_str();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn サイトurlは設定値で差し替えられる() {
        let renderer = TemplateRenderer::new("http://localhost:8080", "help@example.com").unwrap();
        let notification = Notification::SignupWelcome {
            user: recipient("ann@example.com", "Ann"),
            role: UserRole::Provider,
        };

        let emails = renderer.render_notification(&notification).unwrap();

        let body = emails[0].body.as_str();
        assert!(body.contains("href=\"http://localhost:8080/ber_login.html\""));
        assert!(body.contains("mailto:help@example.com"));
        assert!(!body.contains("bercert4u.ie"));
    }

    #[test]
    fn 依頼受付は値のある依頼項目だけを列挙する() {
        let emails = make_renderer().render_notification(&make_request(true)).unwrap();

        let body = emails[0].body.as_str();
        assert_eq!(emails[0].subject, "We've Received Your BER Certification Request");
        assert!(body.contains("<li>Property Type: Semi-detached</li>"));
        assert!(body.contains("<li>Bedrooms: 3</li>"));
        assert!(body.contains("<li>County: Cork</li>"));
        assert!(!body.contains("Preferred Date"));
    }

    #[rstest]
    #[case(true, "/customer_login.html", "/customer_signup.html")]
    #[case(false, "/customer_signup.html", "/customer_login.html")]
    fn 依頼受付は登録状況で案内リンクを切り替える(
        #[case] is_signed_up: bool,
        #[case] present: &str,
        #[case] absent: &str,
    ) {
        let emails = make_renderer()
            .render_notification(&make_request(is_signed_up))
            .unwrap();

        let body = emails[0].body.as_str();
        assert!(body.contains(present));
        assert!(!body.contains(absent));
    }

    #[test]
    fn 見積到着に事業者名と金額が入る() {
        let notification = Notification::QuoteAvailable {
            customer:      recipient("c@example.com", "Jane"),
            provider_name: "Bob".to_string(),
            quote_amount:  QuoteAmount::new(300.0).unwrap(),
        };

        let emails = make_renderer().render_notification(&notification).unwrap();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "c@example.com");
        assert_eq!(
            emails[0].subject,
            "A New Quote is Available for Your BER Certification"
        );
        let body = emails[0].body.as_str();
        assert!(body.contains("<strong>Bob</strong>"));
        assert!(body.contains("€300"));
        assert!(body.contains("(€280)"));
    }

    #[test]
    fn renderは任意のテンプレートを直接レンダリングできる() {
        let mut context = Context::new();
        context.insert("user_name", "Ann");

        let email = make_renderer()
            .render(TemplateId::SignupProvider, "ann@example.com", &context)
            .unwrap();

        assert_eq!(email.to, "ann@example.com");
        assert!(email.body.as_str().contains("Dear Ann,"));
    }

    #[test]
    fn コンテキスト不足はtemplate_failedになる() {
        let result =
            make_renderer().render(TemplateId::QuoteAvailable, "c@example.com", &Context::new());

        assert!(matches!(result, Err(NotificationError::TemplateFailed(_))));
    }
}
