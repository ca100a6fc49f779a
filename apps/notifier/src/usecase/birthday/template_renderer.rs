//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名パターン**: `[Kinenbi] Birthday today: {name}` / `[Kinenbi] Birthday in {N} day(s): {name}`
//! - **決定的**: 同じ連絡先とオフセットからは常に同じ件名・本文を生成する

use chrono::DateTime;
use chrono_tz::Tz;
use kinenbi_domain::{
    contact::Contact,
    notification::{EmailMessage, NotificationError},
};
use tera::{Context, Tera};

/// 件名の接頭辞
const SUBJECT_PREFIX: &str = "[Kinenbi]";

/// 電話番号が未登録の場合の表示
const PHONE_NOT_PROVIDED: &str = "(not provided)";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、連絡先とオフセットから
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

/// 埋め込みテンプレート（登録名, 内容）
const EMBEDDED_TEMPLATES: [(&str, &str); 4] = [
    (
        "birthday_reminder.html",
        include_str!("../../../../../templates/notifications/birthday_reminder.html"),
    ),
    (
        "birthday_reminder.txt",
        include_str!("../../../../../templates/notifications/birthday_reminder.txt"),
    ),
    (
        "transport_check.html",
        include_str!("../../../../../templates/notifications/transport_check.html"),
    ),
    (
        "transport_check.txt",
        include_str!("../../../../../templates/notifications/transport_check.txt"),
    ),
];

impl TemplateRenderer {
    /// 埋め込みテンプレートでレンダラーを作成する
    pub fn new() -> Result<Self, NotificationError> {
        Self::from_templates(&EMBEDDED_TEMPLATES)
    }

    /// 任意のテンプレートでレンダラーを作成する
    ///
    /// `birthday_reminder` と `transport_check` をそれぞれ `.html` / `.txt` で登録すること。
    /// 未登録のテンプレートや未定義の変数は、生成時に `TemplateFailed` になる。
    pub fn from_templates(templates: &[(&str, &str)]) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();
        engine
            .add_raw_templates(templates.iter().copied())
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 誕生日リマインダーを生成する
    ///
    /// オフセット 0 は「今日」、それ以外は「N 日後」の文面になる。
    pub fn render_reminder(
        &self,
        contact: &Contact,
        offset_days: u32,
        to: &str,
    ) -> Result<EmailMessage, NotificationError> {
        let name = contact.name().as_str();
        let subject = Self::reminder_subject(contact, offset_days);
        let headline = match offset_days {
            0 => format!("Today is {name}'s birthday."),
            n => format!("In {n} day(s) it is {name}'s birthday."),
        };

        let mut context = Context::new();
        context.insert("subject", &subject);
        context.insert("headline", &headline);
        context.insert("name", name);
        context.insert("email", contact.email().as_str());
        context.insert(
            "phone",
            contact.phone().map_or(PHONE_NOT_PROVIDED, |p| p.as_str()),
        );
        context.insert(
            "birthdate",
            &contact.birthdate().format("%Y-%m-%d").to_string(),
        );

        self.render("birthday_reminder", to, subject, &context)
    }

    /// 誕生日リマインダーの件名
    ///
    /// レンダリングに失敗した場合も通知ログにはこの件名を記録する。
    pub fn reminder_subject(contact: &Contact, offset_days: u32) -> String {
        let name = contact.name().as_str();
        match offset_days {
            0 => format!("{SUBJECT_PREFIX} Birthday today: {name}"),
            n => format!("{SUBJECT_PREFIX} Birthday in {n} day(s): {name}"),
        }
    }

    /// 送信経路の疎通確認メールを生成する
    pub fn render_transport_check(
        &self,
        to: &str,
        sent_at: DateTime<Tz>,
    ) -> Result<EmailMessage, NotificationError> {
        let sent_at = sent_at.to_rfc3339();
        let subject = format!("{SUBJECT_PREFIX} SMTP delivery check {sent_at}");

        let mut context = Context::new();
        context.insert("subject", &subject);
        context.insert("sent_at", &sent_at);

        self.render("transport_check", to, subject, &context)
    }

    fn render(
        &self,
        template_name: &str,
        to: &str,
        subject: String,
        context: &Context,
    ) -> Result<EmailMessage, NotificationError> {
        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to: to.to_string(),
            subject,
            html_body,
            text_body,
        })
    }
}
