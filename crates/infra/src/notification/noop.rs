//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 開発環境や通知無効化時に使用する。

use async_trait::async_trait;
use kinenbi_domain::notification::{EmailMessage, NotificationError, SendReceipt};

use super::{NotificationSender, generate_message_id};

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        let message_id = generate_message_id("noop@kinenbi.local");
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            message_id = %message_id,
            "Noop: メール送信をスキップ"
        );
        Ok(SendReceipt { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_emailがmessage_id付きで成功する() {
        let sender = NoopNotificationSender;
        let email = EmailMessage {
            to:        "ops@example.com".to_string(),
            subject:   "テスト件名".to_string(),
            html_body: "<p>テスト</p>".to_string(),
            text_body: "テスト".to_string(),
        };

        let receipt = sender.send_email(&email).await.unwrap();
        assert!(receipt.message_id.ends_with("@kinenbi.local>"));
    }

    #[tokio::test]
    async fn test_verifyは常に成功する() {
        assert!(NoopNotificationSender.verify().await.is_ok());
    }
}
