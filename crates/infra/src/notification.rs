//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・Mailpit 開発用）、Noop（ログ出力のみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod noop;
mod smtp;

use async_trait::async_trait;
use kinenbi_domain::notification::{EmailMessage, NotificationError, SendReceipt};
pub use noop::NoopNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// メール送信トレイト
///
/// 送信はキャンセルもタイムアウトも持たない不透明な操作として扱う。
/// タイムアウトは呼び出し側（送信キュー）で付与する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信し、採番された Message-ID を返す
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError>;

    /// 送信先サーバーへの接続を確認する
    ///
    /// 起動時の疎通確認用。デフォルトは常に成功する。
    async fn verify(&self) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Message-ID ヘッダ値を生成する
///
/// ドメイン部は送信元アドレスのドメインを使う。
pub(crate) fn generate_message_id(from_address: &str) -> String {
    let domain = from_address
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim_end_matches('>'))
        .filter(|domain| !domain.is_empty())
        .unwrap_or("kinenbi.local");
    format!("<{}@{}>", uuid::Uuid::new_v4(), domain)
}
