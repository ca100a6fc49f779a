//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **テンプレート分離**: メール生成（TemplateRenderer）は notifier アプリ側
//! - **送信の抽象化**: 送信手段は infra の `NotificationSender` トレイトで抽象化し、
//!   ここでは入出力の型とエラーのみを定義する

use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    ///
    /// 表示文字列はトランスポートのエラーメッセージそのもの。
    /// 通知ログの `error` カラムにこの文字列が記録される。
    #[error("{0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 送信受領情報
///
/// 送信成功時にトランスポートから返される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Message-ID ヘッダの値
    pub message_id: String,
}
