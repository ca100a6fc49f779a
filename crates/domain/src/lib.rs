//! # Kinenbi ドメイン層
//!
//! 誕生日リマインダーの中核となるドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!        ↘           ↗
//!          shared
//! ```
//!
//! ドメイン層は DB や SMTP などインフラの詳細に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`contact`] - 連絡先と月日（`MM-DD`）による照合
//! - [`mail_log`] - 通知試行ログ（追記専用の監査ログ）
//! - [`notification`] - メールメッセージと送信エラー
//! - [`clock`] - 時刻プロバイダ（テストで固定時刻を注入する）
//! - [`error`] - ドメイン層エラー

#[macro_use]
mod macros;

pub mod clock;
pub mod contact;
pub mod error;
pub mod mail_log;
pub mod notification;

pub use error::DomainError;
