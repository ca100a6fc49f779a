//! # Kinenbi インフラ層
//!
//! 外部システム（SQLite、SMTP サーバー）との接続・通信を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: SQLite 接続プールとマイグレーション
//! - **リポジトリ実装**: 連絡先の照会、通知ログの追記と検索
//! - **メール送信**: `NotificationSender` トレイトと SMTP / Noop 実装
//!
//! ## モジュール構成
//!
//! - [`db`] - SQLite データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
