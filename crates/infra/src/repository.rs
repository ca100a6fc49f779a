//! # リポジトリ実装
//!
//! 通知パイプラインが使うストアの抽象（トレイト）と SQLite 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: ユースケース層はトレイト経由で利用し、テストではモックに差し替える
//! - **追記専用ログ**: 通知ログは追記と検索のみ。更新・削除の操作は提供しない

pub mod contact_repository;
pub mod mail_log_repository;

pub use contact_repository::{ContactRepository, SqliteContactRepository};
pub use mail_log_repository::{
    MailLogQuery,
    MailLogRepository,
    MailLogView,
    SqliteMailLogRepository,
};
