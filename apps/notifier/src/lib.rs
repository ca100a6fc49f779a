//! # Kinenbi Notifier ライブラリ
//!
//! 誕生日通知のユースケース、日次トリガー、HTTP ハンドラを公開する。
//! 統合テストから内部モジュールへアクセスできるよう lib として切り出している。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
