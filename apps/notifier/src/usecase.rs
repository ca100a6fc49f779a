//! # ユースケース層
//!
//! 誕生日通知パイプラインと、それを毎日起動するスケジュールトリガーを提供する。

pub mod birthday;
pub mod schedule;

pub use birthday::{BirthdayNotificationUseCase, RunReport};
pub use schedule::DailyTrigger;
