//! # 誕生日マッチャー
//!
//! 「今日 + オフセット日数」の月日に誕生日を迎える連絡先を抽出する。
//!
//! 照合は月日（`MM-DD`）の完全一致のみで、生年は参照しない。
//! 2 月 29 日生まれの連絡先は、対象日自体が 2 月 29 日の年にしか一致しない。

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use kinenbi_domain::{
    clock::Clock,
    contact::{Contact, MonthDay},
};
use kinenbi_infra::repository::ContactRepository;

use crate::error::NotifierError;

/// 誕生日マッチャー
pub struct BirthdayMatcher {
    contacts: Arc<dyn ContactRepository>,
    clock:    Arc<dyn Clock>,
    timezone: Tz,
}

impl BirthdayMatcher {
    pub fn new(contacts: Arc<dyn ContactRepository>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self {
            contacts,
            clock,
            timezone,
        }
    }

    /// 設定タイムゾーンでの今日
    pub fn today(&self) -> NaiveDate {
        self.clock.today_in(self.timezone)
    }

    /// 今日からオフセット日数後の対象日
    pub fn target_date(&self, offset_days: u32) -> Result<NaiveDate, NotifierError> {
        target_date_from(self.today(), offset_days)
    }

    /// 対象日に誕生日を迎える連絡先を取得する
    pub async fn matches_for_offset(&self, offset_days: u32) -> Result<Vec<Contact>, NotifierError> {
        self.matches_from(self.today(), offset_days).await
    }

    /// 基準日を指定して対象日に誕生日を迎える連絡先を取得する
    ///
    /// 1 回の実行の中で「今日」を 1 度だけ評価するために使う。
    #[tracing::instrument(skip_all, level = "debug", fields(%today, offset_days))]
    pub async fn matches_from(
        &self,
        today: NaiveDate,
        offset_days: u32,
    ) -> Result<Vec<Contact>, NotifierError> {
        let target = target_date_from(today, offset_days)?;
        let month_day = MonthDay::from(target);

        let matches = self.contacts.find_by_month_day(&month_day).await?;
        tracing::debug!(%target, %month_day, count = matches.len(), "誕生日の連絡先を抽出");

        Ok(matches)
    }
}

fn target_date_from(today: NaiveDate, offset_days: u32) -> Result<NaiveDate, NotifierError> {
    today
        .checked_add_days(Days::new(u64::from(offset_days)))
        .ok_or_else(|| NotifierError::BadRequest(format!("オフセット {offset_days} 日は日付の範囲外です")))
}
