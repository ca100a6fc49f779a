//! # 日次スケジュールトリガー
//!
//! 設定タイムゾーンの毎日 `DAILY_JOB_HOUR:00` に誕生日通知パイプラインを起動する。
//!
//! ## 動作
//!
//! - 1 回の起動でオフセット 0（当日）、続いて `LEAD_DAYS`（0 より大きい場合）を順に実行する
//! - 各実行は独立してエラーを処理し、当日分の失敗で事前通知分が止まることはない
//! - エラーはトリガー境界でログ出力し、ループは継続する
//! - シャットダウンシグナル（`tokio::sync::watch`）で停止する
//!
//! 夏時間の切り替えで指定時刻が存在しない日は、その後の最初の有効な時刻に実行する。

use std::sync::Arc;

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use kinenbi_domain::clock::Clock;
use kinenbi_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tokio::sync::watch;

use super::{BirthdayNotificationUseCase, RunReport};
use crate::error::NotifierError;

/// 夏時間のギャップを探索する上限（分）
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// `now` より後で最初に訪れる「設定タイムゾーンの `hour` 時 0 分」を返す
///
/// 指定時刻がギャップ（夏時間開始）で存在しない日は、その後の最初の有効な時刻を返す。
/// 重複（夏時間終了）する場合は早い方を返す。
pub fn next_fire_after(now: DateTime<Utc>, hour: u32, tz: Tz) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.with_timezone(&tz).date_naive();

    let mut date = today;
    loop {
        let candidate = resolve_local(date, time, tz);
        if candidate > now {
            return candidate;
        }
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => return candidate,
        }
    }
}

/// ローカル日時を UTC に変換する（ギャップは後ろにずらす）
fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local = date.and_time(time);

    for minutes in 0..=MAX_GAP_MINUTES {
        let shifted = local + TimeDelta::minutes(minutes);
        match tz.from_local_datetime(&shifted) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc);
            }
            LocalResult::None => continue,
        }
    }

    Utc.from_utc_datetime(&local)
}

/// 日次トリガー
pub struct DailyTrigger {
    usecase:   Arc<BirthdayNotificationUseCase>,
    clock:     Arc<dyn Clock>,
    timezone:  Tz,
    hour:      u32,
    lead_days: u32,
}

impl DailyTrigger {
    pub fn new(
        usecase: Arc<BirthdayNotificationUseCase>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
        hour: u32,
        lead_days: u32,
    ) -> Self {
        Self {
            usecase,
            clock,
            timezone,
            hour,
            lead_days,
        }
    }

    /// 1 回の起動で実行するオフセット
    pub fn offsets(&self) -> Vec<u32> {
        if self.lead_days > 0 {
            vec![0, self.lead_days]
        } else {
            vec![0]
        }
    }

    /// 1 日分の実行を行う
    ///
    /// オフセットごとの結果を実行順に返す。エラーはここでログ出力済み。
    pub async fn fire(&self) -> Vec<(u32, Result<RunReport, NotifierError>)> {
        tracing::info!(
            hour = self.hour,
            timezone = %self.timezone,
            lead_days = self.lead_days,
            "日次の誕生日通知を実行します"
        );

        let mut results = Vec::new();
        for offset in self.offsets() {
            let result = self.usecase.run(offset, None).await;
            match &result {
                Ok(report) => {
                    log_business_event!(
                        event.category = event::category::SCHEDULE,
                        event.action = event::action::DAILY_JOB_COMPLETED,
                        event.entity_type = event::entity_type::MAIL_LOG,
                        event.result = event::result::SUCCESS,
                        schedule.offset_days = offset,
                        schedule.count = report.summary.count,
                        schedule.sent = report.summary.sent,
                        schedule.failed = report.summary.failed,
                        "日次の誕生日通知が完了"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error.category = log_error::category::INFRASTRUCTURE,
                        error.kind = log_error::kind::SCHEDULED_RUN,
                        schedule.offset_days = offset,
                        "日次の誕生日通知に失敗: {}",
                        e
                    );
                }
            }
            results.push((offset, result));
        }
        results
    }

    /// シャットダウンシグナルを受け取るまで毎日実行する
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut last_fired: Option<DateTime<Utc>> = None;

        loop {
            let now = self.clock.now();
            // 同じ時刻で 2 回起動しないよう、前回の実行時刻より後を探す
            let from = last_fired.map_or(now, |last| last.max(now));
            let next = next_fire_after(from, self.hour, self.timezone);
            let wait = (next - now).to_std().unwrap_or_default();

            tracing::info!(next = %next.with_timezone(&self.timezone), "次の日次実行を予約しました");

            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    self.fire().await;
                    last_fired = Some(next);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("日次トリガーを停止します");
                        break;
                    }
                }
            }
        }
    }
}
