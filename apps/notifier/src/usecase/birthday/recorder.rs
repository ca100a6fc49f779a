//! # 通知ログレコーダー
//!
//! 送信試行 1 件につき通知ログを 1 行追記する。
//! 失敗時の回復処理は持たず、ストアのエラーはそのまま呼び出し元に返す。

use std::sync::Arc;

use chrono::NaiveDate;
use kinenbi_domain::{
    clock::Clock,
    contact::ContactId,
    mail_log::{DeliveryOutcome, MailLogId, NewMailLog},
};
use kinenbi_infra::{InfraError, repository::MailLogRepository};

/// 通知ログレコーダー
pub struct MailLogRecorder {
    repo:  Arc<dyn MailLogRepository>,
    clock: Arc<dyn Clock>,
}

/// 1 件の送信試行の記録内容
#[derive(Debug, Clone)]
pub struct AttemptRecord<'a> {
    pub contact_id:   ContactId,
    pub subject:      &'a str,
    pub to:           &'a str,
    pub offset_days:  u32,
    pub trigger_date: NaiveDate,
    pub outcome:      DeliveryOutcome,
}

impl MailLogRecorder {
    pub fn new(repo: Arc<dyn MailLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// 送信試行を 1 行追記する
    pub async fn record(&self, attempt: AttemptRecord<'_>) -> Result<MailLogId, InfraError> {
        let log = NewMailLog {
            contact_id:   attempt.contact_id,
            subject:      attempt.subject.to_string(),
            to_email:     attempt.to.to_string(),
            outcome:      attempt.outcome,
            days_ahead:   attempt.offset_days,
            trigger_date: attempt.trigger_date,
            sent_at:      self.clock.now(),
        };

        self.repo.append(&log).await
    }
}
