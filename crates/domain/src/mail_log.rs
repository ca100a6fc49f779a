//! # 通知試行ログ
//!
//! 送信試行ごとに 1 行追記される監査ログのドメインモデル。
//!
//! ## 不変条件
//!
//! - 1 回の送信試行につき必ず 1 行作成される（成功・失敗を問わない）
//! - 行は追記のみで、更新・削除されない
//! - `message_id` は `status = SENT` のときに限り存在する
//! - `error` は `status = FAILED` のときに限り存在する
//! - 1 回の実行で作成された行はすべて同じ `trigger_date` を持つ
//!
//! `status` / `message_id` / `error` の組み合わせは [`DeliveryOutcome`] から
//! 導出するため、不整合な行は型レベルで作れない。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::contact::ContactId;

define_int_id! {
    /// 通知ログ ID
    ///
    /// mail_logs テーブルの主キー。追記順に単調増加する。
    pub struct MailLogId;
}

/// 送信結果ステータス
///
/// mail_logs テーブルの `status` カラムに格納される値（`SENT` / `FAILED`）。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MailStatus {
    Sent,
    Failed,
}

/// 1 件の送信試行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 送信成功。トランスポートが採番した Message-ID を持つ
    Sent { message_id: String },
    /// 送信失敗。エラーの説明文を持つ
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn status(&self) -> MailStatus {
        match self {
            Self::Sent { .. } => MailStatus::Sent,
            Self::Failed { .. } => MailStatus::Failed,
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Sent { message_id } => Some(message_id),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Sent { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// 追記用の通知ログ
#[derive(Debug, Clone)]
pub struct NewMailLog {
    pub contact_id:   ContactId,
    pub subject:      String,
    pub to_email:     String,
    pub outcome:      DeliveryOutcome,
    pub days_ahead:   u32,
    pub trigger_date: NaiveDate,
    pub sent_at:      DateTime<Utc>,
}

/// 永続化済みの通知ログ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailLog {
    pub id:           MailLogId,
    pub contact_id:   ContactId,
    pub subject:      String,
    pub to_email:     String,
    pub message_id:   Option<String>,
    pub status:       MailStatus,
    pub error:        Option<String>,
    pub days_ahead:   u32,
    pub trigger_date: NaiveDate,
    pub sent_at:      DateTime<Utc>,
}

impl MailLog {
    /// 追記用データと採番済み ID から永続化済みログを組み立てる
    pub fn from_new(id: MailLogId, log: NewMailLog) -> Self {
        let status = log.outcome.status();
        let (message_id, error) = match log.outcome {
            DeliveryOutcome::Sent { message_id } => (Some(message_id), None),
            DeliveryOutcome::Failed { error } => (None, Some(error)),
        };

        Self {
            id,
            contact_id: log.contact_id,
            subject: log.subject,
            to_email: log.to_email,
            message_id,
            status,
            error,
            days_ahead: log.days_ahead,
            trigger_date: log.trigger_date,
            sent_at: log.sent_at,
        }
    }
}
