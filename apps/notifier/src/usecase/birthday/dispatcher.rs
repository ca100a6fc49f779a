//! # 通知ディスパッチャー
//!
//! 抽出された連絡先ごとにメールを 1 通送信し、結果を通知ログに記録する。
//!
//! ## 設計方針
//!
//! - **逐次処理**: 1 件ずつ送信を待ってから次の連絡先に進む
//! - **失敗の分離**: 送信失敗（レンダリング失敗を含む）はその連絡先の FAILED 行として記録し、
//!   バッチは継続する
//! - **ストア障害は中断**: 通知ログの追記に失敗した場合は残りを処理せずにエラーを返す
//! - **実行日は 1 回だけ計算**: 1 回の実行で作成される行はすべて同じ実行日を持つ

use std::sync::Arc;

use chrono::NaiveDate;
use kinenbi_domain::{
    contact::{Contact, ContactId},
    mail_log::DeliveryOutcome,
    notification::{NotificationError, SendReceipt},
};
use kinenbi_shared::{event_log::event, log_business_event};
use serde::Serialize;

use super::{AttemptRecord, MailLogRecorder, SendQueue, TemplateRenderer};
use crate::error::NotifierError;

/// 宛先の解決規則
///
/// 優先順位: 呼び出し時の上書き → 設定済みの宛先 → フォールバック宛先。
/// バッチ内のすべての連絡先で同じ宛先を使う。
#[derive(Debug, Clone)]
pub struct Recipients {
    notify_to:   Option<String>,
    fallback_to: String,
}

impl Recipients {
    pub fn new(notify_to: Option<String>, fallback_to: String) -> Self {
        Self {
            notify_to,
            fallback_to,
        }
    }

    /// 宛先を解決する（空白のみの上書きは指定なしとして扱う）
    pub fn resolve(&self, recipient_override: Option<&str>) -> String {
        recipient_override
            .map(str::trim)
            .filter(|to| !to.is_empty())
            .or(self.notify_to.as_deref())
            .unwrap_or(&self.fallback_to)
            .to_string()
    }
}

/// 送信に失敗した連絡先
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub contact_id: ContactId,
    pub error:      String,
}

/// 1 回の実行の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub count:  usize,
    pub sent:   usize,
    pub failed: usize,
    pub errors: Vec<DispatchFailure>,
}

/// 通知ディスパッチャー
pub struct NotificationDispatcher {
    queue:      SendQueue,
    renderer:   Arc<TemplateRenderer>,
    recorder:   MailLogRecorder,
    recipients: Recipients,
}

impl NotificationDispatcher {
    pub fn new(
        queue: SendQueue,
        renderer: Arc<TemplateRenderer>,
        recorder: MailLogRecorder,
        recipients: Recipients,
    ) -> Self {
        Self {
            queue,
            renderer,
            recorder,
            recipients,
        }
    }

    /// 宛先を解決する
    pub fn resolve_recipient(&self, recipient_override: Option<&str>) -> String {
        self.recipients.resolve(recipient_override)
    }

    /// 連絡先ごとにメールを送信し、通知ログに記録する
    ///
    /// 連絡先が 0 件の場合は何も記録せずに空の集計を返す。
    #[tracing::instrument(skip_all, fields(offset_days, count = matches.len()))]
    pub async fn dispatch(
        &self,
        matches: &[Contact],
        offset_days: u32,
        recipient_override: Option<&str>,
        trigger_date: NaiveDate,
    ) -> Result<DispatchSummary, NotifierError> {
        let mut summary = DispatchSummary {
            count: matches.len(),
            ..Default::default()
        };
        if matches.is_empty() {
            return Ok(summary);
        }

        let to = self.resolve_recipient(recipient_override);

        for contact in matches {
            let subject = TemplateRenderer::reminder_subject(contact, offset_days);
            let result = match self.renderer.render_reminder(contact, offset_days, &to) {
                Ok(email) => self.queue.send(email).await,
                Err(e) => Err(e),
            };

            let outcome = log_outcome(contact, offset_days, &to, result);
            if let DeliveryOutcome::Failed { error } = &outcome {
                summary.failed += 1;
                summary.errors.push(DispatchFailure {
                    contact_id: contact.id(),
                    error:      error.clone(),
                });
            } else {
                summary.sent += 1;
            }

            self.recorder
                .record(AttemptRecord {
                    contact_id: contact.id(),
                    subject: &subject,
                    to: &to,
                    offset_days,
                    trigger_date,
                    outcome,
                })
                .await?;
        }

        Ok(summary)
    }
}

/// 送信結果をビジネスイベントとして出力し、記録用の結果に変換する
fn log_outcome(
    contact: &Contact,
    offset_days: u32,
    to: &str,
    result: Result<SendReceipt, NotificationError>,
) -> DeliveryOutcome {
    match result {
        Ok(receipt) => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SENT,
                event.entity_type = event::entity_type::CONTACT,
                event.entity_id = %contact.id(),
                event.result = event::result::SUCCESS,
                notification.recipient = %to,
                notification.offset_days = offset_days,
                notification.message_id = %receipt.message_id,
                "誕生日通知メール送信成功"
            );
            DeliveryOutcome::Sent {
                message_id: receipt.message_id,
            }
        }
        Err(e) => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_FAILED,
                event.entity_type = event::entity_type::CONTACT,
                event.entity_id = %contact.id(),
                event.result = event::result::FAILURE,
                notification.recipient = %to,
                notification.offset_days = offset_days,
                error = %e,
                "誕生日通知メール送信失敗"
            );
            DeliveryOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
