//! # 誕生日通知ユースケース
//!
//! 抽出 → 送信 → 記録のパイプラインを 1 回分実行する。
//!
//! ## 構成
//!
//! - [`BirthdayMatcher`]: 対象日に誕生日を迎える連絡先を抽出
//! - [`NotificationDispatcher`]: 連絡先ごとにメールを送信
//! - [`MailLogRecorder`]: 送信試行を通知ログに追記
//! - [`SendQueue`]: トランスポートへの送信を直列化
//! - [`TemplateRenderer`]: メール本文の生成
//!
//! 日次トリガーとオンデマンド実行は同じインスタンスを共有する。両者の間に排他制御はなく、
//! 同じ日・同じオフセットで 2 回実行すれば 2 回送信され、2 倍の行が記録される。

mod dispatcher;
mod matcher;
mod recorder;
mod send_queue;
mod template_renderer;

pub use dispatcher::{DispatchFailure, DispatchSummary, NotificationDispatcher, Recipients};
pub use matcher::BirthdayMatcher;
pub use recorder::{AttemptRecord, MailLogRecorder};
pub use send_queue::SendQueue;
use serde::Serialize;
pub use template_renderer::TemplateRenderer;

use crate::error::NotifierError;

/// 1 回の実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// オフセット日数
    pub days:    u32,
    /// 解決済みの宛先
    pub to:      String,
    #[serde(flatten)]
    pub summary: DispatchSummary,
}

/// 誕生日通知ユースケース
pub struct BirthdayNotificationUseCase {
    matcher:    BirthdayMatcher,
    dispatcher: NotificationDispatcher,
}

impl BirthdayNotificationUseCase {
    pub fn new(matcher: BirthdayMatcher, dispatcher: NotificationDispatcher) -> Self {
        Self {
            matcher,
            dispatcher,
        }
    }

    /// 指定オフセットでパイプラインを 1 回実行する
    ///
    /// 個々の送信失敗は集計に含めて `Ok` で返す。連絡先ストアまたは
    /// 通知ログストアの障害はエラーとして返す。
    #[tracing::instrument(skip_all, fields(offset_days))]
    pub async fn run(
        &self,
        offset_days: u32,
        recipient_override: Option<&str>,
    ) -> Result<RunReport, NotifierError> {
        let trigger_date = self.matcher.today();
        let matches = self.matcher.matches_from(trigger_date, offset_days).await?;

        let summary = self
            .dispatcher
            .dispatch(&matches, offset_days, recipient_override, trigger_date)
            .await?;

        Ok(RunReport {
            days: offset_days,
            to: self.dispatcher.resolve_recipient(recipient_override),
            summary,
        })
    }
}
