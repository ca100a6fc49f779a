//! # ジョブ実行ハンドラ
//!
//! 誕生日通知パイプラインを任意のオフセットと宛先で即時実行する。
//! 運用時の動作確認用で、日次トリガーとの排他制御は行わない。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{error::NotifierError, usecase::RunReport};

/// クエリパラメータ
///
/// 独自のエラーメッセージを返すため、値は文字列のまま受け取る。
#[derive(Debug, Deserialize)]
pub struct RunQuery {
    pub days:    Option<String>,
    #[serde(rename = "sendTo")]
    pub send_to: Option<String>,
}

/// レスポンス
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub ran:    bool,
    #[serde(flatten)]
    pub report: RunReport,
}

/// `days` を解釈する（未指定・空は 0）
pub(crate) fn parse_days(days: Option<&str>) -> Result<u32, NotifierError> {
    match days.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| {
            NotifierError::BadRequest(format!(
                "days は 0 以上の整数である必要があります: {value}"
            ))
        }),
    }
}

/// 誕生日通知を即時実行する
///
/// ## エンドポイント
/// POST /jobs/run-birthday-check?days={N}&sendTo={address}
///
/// 個々の送信失敗は 200 の集計に含める。ストア障害は 500。
/// 実行は別タスクで行い、クライアントが切断しても送信と記録は最後まで続ける。
#[tracing::instrument(skip_all)]
pub async fn run_birthday_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunQuery>,
) -> Result<Json<RunResponse>, NotifierError> {
    let days = parse_days(query.days.as_deref())?;
    let usecase = state.usecase.clone();
    let send_to = query.send_to;

    let report = tokio::spawn(async move { usecase.run(days, send_to.as_deref()).await })
        .await
        .map_err(|e| {
            NotifierError::Internal(format!("誕生日通知タスクが異常終了しました: {e}"))
        })??;

    Ok(Json(RunResponse { ran: true, report }))
}
