//! # 通知ログ照会ハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! GET /mail-logs?limit=100&offset=0&status=SENT&day=2025-09-01&q_name=ana&q_to=@example.com
//! ```
//!
//! 不正な値のパラメータはエラーにせず無視する（`limit` / `offset` はデフォルト値になる）。

use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use kinenbi_domain::mail_log::MailStatus;
use kinenbi_infra::repository::{MailLogQuery, MailLogView};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::NotifierError;

/// クエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct MailLogParams {
    pub limit:  Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
    pub day:    Option<String>,
    pub q_name: Option<String>,
    pub q_to:   Option<String>,
}

/// レスポンス
#[derive(Debug, Serialize)]
pub struct MailLogListResponse {
    pub limit:  u32,
    pub offset: u32,
    pub count:  usize,
    pub rows:   Vec<MailLogView>,
}

impl MailLogParams {
    /// 検索条件に変換する
    pub fn into_query(self) -> MailLogQuery {
        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let limit = non_empty(self.limit).and_then(|s| s.parse::<u32>().ok());
        let offset = non_empty(self.offset)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        let status = non_empty(self.status)
            .and_then(|s| MailStatus::from_str(&s.to_ascii_uppercase()).ok());
        let trigger_date = non_empty(self.day).and_then(|s| parse_day(&s));

        MailLogQuery {
            limit: MailLogQuery::normalize_limit(limit),
            offset,
            status,
            trigger_date,
            name_contains: non_empty(self.q_name),
            to_contains: non_empty(self.q_to),
        }
    }
}

/// `YYYY-MM-DD` 形式の日付だけを受け付ける
fn parse_day(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// 通知ログを新しい順に取得する
#[tracing::instrument(skip_all)]
pub async fn list_mail_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MailLogParams>,
) -> Result<Json<MailLogListResponse>, NotifierError> {
    let query = params.into_query();
    let rows = state.mail_logs.search(&query).await?;

    Ok(Json(MailLogListResponse {
        limit: query.limit,
        offset: query.offset,
        count: rows.len(),
        rows,
    }))
}
