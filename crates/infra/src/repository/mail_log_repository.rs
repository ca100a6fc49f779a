//! # MailLogRepository
//!
//! 通知試行ログの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **追記専用**: 送信成功・失敗どちらも 1 試行 1 行で追記し、更新・削除は行わない
//! - **弱参照**: `contact_id` は外部キー制約なし。削除済み連絡先の行も検索結果に残る
//! - **運用向け検索**: ステータス・実行日・連絡先名・宛先で絞り込み、新しい順に返す

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use kinenbi_domain::{
    contact::ContactId,
    mail_log::{MailLog, MailLogId, MailStatus, NewMailLog},
};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::InfraError;

/// 検索件数のデフォルト
pub const DEFAULT_LIMIT: u32 = 100;
/// 検索件数の上限
pub const MAX_LIMIT: u32 = 500;

/// 通知ログの検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailLogQuery {
    pub limit:         u32,
    pub offset:        u32,
    pub status:        Option<MailStatus>,
    pub trigger_date:  Option<NaiveDate>,
    /// 連絡先名の部分一致（大文字小文字を区別しない）
    pub name_contains: Option<String>,
    /// 宛先アドレスの部分一致（大文字小文字を区別しない）
    pub to_contains:   Option<String>,
}

impl MailLogQuery {
    /// 件数指定を正規化する
    ///
    /// 未指定・0 はデフォルト件数、上限超過は上限に丸める。
    pub fn normalize_limit(requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => n.min(MAX_LIMIT),
        }
    }
}

impl Default for MailLogQuery {
    fn default() -> Self {
        Self {
            limit:         DEFAULT_LIMIT,
            offset:        0,
            status:        None,
            trigger_date:  None,
            name_contains: None,
            to_contains:   None,
        }
    }
}

/// 検索結果の 1 行（連絡先の名前とメールを結合したもの）
///
/// 連絡先が削除済みの場合、`contact_name` / `contact_email` は `None` になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailLogView {
    #[serde(flatten)]
    pub log:           MailLog,
    pub contact_name:  Option<String>,
    pub contact_email: Option<String>,
}

/// 通知ログリポジトリトレイト
#[async_trait]
pub trait MailLogRepository: Send + Sync {
    /// 通知ログを 1 行追記し、採番された ID を返す
    async fn append(&self, log: &NewMailLog) -> Result<MailLogId, InfraError>;

    /// 実行日とオフセットで通知ログを追記順に取得する
    ///
    /// 「X 日のオフセット Y の実行で何が起きたか」を調べるための照会。
    async fn find_by_trigger(
        &self,
        trigger_date: NaiveDate,
        days_ahead: u32,
    ) -> Result<Vec<MailLog>, InfraError>;

    /// 条件に一致する通知ログを新しい順に取得する
    async fn search(&self, query: &MailLogQuery) -> Result<Vec<MailLogView>, InfraError>;
}

/// mail_logs テーブルの行（contacts を LEFT JOIN したもの）
#[derive(Debug, sqlx::FromRow)]
struct MailLogRow {
    id:            i64,
    contact_id:    i64,
    subject:       String,
    to_email:      String,
    message_id:    Option<String>,
    status:        String,
    error:         Option<String>,
    days_ahead:    i64,
    trigger_date:  NaiveDate,
    sent_at:       DateTime<Utc>,
    contact_name:  Option<String>,
    contact_email: Option<String>,
}

impl TryFrom<MailLogRow> for MailLogView {
    type Error = InfraError;

    fn try_from(row: MailLogRow) -> Result<Self, Self::Error> {
        let status = MailStatus::from_str(&row.status)
            .map_err(|_| InfraError::unexpected(format!("不正なステータス: {}", row.status)))?;
        let days_ahead = u32::try_from(row.days_ahead)
            .map_err(|_| InfraError::unexpected(format!("不正なオフセット: {}", row.days_ahead)))?;

        Ok(Self {
            log:           MailLog {
                id: MailLogId::from_i64(row.id),
                contact_id: ContactId::from_i64(row.contact_id),
                subject: row.subject,
                to_email: row.to_email,
                message_id: row.message_id,
                status,
                error: row.error,
                days_ahead,
                trigger_date: row.trigger_date,
                sent_at: row.sent_at,
            },
            contact_name:  row.contact_name,
            contact_email: row.contact_email,
        })
    }
}

const SELECT_WITH_CONTACT: &str = r#"
    SELECT
        ml.id, ml.contact_id, ml.subject, ml.to_email, ml.message_id,
        ml.status, ml.error, ml.days_ahead, ml.trigger_date, ml.sent_at,
        c.name AS contact_name, c.email AS contact_email
    FROM mail_logs ml
    LEFT JOIN contacts c ON c.id = ml.contact_id
"#;

/// SQLite 実装の MailLogRepository
#[derive(Debug, Clone)]
pub struct SqliteMailLogRepository {
    pool: SqlitePool,
}

impl SqliteMailLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MailLogRepository for SqliteMailLogRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(contact_id = %log.contact_id))]
    async fn append(&self, log: &NewMailLog) -> Result<MailLogId, InfraError> {
        let status: &str = log.outcome.status().into();

        let result = sqlx::query(
            r#"
            INSERT INTO mail_logs (
                contact_id, subject, to_email, message_id, status, error,
                days_ahead, trigger_date, sent_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.contact_id.as_i64())
        .bind(&log.subject)
        .bind(&log.to_email)
        .bind(log.outcome.message_id())
        .bind(status)
        .bind(log.outcome.error())
        .bind(i64::from(log.days_ahead))
        .bind(log.trigger_date)
        .bind(log.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(MailLogId::from_i64(result.last_insert_rowid()))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%trigger_date, days_ahead))]
    async fn find_by_trigger(
        &self,
        trigger_date: NaiveDate,
        days_ahead: u32,
    ) -> Result<Vec<MailLog>, InfraError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_WITH_CONTACT);
        builder
            .push(" WHERE ml.trigger_date = ")
            .push_bind(trigger_date)
            .push(" AND ml.days_ahead = ")
            .push_bind(i64::from(days_ahead))
            .push(" ORDER BY ml.id ASC");

        let rows = builder
            .build_query_as::<MailLogRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| MailLogView::try_from(row).map(|view| view.log))
            .collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn search(&self, query: &MailLogQuery) -> Result<Vec<MailLogView>, InfraError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_WITH_CONTACT);
        builder.push(" WHERE 1 = 1");

        if let Some(status) = query.status {
            let status: &str = status.into();
            builder.push(" AND ml.status = ").push_bind(status);
        }
        if let Some(day) = query.trigger_date {
            builder.push(" AND ml.trigger_date = ").push_bind(day);
        }
        if let Some(name) = &query.name_contains {
            builder
                .push(" AND LOWER(c.name) LIKE LOWER(")
                .push_bind(format!("%{name}%"))
                .push(")");
        }
        if let Some(to) = &query.to_contains {
            builder
                .push(" AND LOWER(ml.to_email) LIKE LOWER(")
                .push_bind(format!("%{to}%"))
                .push(")");
        }

        builder
            .push(" ORDER BY ml.id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset));

        let rows = builder
            .build_query_as::<MailLogRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MailLogView::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteMailLogRepository>();
    }

    #[rstest]
    #[case(None, 100)]
    #[case(Some(0), 100)]
    #[case(Some(20), 20)]
    #[case(Some(500), 500)]
    #[case(Some(10_000), 500)]
    fn test_件数指定が正規化される(#[case] requested: Option<u32>, #[case] expected: u32) {
        assert_eq!(MailLogQuery::normalize_limit(requested), expected);
    }
}
