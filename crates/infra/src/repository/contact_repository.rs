//! # ContactRepository
//!
//! 連絡先の読み取りを担当するリポジトリ。
//!
//! 誕生日は `YYYY-MM-DD` の TEXT で保存されているため、月日照合は
//! `substr(birthdate, 6, 5)` との文字列一致で行う（年は一切参照しない）。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use kinenbi_domain::contact::{
    Contact,
    ContactId,
    ContactName,
    Email,
    MonthDay,
    NewContact,
    Phone,
};
use sqlx::SqlitePool;

use crate::error::InfraError;

/// 連絡先リポジトリトレイト
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// 誕生日の月日が一致する連絡先を名前順で取得する
    async fn find_by_month_day(&self, month_day: &MonthDay) -> Result<Vec<Contact>, InfraError>;

    /// 全連絡先を名前順で取得する
    async fn find_all(&self) -> Result<Vec<Contact>, InfraError>;

    /// 連絡先を登録する
    ///
    /// 連絡先管理（外部コラボレーター）とテストのシード用。
    async fn insert(
        &self,
        contact: &NewContact,
        created_at: DateTime<Utc>,
    ) -> Result<Contact, InfraError>;
}

/// contacts テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id:         i64,
    name:       String,
    email:      String,
    phone:      Option<String>,
    birthdate:  NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    /// 保存済みの行は検証せずに復元する
    ///
    /// 入力検証は登録時（[`NewContact::new`]）に限る。連絡先管理側の規則で書かれた
    /// 行を読み取り時に拒否すると、同じ日の他の連絡先まで通知されなくなる。
    fn from(row: ContactRow) -> Self {
        // 連絡先管理側が空文字列で保存した電話番号は未入力として扱う
        let phone = row
            .phone
            .filter(|p| !p.trim().is_empty())
            .map(Phone::from_db);

        Contact::from_db(
            ContactId::from_i64(row.id),
            ContactName::from_db(row.name),
            Email::from_db(row.email),
            phone,
            row.birthdate,
            row.created_at,
        )
    }
}

/// SQLite 実装の ContactRepository
#[derive(Debug, Clone)]
pub struct SqliteContactRepository {
    pool: SqlitePool,
}

impl SqliteContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(month_day = %month_day))]
    async fn find_by_month_day(&self, month_day: &MonthDay) -> Result<Vec<Contact>, InfraError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, name, email, phone, birthdate, created_at
            FROM contacts
            WHERE substr(birthdate, 6, 5) = ?
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(month_day.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Contact>, InfraError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, name, email, phone, birthdate, created_at
            FROM contacts
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(
        &self,
        contact: &NewContact,
        created_at: DateTime<Utc>,
    ) -> Result<Contact, InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, phone, birthdate, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(contact.name.as_str())
        .bind(contact.email.as_str())
        .bind(contact.phone.as_ref().map(Phone::as_str))
        .bind(contact.birthdate)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Contact::from_db(
            ContactId::from_i64(result.last_insert_rowid()),
            contact.name.clone(),
            contact.email.clone(),
            contact.phone.clone(),
            contact.birthdate,
            created_at,
        ))
    }
}
