//! テスト共通フィクスチャ
//!
//! インメモリ SQLite を使用する統合テストで共通利用するヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use kinenbi_domain::{
    contact::{Contact, ContactId, NewContact},
    mail_log::{DeliveryOutcome, NewMailLog},
};
use kinenbi_infra::{
    db,
    repository::{ContactRepository, SqliteContactRepository},
};
use sqlx::SqlitePool;

/// マイグレーション適用済みのインメモリプールを作成する
pub async fn setup_pool() -> SqlitePool {
    let pool = db::create_in_memory_pool()
        .await
        .expect("インメモリプールの作成に失敗");
    db::run_migrations(&pool)
        .await
        .expect("マイグレーションの適用に失敗");
    pool
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn created_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 連絡先を 1 件登録する
pub async fn insert_contact(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    birthdate: &str,
) -> Contact {
    let contact = NewContact::new(name, email, phone, birthdate).expect("連絡先の検証に失敗");
    SqliteContactRepository::new(pool.clone())
        .insert(&contact, created_at())
        .await
        .expect("連絡先の登録に失敗")
}

/// 入力検証を通さずに連絡先の行を直接書き込む
///
/// 連絡先管理側が書いた行（検証規則が異なるもの）を再現する。
pub async fn insert_raw_contact(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    birthdate: &str,
) {
    sqlx::query(
        "INSERT INTO contacts (name, email, phone, birthdate, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(birthdate)
    .bind(created_at())
    .execute(pool)
    .await
    .expect("連絡先の行の書き込みに失敗");
}

/// 通知ログの追記データを作成する
pub fn new_mail_log(
    contact_id: ContactId,
    to_email: &str,
    outcome: DeliveryOutcome,
    days_ahead: u32,
    trigger_date: NaiveDate,
) -> NewMailLog {
    NewMailLog {
        contact_id,
        subject: "[Kinenbi] Birthday today: Ana".to_string(),
        to_email: to_email.to_string(),
        outcome,
        days_ahead,
        trigger_date,
        sent_at: created_at(),
    }
}

pub fn sent(message_id: &str) -> DeliveryOutcome {
    DeliveryOutcome::Sent {
        message_id: message_id.to_string(),
    }
}

pub fn failed(error: &str) -> DeliveryOutcome {
    DeliveryOutcome::Failed {
        error: error.to_string(),
    }
}
