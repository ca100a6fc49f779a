//! MailLogRepository 統合テスト
//!
//! インメモリ SQLite にマイグレーションを適用して実行する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p kinenbi-infra --test mail_log_repository_test
//! ```

mod common;

use common::{date, failed, insert_contact, new_mail_log, sent, setup_pool};
use kinenbi_domain::{contact::ContactId, mail_log::MailStatus};
use kinenbi_infra::repository::{MailLogQuery, MailLogRepository, SqliteMailLogRepository};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_送信成功の行はmessage_idを持ちerrorを持たない() {
    let pool = setup_pool().await;
    let ana = insert_contact(&pool, "Ana", "ana@example.com", None, "1990-05-20").await;
    let sut = SqliteMailLogRepository::new(pool);
    let trigger = date(2025, 5, 20);

    sut.append(&new_mail_log(ana.id(), "ops@example.com", sent("<abc@example.com>"), 0, trigger))
        .await
        .unwrap();

    let logs = sut.find_by_trigger(trigger, 0).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, MailStatus::Sent);
    assert_eq!(logs[0].message_id.as_deref(), Some("<abc@example.com>"));
    assert!(logs[0].error.is_none());
    assert_eq!(logs[0].contact_id, ana.id());
    assert_eq!(logs[0].to_email, "ops@example.com");
}

#[tokio::test]
async fn test_送信失敗の行はerrorを持ちmessage_idを持たない() {
    let pool = setup_pool().await;
    let sut = SqliteMailLogRepository::new(pool);
    let trigger = date(2025, 5, 20);

    sut.append(&new_mail_log(
        ContactId::from_i64(1),
        "ops@example.com",
        failed("connection timeout"),
        3,
        trigger,
    ))
    .await
    .unwrap();

    let logs = sut.find_by_trigger(trigger, 3).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, MailStatus::Failed);
    assert_eq!(logs[0].error.as_deref(), Some("connection timeout"));
    assert!(logs[0].message_id.is_none());
    assert_eq!(logs[0].days_ahead, 3);
}

#[tokio::test]
async fn test_find_by_triggerは実行日とオフセットで絞り込み追記順に返す() {
    let pool = setup_pool().await;
    let sut = SqliteMailLogRepository::new(pool);
    let id = ContactId::from_i64(1);

    let first = sut
        .append(&new_mail_log(id, "a@example.com", sent("<1@x>"), 0, date(2025, 5, 20)))
        .await
        .unwrap();
    sut.append(&new_mail_log(id, "a@example.com", sent("<2@x>"), 3, date(2025, 5, 20)))
        .await
        .unwrap();
    sut.append(&new_mail_log(id, "a@example.com", sent("<3@x>"), 0, date(2025, 5, 21)))
        .await
        .unwrap();
    let second = sut
        .append(&new_mail_log(id, "a@example.com", sent("<4@x>"), 0, date(2025, 5, 20)))
        .await
        .unwrap();

    let logs = sut.find_by_trigger(date(2025, 5, 20), 0).await.unwrap();

    let ids: Vec<_> = logs.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[tokio::test]
async fn test_searchは新しい順に返し連絡先を結合する() {
    let pool = setup_pool().await;
    let ana = insert_contact(&pool, "Ana", "ana@example.com", None, "1990-05-20").await;
    let sut = SqliteMailLogRepository::new(pool);
    let trigger = date(2025, 5, 20);

    sut.append(&new_mail_log(ana.id(), "ops@example.com", sent("<1@x>"), 0, trigger))
        .await
        .unwrap();
    sut.append(&new_mail_log(ana.id(), "ops@example.com", sent("<2@x>"), 3, trigger))
        .await
        .unwrap();

    let result = sut.search(&MailLogQuery::default()).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].log.message_id.as_deref(), Some("<2@x>"));
    assert_eq!(result[0].contact_name.as_deref(), Some("Ana"));
    assert_eq!(result[0].contact_email.as_deref(), Some("ana@example.com"));
}

#[tokio::test]
async fn test_削除済み連絡先の行も検索結果に残る() {
    let pool = setup_pool().await;
    let sut = SqliteMailLogRepository::new(pool);

    sut.append(&new_mail_log(
        ContactId::from_i64(999),
        "ops@example.com",
        failed("boom"),
        0,
        date(2025, 5, 20),
    ))
    .await
    .unwrap();

    let result = sut.search(&MailLogQuery::default()).await.unwrap();

    assert_eq!(result.len(), 1);
    assert!(result[0].contact_name.is_none());
    assert!(result[0].contact_email.is_none());
}

#[tokio::test]
async fn test_searchはステータス_実行日_名前_宛先で絞り込める() {
    let pool = setup_pool().await;
    let ana = insert_contact(&pool, "Ana Souza", "ana@example.com", None, "1990-05-20").await;
    let bruno = insert_contact(&pool, "Bruno", "bruno@example.com", None, "1990-05-20").await;
    let sut = SqliteMailLogRepository::new(pool);

    sut.append(&new_mail_log(ana.id(), "ops@example.com", sent("<1@x>"), 0, date(2025, 5, 20)))
        .await
        .unwrap();
    sut.append(&new_mail_log(bruno.id(), "team@example.com", failed("boom"), 0, date(2025, 5, 20)))
        .await
        .unwrap();
    sut.append(&new_mail_log(ana.id(), "ops@example.com", sent("<3@x>"), 0, date(2025, 5, 21)))
        .await
        .unwrap();

    let failed_only = sut
        .search(&MailLogQuery {
            status: Some(MailStatus::Failed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(failed_only.len(), 1);
    assert_eq!(failed_only[0].log.contact_id, bruno.id());

    let by_day = sut
        .search(&MailLogQuery {
            trigger_date: Some(date(2025, 5, 21)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_day.len(), 1);

    let by_name = sut
        .search(&MailLogQuery {
            name_contains: Some("souza".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let by_to = sut
        .search(&MailLogQuery {
            to_contains: Some("TEAM".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_to.len(), 1);
    assert_eq!(by_to[0].log.to_email, "team@example.com");
}

#[tokio::test]
async fn test_searchはlimitとoffsetでページングする() {
    let pool = setup_pool().await;
    let sut = SqliteMailLogRepository::new(pool);
    let id = ContactId::from_i64(1);

    for n in 1..=5 {
        sut.append(&new_mail_log(
            id,
            "ops@example.com",
            sent(&format!("<{n}@x>")),
            0,
            date(2025, 5, 20),
        ))
        .await
        .unwrap();
    }

    let page = sut
        .search(&MailLogQuery {
            limit: 2,
            offset: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    let message_ids: Vec<_> = page
        .iter()
        .filter_map(|v| v.log.message_id.clone())
        .collect();
    assert_eq!(message_ids, vec!["<4@x>", "<3@x>"]);
}
