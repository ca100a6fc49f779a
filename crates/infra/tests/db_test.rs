//! データベース接続管理の統合テスト

mod common;

use kinenbi_infra::db;

#[tokio::test]
async fn test_マイグレーションは再実行しても失敗しない() {
    let pool = common::setup_pool().await;

    let result = db::run_migrations(&pool).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_不正なステータスはcheck制約で拒否される() {
    let pool = common::setup_pool().await;

    let result = sqlx::query(
        r#"
        INSERT INTO mail_logs (
            contact_id, subject, to_email, status, days_ahead, trigger_date, sent_at
        )
        VALUES (1, 's', 'a@example.com', 'PENDING', 0, '2025-05-20', '2025-05-20T12:00:00Z')
        "#,
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
