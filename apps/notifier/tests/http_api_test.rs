//! HTTP API の統合テスト
//!
//! ルーター全体を `tower::ServiceExt::oneshot` で呼び出し、
//! ステータスコードとレスポンスの形を検証する。

mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{NOTIFY_TO, add_contact, noon_in_sao_paulo, sqlite_harness};
use kinenbi_notifier::handler;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

// --- テストヘルパー ---

async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, JsonValue) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// --- テストケース ---

#[tokio::test]
async fn test_healthは設定タイムゾーンの時刻を返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;

    let (status, body) = call(handler::router(h.state), Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["time"], "2025-05-20T12:00:00-03:00");
}

#[tokio::test]
async fn test_ジョブ実行は集計を返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;
    let ana = add_contact(&h.contacts, "Ana", None, "1990-05-20").await;
    add_contact(&h.contacts, "Bruno", None, "1990-05-20").await;
    h.sender.fail_call(0, "connection timeout");

    let (status, body) = call(
        handler::router(h.state),
        Method::POST,
        "/jobs/run-birthday-check?days=0&sendTo=manual@example.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ran"], true);
    assert_eq!(body["days"], 0);
    assert_eq!(body["to"], "manual@example.com");
    assert_eq!(body["count"], 2);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["contact_id"], ana.id().as_i64());
    assert_eq!(body["errors"][0]["error"], "connection timeout");
}

#[tokio::test]
async fn test_ジョブ実行でdaysが不正なら400を返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;

    let (status, body) = call(
        handler::router(h.state),
        Method::POST,
        "/jobs/run-birthday-check?days=-1",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(
        body["type"],
        "https://kinenbi.example.com/errors/bad-request"
    );
}

#[tokio::test]
async fn test_通知ログを新しい順に絞り込んで返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;
    add_contact(&h.contacts, "Ana", None, "1990-05-20").await;
    add_contact(&h.contacts, "Bruno", None, "1990-05-20").await;
    h.sender.fail_call(1, "550 mailbox unavailable");
    h.usecase.run(0, None).await.unwrap();

    let (status, body) = call(handler::router(h.state.clone()), Method::GET, "/mail-logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["count"], 2);
    assert_eq!(body["rows"][0]["contact_name"], "Bruno");
    assert_eq!(body["rows"][0]["status"], "FAILED");
    assert_eq!(body["rows"][1]["contact_name"], "Ana");
    assert_eq!(body["rows"][1]["trigger_date"], "2025-05-20");

    let (_, filtered) = call(
        handler::router(h.state),
        Method::GET,
        "/mail-logs?status=sent&q_name=AN&day=2025-05-20&limit=9999",
    )
    .await;

    assert_eq!(filtered["limit"], 500);
    assert_eq!(filtered["count"], 1);
    assert_eq!(filtered["rows"][0]["contact_email"], "ana@example.com");
}

#[tokio::test]
async fn test_テストメールを送信してmessage_idを返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;
    let sender = h.sender.clone();

    let (status, body) = call(
        handler::router(h.state),
        Method::POST,
        "/test/email?to=check@example.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["to"], "check@example.com");
    assert_eq!(body["message_id"], "<mock-0@kinenbi.test>");
    assert_eq!(sender.sent_emails()[0].to, "check@example.com");
}

#[tokio::test]
async fn test_テストメールの宛先がなければ400を返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;

    let (status, _) = call(handler::router(h.state), Method::POST, "/test/email").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_テストメールの送信失敗は500とエラー内容を返す() {
    let h = sqlite_harness(noon_in_sao_paulo(2025, 5, 20), Some(NOTIFY_TO)).await;
    h.sender.fail_always("authentication failed");

    let (status, body) = call(
        handler::router(h.state),
        Method::POST,
        "/test/email?to=check@example.com",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "authentication failed");
}
