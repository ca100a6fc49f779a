//! テスト共通ヘルパー
//!
//! 固定時刻・モック送信でパイプライン一式を組み立てる。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;
use kinenbi_domain::{
    clock::{Clock, FixedClock},
    contact::{Contact, NewContact},
};
use kinenbi_infra::{
    db,
    mock::MockNotificationSender,
    repository::{
        ContactRepository,
        MailLogRepository,
        SqliteContactRepository,
        SqliteMailLogRepository,
    },
};
use kinenbi_notifier::{
    handler::AppState,
    usecase::{
        BirthdayNotificationUseCase,
        birthday::{
            BirthdayMatcher,
            MailLogRecorder,
            NotificationDispatcher,
            Recipients,
            SendQueue,
            TemplateRenderer,
        },
    },
};

pub const TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;
pub const NOTIFY_TO: &str = "ops@example.com";
pub const FALLBACK_TO: &str = "fallback@example.com";

/// パイプライン一式
pub struct Harness {
    pub usecase:   Arc<BirthdayNotificationUseCase>,
    pub contacts:  Arc<dyn ContactRepository>,
    pub mail_logs: Arc<dyn MailLogRepository>,
    pub sender:    MockNotificationSender,
    pub clock:     Arc<dyn Clock>,
    pub state:     Arc<AppState>,
    /// SQLite ストアで組み立てた場合の接続プール
    pub pool:      Option<SqlitePool>,
}

/// サンパウロ時間の正午（UTC 15 時）
pub fn noon_in_sao_paulo(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    TIMEZONE
        .with_ymd_and_hms(y, m, d, 12, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// インメモリ SQLite のストアでパイプラインを組み立てる
pub async fn sqlite_harness(now: DateTime<Utc>, notify_to: Option<&str>) -> Harness {
    let pool = db::create_in_memory_pool().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let harness = build_harness(
        now,
        notify_to,
        Arc::new(SqliteContactRepository::new(pool.clone())),
        Arc::new(SqliteMailLogRepository::new(pool.clone())),
        MockNotificationSender::new(),
    );
    Harness {
        pool: Some(pool),
        ..harness
    }
}

/// 任意のストアと送信モックでパイプラインを組み立てる
pub fn build_harness(
    now: DateTime<Utc>,
    notify_to: Option<&str>,
    contacts: Arc<dyn ContactRepository>,
    mail_logs: Arc<dyn MailLogRepository>,
    sender: MockNotificationSender,
) -> Harness {
    build_harness_with_renderer(
        now,
        notify_to,
        contacts,
        mail_logs,
        sender,
        TemplateRenderer::new().unwrap(),
    )
}

/// テンプレートを差し替えてパイプラインを組み立てる
pub fn build_harness_with_renderer(
    now: DateTime<Utc>,
    notify_to: Option<&str>,
    contacts: Arc<dyn ContactRepository>,
    mail_logs: Arc<dyn MailLogRepository>,
    sender: MockNotificationSender,
    renderer: TemplateRenderer,
) -> Harness {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
    let (queue, _worker) = SendQueue::spawn(Arc::new(sender.clone()), 8, Duration::from_secs(5));
    let renderer = Arc::new(renderer);

    let matcher = BirthdayMatcher::new(contacts.clone(), clock.clone(), TIMEZONE);
    let dispatcher = NotificationDispatcher::new(
        queue.clone(),
        renderer.clone(),
        MailLogRecorder::new(mail_logs.clone(), clock.clone()),
        Recipients::new(notify_to.map(str::to_string), FALLBACK_TO.to_string()),
    );
    let usecase = Arc::new(BirthdayNotificationUseCase::new(matcher, dispatcher));

    let state = Arc::new(AppState {
        usecase: usecase.clone(),
        mail_logs: mail_logs.clone(),
        queue,
        renderer,
        clock: clock.clone(),
        timezone: TIMEZONE,
    });

    Harness {
        usecase,
        contacts,
        mail_logs,
        sender,
        clock,
        state,
        pool: None,
    }
}

/// 連絡先を登録する
pub async fn add_contact(
    contacts: &Arc<dyn ContactRepository>,
    name: &str,
    phone: Option<&str>,
    birthdate: &str,
) -> Contact {
    let email = format!("{}@example.com", name.to_lowercase());
    let contact = NewContact::new(name, &email, phone, birthdate).unwrap();
    contacts
        .insert(&contact, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .await
        .unwrap()
}
