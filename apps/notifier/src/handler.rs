//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲

pub mod health;
pub mod job;
pub mod mail_log;
pub mod test_email;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chrono_tz::Tz;
pub use health::health_check;
pub use job::run_birthday_check;
use kinenbi_domain::clock::Clock;
use kinenbi_infra::repository::MailLogRepository;
pub use mail_log::list_mail_logs;
pub use test_email::send_test_email;

use crate::usecase::{
    BirthdayNotificationUseCase,
    birthday::{SendQueue, TemplateRenderer},
};

/// ハンドラ共通の State
pub struct AppState {
    pub usecase:   Arc<BirthdayNotificationUseCase>,
    pub mail_logs: Arc<dyn MailLogRepository>,
    pub queue:     SendQueue,
    pub renderer:  Arc<TemplateRenderer>,
    pub clock:     Arc<dyn Clock>,
    pub timezone:  Tz,
}

/// ルーターを構築する
///
/// トレース・CORS などのレイヤーは呼び出し側で付与する。
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/jobs/run-birthday-check", post(run_birthday_check))
        .route("/mail-logs", get(list_mail_logs))
        .route("/test/email", post(send_test_email))
        .with_state(state)
}
