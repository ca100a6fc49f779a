//! # Notifier エラー定義
//!
//! 通知サーバー固有のエラーと、HTTP レスポンスへの変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kinenbi_domain::notification::NotificationError;
use kinenbi_infra::InfraError;
use kinenbi_shared::{ErrorResponse, event_log::error as log_error};
use thiserror::Error;

/// 通知サーバーで発生するエラー
#[derive(Debug, Error)]
pub enum NotifierError {
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// データベースエラー（連絡先ストア・通知ログストア）
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 通知基盤のエラー（テンプレート初期化など、1 通単位で吸収できないもの）
    #[error("通知エラー: {0}")]
    Notification(#[from] NotificationError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let body = match &self {
            NotifierError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            NotifierError::Database(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    "データベースエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            NotifierError::Notification(e) => {
                tracing::error!(
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TRANSPORT,
                    "通知エラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            NotifierError::Internal(msg) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
