//! # 送信経路テストハンドラ
//!
//! 指定アドレスに疎通確認メールを直接送信する。通知ログには記録しない。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /test/email?to=ops@example.com
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kinenbi_shared::event_log::error as log_error;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::NotifierError;

/// クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct TestEmailQuery {
    pub to: Option<String>,
}

/// 送信成功時のレスポンス
#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub ok:         bool,
    pub to:         String,
    pub message_id: String,
}

/// 送信失敗時のレスポンス
#[derive(Debug, Serialize)]
pub struct TestEmailFailure {
    pub ok:    bool,
    pub error: String,
}

/// 疎通確認メールを送信する
#[tracing::instrument(skip_all)]
pub async fn send_test_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TestEmailQuery>,
) -> Result<Response, NotifierError> {
    let to = query
        .to
        .as_deref()
        .map(str::trim)
        .filter(|to| !to.is_empty())
        .ok_or_else(|| {
            NotifierError::BadRequest("to に送信先アドレスを指定してください".to_string())
        })?
        .to_string();

    let email = state
        .renderer
        .render_transport_check(&to, state.clock.now_in(state.timezone))?;

    match state.queue.send(email).await {
        Ok(receipt) => Ok(Json(TestEmailResponse {
            ok: true,
            to,
            message_id: receipt.message_id,
        })
        .into_response()),
        Err(e) => {
            tracing::warn!(
                error.category = log_error::category::EXTERNAL_SERVICE,
                error.kind = log_error::kind::MAIL_TRANSPORT,
                to = %to,
                "テストメールの送信に失敗: {}",
                e
            );
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TestEmailFailure {
                    ok:    false,
                    error: e.to_string(),
                }),
            )
                .into_response())
        }
    }
}
