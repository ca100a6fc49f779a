//! # ヘルスチェックハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! GET /health
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "time": "2025-05-20T09:00:00-03:00"
//! }
//! ```

use std::sync::Arc;

use axum::{Json, extract::State};
use kinenbi_shared::HealthResponse;

use super::AppState;

/// ヘルスチェックエンドポイント
///
/// `time` は設定タイムゾーンでの現在時刻。
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time:    state.clock.now_in(state.timezone).to_rfc3339(),
    })
}
