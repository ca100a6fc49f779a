//! # ヘルスチェック共通型
//!
//! `/health` エンドポイントのレスポンス型。

use serde::Serialize;

/// ヘルスチェックレスポンス
///
/// `status` はサービスの稼働状態、`version` は Cargo.toml のバージョン、
/// `time` は設定タイムゾーンでの現在時刻（RFC 3339）を示す。
///
/// ## 使用例
///
/// ```
/// use kinenbi_shared::HealthResponse;
///
/// let response = HealthResponse {
///     status:  "healthy".to_string(),
///     version: "0.1.0".to_string(),
///     time:    "2025-05-20T09:00:00-03:00".to_string(),
/// };
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 稼働状態（`"healthy"` または `"unhealthy"`）
    pub status:  String,
    /// アプリケーションバージョン（Cargo.toml から取得）
    pub version: String,
    /// 設定タイムゾーンでの現在時刻
    pub time:    String,
}
