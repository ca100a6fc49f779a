//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! HTTP 層で共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はアプリ側の責務（shared に axum 依存を入れない）

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://kinenbi.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"bad-request"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 500 Internal Server Error
    ///
    /// 内部情報を漏らさないよう detail は固定文言にする。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bad_requestでtypeとstatusが設定される() {
        let response = ErrorResponse::bad_request("days は 0 以上の整数である必要があります");

        assert_eq!(
            response.error_type,
            "https://kinenbi.example.com/errors/bad-request"
        );
        assert_eq!(response.status, 400);
        assert_eq!(response.title, "Bad Request");
    }

    #[test]
    fn test_internal_errorは詳細を隠す() {
        let response = ErrorResponse::internal_error();

        assert_eq!(response.status, 500);
        assert_eq!(response.detail, "内部エラーが発生しました");
    }

    #[test]
    fn test_serializeでtypeキーに名前が変わる() {
        let json = serde_json::to_value(ErrorResponse::bad_request("x")).unwrap();

        assert_eq!(json["type"], "https://kinenbi.example.com/errors/bad-request");
        assert!(json.get("error_type").is_none());
    }
}
