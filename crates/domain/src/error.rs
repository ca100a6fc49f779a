//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! 連絡先の入力検証エラーは連絡先を構築した側に同期的に返され、
//! 通知パイプラインには到達しない（ストアには検証済みの連絡先しか存在しない）。
//!
//! ## 使用例
//!
//! ```rust
//! use kinenbi_domain::DomainError;
//!
//! fn validate_name(name: &str) -> Result<(), DomainError> {
//!     if name.is_empty() {
//!         return Err(DomainError::Validation("名前は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 不正なフォーマット（誕生日が `YYYY-MM-DD` でない、実在しない日付など）
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
