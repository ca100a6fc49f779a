//! # SQLite データベース接続管理
//!
//! データベース接続プールの作成とマイグレーションの適用を行う。
//!
//! ## 設計方針
//!
//! - **接続プール**: 連絡先ストアと通知ログストアは同じプールを共有する
//! - **sqlx 採用**: 非同期サポート、マイグレーションの埋め込み
//! - **ロックなし**: 日次トリガーとオンデマンド実行の間に排他制御は行わない
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use kinenbi_infra::db;
//!
//! async fn example() -> Result<(), kinenbi_infra::InfraError> {
//!     let pool = db::create_pool("sqlite://data.db?mode=rwc").await?;
//!     db::run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::InfraError;

/// データベースマイグレーションを実行する
///
/// `sqlx::migrate!()` マクロで埋め込まれたマイグレーションファイルを
/// 順番に適用する。適用済みのマイグレーションはスキップされる。
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// SQLite 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。ファイルが存在しない場合は作成する。
///
/// # 引数
///
/// * `database_url` - SQLite 接続 URL（例: `sqlite://data.db?mode=rwc`）
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, InfraError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// インメモリ SQLite の接続プールを作成する
///
/// `:memory:` は接続ごとに別のデータベースになるため、接続数を 1 に固定し
/// アイドル切断もしない。テストと一時的な動作確認用。
pub async fn create_in_memory_pool() -> Result<SqlitePool, InfraError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}
