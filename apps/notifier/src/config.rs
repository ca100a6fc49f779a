//! # Notifier 設定
//!
//! 環境変数から通知サーバーの設定を読み込む。
//!
//! 読み込みは `from_lookup` に集約し、テストでは環境変数の代わりに
//! `HashMap` を渡して検証する。

use std::{collections::HashMap, env, str::FromStr, time::Duration};

use chrono_tz::Tz;
use kinenbi_infra::notification::SmtpSettings;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値の形式または範囲が不正
    #[error("{key} の値が不正です（{value:?}）: {reason}")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: &'static str,
    },
}

/// 送信バックエンド
///
/// `NOTIFICATION_BACKEND` 環境変数で切り替える:
/// - `smtp`: SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NotificationBackend {
    Smtp,
    Noop,
}

/// 通知サーバーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host:           String,
    /// ポート番号
    pub port:           u16,
    /// SQLite 接続 URL
    pub database_url:   String,
    /// 「今日」・実行日・日次スケジュールを判定するタイムゾーン
    pub timezone:       Tz,
    /// 事前通知のオフセット日数（0 で事前通知なし）
    pub lead_days:      u32,
    /// 日次ジョブの実行時刻（0〜23 時）
    pub daily_job_hour: u32,
    /// 通知設定
    pub notification:   NotificationConfig,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:        NotificationBackend,
    pub smtp:           SmtpSettings,
    /// 設定済みの宛先（`NOTIFY_TO`）
    pub notify_to:      Option<String>,
    /// 宛先が指定されない場合の送付先
    pub fallback_to:    String,
    /// 1 通あたりの送信タイムアウト
    pub send_timeout:   Duration,
    /// 送信キューの容量
    pub queue_capacity: usize,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// テスト用: マップから設定を読み込む
    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // 空文字列は未設定として扱う
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timezone = match get("TZ") {
            Some(value) => Tz::from_str(&value).map_err(|_| ConfigError::Invalid {
                key: "TZ",
                value,
                reason: "IANA タイムゾーン名である必要があります",
            })?,
            None => chrono_tz::America::Sao_Paulo,
        };

        let daily_job_hour = parse_or("DAILY_JOB_HOUR", get("DAILY_JOB_HOUR"), 9u32)?;
        if daily_job_hour > 23 {
            return Err(ConfigError::Invalid {
                key:    "DAILY_JOB_HOUR",
                value:  daily_job_hour.to_string(),
                reason: "0〜23 の範囲である必要があります",
            });
        }

        let backend = match get("NOTIFICATION_BACKEND") {
            Some(value) => {
                NotificationBackend::from_str(&value).map_err(|_| ConfigError::Invalid {
                    key: "NOTIFICATION_BACKEND",
                    value,
                    reason: "smtp または noop である必要があります",
                })?
            }
            None => NotificationBackend::Smtp,
        };

        let smtp = SmtpSettings {
            host:         get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            port:         parse_or("SMTP_PORT", get("SMTP_PORT"), 587u16)?,
            username:     get("SMTP_USER"),
            password:     get("SMTP_PASS"),
            from_address: get("MAIL_FROM")
                .unwrap_or_else(|| "noreply@kinenbi.example.com".to_string()),
        };

        let fallback_to = get("MAIL_FALLBACK_TO")
            .or_else(|| smtp.username.clone())
            .unwrap_or_else(|| smtp.from_address.clone());

        let send_timeout_secs = parse_or("SEND_TIMEOUT_SECS", get("SEND_TIMEOUT_SECS"), 30u64)?;
        if send_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key:    "SEND_TIMEOUT_SECS",
                value:  "0".to_string(),
                reason: "1 以上である必要があります",
            });
        }

        let queue_capacity = parse_or("SEND_QUEUE_CAPACITY", get("SEND_QUEUE_CAPACITY"), 32usize)?;
        if queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key:    "SEND_QUEUE_CAPACITY",
                value:  "0".to_string(),
                reason: "1 以上である必要があります",
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000u16)?,
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data.db?mode=rwc".to_string()),
            timezone,
            lead_days: parse_or("LEAD_DAYS", get("LEAD_DAYS"), 3u32)?,
            daily_job_hour,
            notification: NotificationConfig {
                backend,
                smtp,
                notify_to: get("NOTIFY_TO"),
                fallback_to,
                send_timeout: Duration::from_secs(send_timeout_secs),
                queue_capacity,
            },
        })
    }
}

/// 数値設定を読み取る。未設定ならデフォルト値を返す
fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            reason: "数値である必要があります",
        }),
        None => Ok(default),
    }
}
