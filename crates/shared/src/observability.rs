//! # トレーシング初期化
//!
//! `LOG_FORMAT`（`json` / `pretty`）で出力形式を、`RUST_LOG` でフィルタを切り替える。
//!
//! 初期化時に `service` と `version` を持つ `app` スパンを返す。
//! 呼び出し側は長寿命のタスク（日次トリガー、HTTP サーバー）をこのスパンで
//! instrument し、JSON ログの `span.service` / `span.version` に出力させる。
//!
//! ```rust,ignore
//! use tracing::Instrument as _;
//!
//! let config = TracingConfig::from_env("kinenbi-notifier", env!("CARGO_PKG_VERSION"));
//! let app_span = init_tracing(&config);
//! tokio::spawn(trigger.run(shutdown_rx).instrument(app_span.clone()));
//! ```

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,kinenbi=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON（本番向け）
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// ログ形式を解釈する
    ///
    /// 前後の空白と大文字小文字は無視する。不明な値は `None`。
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// `app` スパンの `service` フィールド
    pub service_name:   String,
    /// `app` スパンの `version` フィールド
    pub version:        String,
    pub log_format:     LogFormat,
    /// `RUST_LOG` 未設定時に使う EnvFilter ディレクティブ
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service_name:   service_name.into(),
            version:        version.into(),
            log_format:     LogFormat::default(),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// 環境変数から設定を読み取る
    pub fn from_env(service_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::from_lookup(service_name, version, |key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み取る
    ///
    /// `LOG_FORMAT` が未設定・空なら pretty。不正な値は stderr に警告して pretty に
    /// フォールバックする（subscriber 初期化前のため `tracing` は使えない）。
    pub fn from_lookup(
        service_name: impl Into<String>,
        version: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = match lookup("LOG_FORMAT").filter(|v| !v.trim().is_empty()) {
            None => LogFormat::default(),
            Some(value) => LogFormat::parse(&value).unwrap_or_else(|| {
                eprintln!("WARNING: unknown LOG_FORMAT={value:?}, falling back to pretty");
                LogFormat::Pretty
            }),
        };

        Self::new(service_name, version).with_log_format(log_format)
    }

    /// サービス全体を包む `app` スパンを作成する
    #[cfg(feature = "observability")]
    pub fn app_span(&self) -> tracing::Span {
        tracing::info_span!("app", service = %self.service_name, version = %self.version)
    }
}

/// トレーシングを初期化し、`app` スパンを返す
///
/// `tracing_error::ErrorLayer` を登録するため、インフラ層エラーの
/// `SpanTrace` に呼び出し経路が記録される。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) -> tracing::Span {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_filter));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    let span = config.app_span();
    span.in_scope(|| {
        tracing::debug!(
            log_format = ?config.log_format,
            filter = %config.default_filter,
            "トレーシングを初期化しました"
        );
    });
    span
}
