//! # Kinenbi Notifier サーバー
//!
//! 連絡先の誕生日を毎日確認し、担当者にメールで知らせる通知サーバー。
//!
//! ## 役割
//!
//! - **日次トリガー**: 設定タイムゾーンの `DAILY_JOB_HOUR` 時に当日分と事前通知分を実行
//! - **オンデマンド実行**: `POST /jobs/run-birthday-check` で任意のオフセットを即時実行
//! - **通知ログ照会**: `GET /mail-logs` で送信試行の履歴を検索
//! - **疎通確認**: `POST /test/email` で送信経路を直接確認
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `HOST` / `PORT` | No | バインドアドレス（デフォルト: `0.0.0.0:3000`） |
//! | `DATABASE_URL` | No | SQLite 接続 URL（デフォルト: `sqlite://data.db?mode=rwc`） |
//! | `TZ` | No | タイムゾーン（デフォルト: `America/Sao_Paulo`） |
//! | `LEAD_DAYS` | No | 事前通知の日数（デフォルト: 3、0 で無効） |
//! | `DAILY_JOB_HOUR` | No | 日次実行の時刻（デフォルト: 9） |
//! | `NOTIFY_TO` | No | 通知の宛先 |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `noop`（デフォルト: `smtp`） |
//! | `SMTP_HOST` / `SMTP_PORT` / `SMTP_USER` / `SMTP_PASS` | No | SMTP 接続設定 |
//! | `MAIL_FROM` | No | 送信元アドレス |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（送信せずログ出力のみ）
//! NOTIFICATION_BACKEND=noop cargo run -p kinenbi-notifier
//!
//! # 本番環境
//! SMTP_HOST=smtp.example.com SMTP_USER=... SMTP_PASS=... cargo run -p kinenbi-notifier --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use kinenbi_domain::clock::{Clock, SystemClock};
use kinenbi_infra::{
    db,
    notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender},
    repository::{
        ContactRepository,
        MailLogRepository,
        SqliteContactRepository,
        SqliteMailLogRepository,
    },
};
use kinenbi_notifier::{
    config::{NotificationBackend, NotifierConfig},
    handler::{self, AppState},
    usecase::{
        BirthdayNotificationUseCase,
        DailyTrigger,
        birthday::{
            BirthdayMatcher,
            MailLogRecorder,
            NotificationDispatcher,
            Recipients,
            SendQueue,
            TemplateRenderer,
        },
    },
};
use kinenbi_shared::observability::{TracingConfig, init_tracing};
use tokio::{net::TcpListener, sync::watch};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument as _;

/// 通知サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let app_span = init_tracing(&TracingConfig::from_env(
        "kinenbi-notifier",
        env!("CARGO_PKG_VERSION"),
    ));

    // 設定読み込み
    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        timezone = %config.timezone,
        lead_days = config.lead_days,
        daily_job_hour = config.daily_job_hour,
        backend = %config.notification.backend,
        "通知サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成し、マイグレーションを適用
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 送信バックエンド
    let sender: Arc<dyn NotificationSender> = match config.notification.backend {
        NotificationBackend::Smtp => Arc::new(
            SmtpNotificationSender::new(&config.notification.smtp)
                .context("SMTP 送信の初期化に失敗しました")?,
        ),
        NotificationBackend::Noop => Arc::new(NoopNotificationSender),
    };

    // 起動時の疎通確認（失敗しても起動は続ける）
    match sender.verify().await {
        Ok(()) => tracing::info!("送信経路の確認に成功しました"),
        Err(e) => tracing::warn!("送信経路の確認に失敗しました: {}", e),
    }

    let (queue, _queue_worker) = SendQueue::spawn(
        sender,
        config.notification.queue_capacity,
        config.notification.send_timeout,
    );

    // 依存コンポーネントを初期化
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let contacts: Arc<dyn ContactRepository> =
        Arc::new(SqliteContactRepository::new(pool.clone()));
    let mail_logs: Arc<dyn MailLogRepository> =
        Arc::new(SqliteMailLogRepository::new(pool.clone()));
    let renderer =
        Arc::new(TemplateRenderer::new().context("テンプレートの読み込みに失敗しました")?);

    let matcher = BirthdayMatcher::new(contacts, clock.clone(), config.timezone);
    let dispatcher = NotificationDispatcher::new(
        queue.clone(),
        renderer.clone(),
        MailLogRecorder::new(mail_logs.clone(), clock.clone()),
        Recipients::new(
            config.notification.notify_to.clone(),
            config.notification.fallback_to.clone(),
        ),
    );
    let usecase = Arc::new(BirthdayNotificationUseCase::new(matcher, dispatcher));

    // 日次トリガー
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let trigger = DailyTrigger::new(
        usecase.clone(),
        clock.clone(),
        config.timezone,
        config.daily_job_hour,
        config.lead_days,
    );
    let trigger_task = tokio::spawn(trigger.run(shutdown_rx).instrument(app_span.clone()));

    // ルーター構築
    let state = Arc::new(AppState {
        usecase,
        mail_logs,
        queue,
        renderer,
        clock,
        timezone: config.timezone,
    });
    let app = handler::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("通知サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .instrument(app_span)
        .await?;

    // 日次トリガーを停止する
    let _ = shutdown_tx.send(true);
    trigger_task.await.context("日次トリガーの停止に失敗しました")?;

    tracing::info!("通知サーバーを停止しました");
    Ok(())
}

/// Ctrl-C（および Unix では SIGTERM）を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl-C ハンドラの登録に失敗: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM ハンドラの登録に失敗: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
