//! # 送信キュー
//!
//! メール送信を単一のワーカータスクに直列化する。
//!
//! ## 設計方針
//!
//! - **プロセス全体で同時送信 1 件**: 日次トリガーとオンデマンド実行が同時に走っても、
//!   トランスポートへの送信は 1 件ずつ行われる
//! - **送信タイムアウト**: 応答しないトランスポートで処理全体が止まらないよう、
//!   1 通ごとに `tokio::time::timeout` を適用する
//! - **結果の返却**: 送信結果は oneshot チャネルで呼び出し元に返す

use std::{sync::Arc, time::Duration};

use kinenbi_domain::notification::{EmailMessage, NotificationError, SendReceipt};
use kinenbi_infra::notification::NotificationSender;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

/// 送信ジョブ
struct SendJob {
    email: EmailMessage,
    reply: oneshot::Sender<Result<SendReceipt, NotificationError>>,
}

/// 送信キューのハンドル
///
/// クローンして複数の呼び出し元で共有できる。全ハンドルが破棄されると
/// ワーカーは終了する。
#[derive(Clone)]
pub struct SendQueue {
    tx: mpsc::Sender<SendJob>,
}

impl SendQueue {
    /// ワーカータスクを起動し、キューのハンドルを返す
    ///
    /// `capacity` は 1 以上であること。
    pub fn spawn(
        sender: Arc<dyn NotificationSender>,
        capacity: usize,
        send_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(sender, rx, send_timeout));
        (Self { tx }, worker)
    }

    /// メールを送信キューに投入し、送信結果を待つ
    pub async fn send(&self, email: EmailMessage) -> Result<SendReceipt, NotificationError> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(SendJob { email, reply })
            .await
            .map_err(|_| NotificationError::SendFailed("送信キューが停止しています".to_string()))?;

        response.await.map_err(|_| {
            NotificationError::SendFailed("送信ワーカーが応答せずに終了しました".to_string())
        })?
    }
}

async fn run_worker(
    sender: Arc<dyn NotificationSender>,
    mut rx: mpsc::Receiver<SendJob>,
    send_timeout: Duration,
) {
    while let Some(job) = rx.recv().await {
        let result = match tokio::time::timeout(send_timeout, sender.send_email(&job.email)).await
        {
            Ok(result) => result,
            Err(_) => Err(NotificationError::SendFailed(format!(
                "送信がタイムアウトしました（{} 秒）",
                send_timeout.as_secs()
            ))),
        };

        // 呼び出し元が待機をやめていても送信結果は破棄してよい
        let _ = job.reply.send(result);
    }

    tracing::debug!("送信キューのワーカーを終了します");
}
