//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのリポジトリと送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! kinenbi-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use kinenbi_domain::{
    contact::{Contact, ContactId, MonthDay, NewContact},
    mail_log::{MailLog, MailLogId, NewMailLog},
    notification::{EmailMessage, NotificationError, SendReceipt},
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    repository::{ContactRepository, MailLogQuery, MailLogRepository, MailLogView},
};

// ===== MockContactRepository =====

#[derive(Clone, Default)]
pub struct MockContactRepository {
    contacts:       Arc<Mutex<Vec<Contact>>>,
    fail_remaining: Arc<Mutex<u32>>,
}

impl MockContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contact(&self, contact: Contact) {
        self.contacts.lock().unwrap().push(contact);
    }

    /// 次の `n` 回の照会を失敗させる
    pub fn fail_next(&self, n: u32) {
        *self.fail_remaining.lock().unwrap() = n;
    }

    fn take_failure(&self) -> Result<(), InfraError> {
        let mut remaining = self.fail_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(InfraError::unexpected("連絡先ストアに接続できません"));
        }
        Ok(())
    }

    fn sorted(mut contacts: Vec<Contact>) -> Vec<Contact> {
        contacts.sort_by(|a, b| {
            a.name()
                .as_str()
                .cmp(b.name().as_str())
                .then(a.id().cmp(&b.id()))
        });
        contacts
    }
}

#[async_trait]
impl ContactRepository for MockContactRepository {
    async fn find_by_month_day(&self, month_day: &MonthDay) -> Result<Vec<Contact>, InfraError> {
        self.take_failure()?;
        let matched = self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.month_day() == *month_day)
            .cloned()
            .collect();
        Ok(Self::sorted(matched))
    }

    async fn find_all(&self) -> Result<Vec<Contact>, InfraError> {
        self.take_failure()?;
        Ok(Self::sorted(self.contacts.lock().unwrap().clone()))
    }

    async fn insert(
        &self,
        contact: &NewContact,
        created_at: DateTime<Utc>,
    ) -> Result<Contact, InfraError> {
        let mut contacts = self.contacts.lock().unwrap();
        let next_id = contacts.iter().map(|c| c.id().as_i64()).max().unwrap_or(0) + 1;
        let created = Contact::from_db(
            ContactId::from_i64(next_id),
            contact.name.clone(),
            contact.email.clone(),
            contact.phone.clone(),
            contact.birthdate,
            created_at,
        );
        contacts.push(created.clone());
        Ok(created)
    }
}

// ===== MockMailLogRepository =====

#[derive(Clone, Default)]
pub struct MockMailLogRepository {
    logs:       Arc<Mutex<Vec<MailLog>>>,
    /// 設定した件数を超える追記を失敗させる
    fail_after: Arc<Mutex<Option<usize>>>,
}

impl MockMailLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの通知ログを追記順で返す
    pub fn logs(&self) -> Vec<MailLog> {
        self.logs.lock().unwrap().clone()
    }

    /// `n` 件を追記した後の追記をすべて失敗させる
    pub fn fail_after(&self, n: usize) {
        *self.fail_after.lock().unwrap() = Some(n);
    }
}

#[async_trait]
impl MailLogRepository for MockMailLogRepository {
    async fn append(&self, log: &NewMailLog) -> Result<MailLogId, InfraError> {
        let mut logs = self.logs.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap()
            && logs.len() >= limit
        {
            return Err(InfraError::unexpected("通知ログストアへの書き込みに失敗"));
        }

        let id = MailLogId::from_i64(logs.len() as i64 + 1);
        logs.push(MailLog::from_new(id, log.clone()));
        Ok(id)
    }

    async fn find_by_trigger(
        &self,
        trigger_date: NaiveDate,
        days_ahead: u32,
    ) -> Result<Vec<MailLog>, InfraError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.trigger_date == trigger_date && l.days_ahead == days_ahead)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &MailLogQuery) -> Result<Vec<MailLogView>, InfraError> {
        let to_contains = query.to_contains.as_ref().map(|s| s.to_lowercase());

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|l| query.status.is_none_or(|s| l.status == s))
            .filter(|l| query.trigger_date.is_none_or(|d| l.trigger_date == d))
            .filter(|l| {
                to_contains
                    .as_ref()
                    .is_none_or(|to| l.to_email.to_lowercase().contains(to))
            })
            // 連絡先を結合しないため、名前で絞り込むと常に空になる
            .filter(|_| query.name_contains.is_none())
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|l| MailLogView {
                log:           l.clone(),
                contact_name:  None,
                contact_email: None,
            })
            .collect())
    }
}

// ===== MockNotificationSender =====

/// 送信試行を記録するモック送信
///
/// 呼び出し順（0 始まり）ごとに失敗を仕込める。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    attempts:    Arc<Mutex<Vec<EmailMessage>>>,
    sent:        Arc<Mutex<Vec<EmailMessage>>>,
    failures:    Arc<Mutex<HashMap<usize, String>>>,
    always_fail: Arc<Mutex<Option<String>>>,
    delay:       Option<Duration>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 各送信の前に待機する
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `call` 回目（0 始まり）の送信を指定メッセージで失敗させる
    pub fn fail_call(&self, call: usize, message: impl Into<String>) {
        self.failures.lock().unwrap().insert(call, message.into());
    }

    /// すべての送信を指定メッセージで失敗させる
    pub fn fail_always(&self, message: impl Into<String>) {
        *self.always_fail.lock().unwrap() = Some(message.into());
    }

    /// 送信を試みたメッセージ（失敗含む）
    pub fn attempts(&self) -> Vec<EmailMessage> {
        self.attempts.lock().unwrap().clone()
    }

    /// 送信に成功したメッセージ
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let call = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(email.clone());
            attempts.len() - 1
        };

        let failure = self
            .failures
            .lock()
            .unwrap()
            .remove(&call)
            .or_else(|| self.always_fail.lock().unwrap().clone());
        if let Some(message) = failure {
            return Err(NotificationError::SendFailed(message));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(SendReceipt {
            message_id: format!("<mock-{call}@kinenbi.test>"),
        })
    }
}
