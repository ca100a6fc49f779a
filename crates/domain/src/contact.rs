//! # 連絡先
//!
//! 誕生日リマインダーの対象となる連絡先と、年を無視した照合に使う月日を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Contact`] | 連絡先 | 名前・メール・電話・誕生日を持つ。通知パイプラインからは読み取り専用 |
//! | [`NewContact`] | 新規連絡先 | 入力検証済みの作成用データ |
//! | [`MonthDay`] | 月日 | 日付の `MM-DD` 射影。毎年繰り返す記念日の照合キー |
//!
//! ## 閏日の扱い
//!
//! 2/29 生まれの連絡先は、対象日そのものが 2/29 のときにのみ一致する。
//! 平年には 2/29 が存在しないため、その年は通知されない。2/28 や 3/1 への
//! 読み替えは行わない。

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::DomainError;

define_int_id! {
    /// 連絡先 ID
    ///
    /// contacts テーブルの主キー（ストレージが採番する連番）。
    pub struct ContactId;
}

define_validated_string! {
    /// 連絡先の表示名
    pub struct ContactName {
        label: "名前",
        max_length: 200,
    }
}

define_validated_string! {
    /// 連絡先の電話番号（形式は問わない）
    pub struct Phone {
        label: "電話番号",
        max_length: 40,
    }
}

/// メールアドレス
///
/// 生成時に最低限の形式チェックを行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `@` の前後が空ではない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let valid_shape = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_shape {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.chars().count() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは 255 文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 永続化済みの値から検証なしで復元する
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 月日（`MM-DD`）
///
/// 年を持たないため、同じ月日の日付はどの年でも等しい。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    month: u32,
    day:   u32,
}

impl MonthDay {
    /// `MM-DD` 形式の文字列からパースする
    ///
    /// 閏年に存在する月日（`02-29` を含む）のみ受け付ける。
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid =
            || DomainError::Validation(format!("月日は MM-DD 形式である必要があります: {value}"));

        let bytes = value.as_bytes();
        if bytes.len() != 5 || bytes[2] != b'-' {
            return Err(invalid());
        }
        let (month, day) = value.split_at(2);
        let day = &day[1..];
        if !month.bytes().chain(day.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        // 2000 年は閏年なので、02-29 を含むすべての実在する月日を検証できる
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(invalid());
        }

        Ok(Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day:   date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// `YYYY-MM-DD` 形式の誕生日をパースする
///
/// 形式が厳密に一致し、かつ実在する日付であることを要求する
/// （`2023-02-29` や `1990-13-01` は拒否）。
pub fn parse_birthdate(value: &str) -> Result<NaiveDate, DomainError> {
    let invalid = || DomainError::Validation("誕生日は YYYY-MM-DD 形式である必要があります".into());

    let value = value.trim();
    let shape_ok = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// 連絡先
///
/// 連絡先管理（外部コラボレーター）が作成・更新し、通知パイプラインは読み取りのみ行う。
#[derive(Debug, Clone)]
pub struct Contact {
    id:         ContactId,
    name:       ContactName,
    email:      Email,
    phone:      Option<Phone>,
    birthdate:  NaiveDate,
    created_at: DateTime<Utc>,
}

impl Contact {
    /// 永続化済みの値から連絡先を復元する
    pub fn from_db(
        id: ContactId,
        name: ContactName,
        email: Email,
        phone: Option<Phone>,
        birthdate: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            phone,
            birthdate,
            created_at,
        }
    }

    pub fn id(&self) -> ContactId {
        self.id
    }

    pub fn name(&self) -> &ContactName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> Option<&Phone> {
        self.phone.as_ref()
    }

    pub fn birthdate(&self) -> NaiveDate {
        self.birthdate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 誕生日の月日（年は照合に使わない）
    pub fn month_day(&self) -> MonthDay {
        MonthDay::from(self.birthdate)
    }
}

/// 新規連絡先（検証済み）
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name:      ContactName,
    pub email:     Email,
    pub phone:     Option<Phone>,
    pub birthdate: NaiveDate,
}

impl NewContact {
    /// 入力値を検証して新規連絡先を作成する
    ///
    /// 電話番号は空文字列・空白のみの場合 `None` として扱う。
    pub fn new(
        name: &str,
        email: &str,
        phone: Option<&str>,
        birthdate: &str,
    ) -> Result<Self, DomainError> {
        let phone = match phone.map(str::trim) {
            Some(p) if !p.is_empty() => Some(Phone::new(p)?),
            _ => None,
        };

        Ok(Self {
            name: ContactName::new(name)?,
            email: Email::new(email)?,
            phone,
            birthdate: parse_birthdate(birthdate)?,
        })
    }
}
