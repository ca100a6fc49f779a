//! # Clock（時刻プロバイダ）
//!
//! `Utc::now()` の直接呼び出しを置き換え、テストで固定時刻を注入可能にするための抽象化。
//! 「今日」は常に設定タイムゾーンで判定するため、[`Clock::today_in`] を提供する。

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 指定タイムゾーンでの現在時刻
    fn now_in(&self, tz: Tz) -> DateTime<Tz> {
        self.now().with_timezone(&tz)
    }

    /// 指定タイムゾーンでの今日の日付
    fn today_in(&self, tz: Tz) -> NaiveDate {
        self.now_in(tz).date_naive()
    }
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_system_clock_は現在時刻を返す() {
        let clock = SystemClock;
        let before = Utc::now();
        let result = clock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_はコンストラクタで渡した時刻を返す() {
        let fixed_time = Utc::now();
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.now(), fixed_time);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_today_in_はタイムゾーンの日付境界で判定する() {
        // UTC 02:00 はサンパウロ（UTC-3）ではまだ前日の 23:00
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 21, 2, 0, 0).unwrap());

        assert_eq!(
            clock.today_in(chrono_tz::America::Sao_Paulo),
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
        );
        assert_eq!(
            clock.today_in(chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2025, 5, 21).unwrap()
        );
    }

    #[test]
    fn test_today_in_は東側のタイムゾーンで翌日になる() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 12, 31, 16, 0, 0).unwrap());

        assert_eq!(
            clock.today_in(chrono_tz::Asia::Tokyo),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
