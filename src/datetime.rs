use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Odooが受け付ける日時の書式。
pub const ODOO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(not(test))]
/// 現在のUTC時間を取得する。
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// テスト時に利用するモック時間を取得する。
#[cfg(test)]
pub mod mock_datetime {
    use std::cell::RefCell;

    use super::DateTime;
    use super::Utc;

    thread_local! {
        static MOCK_TIME: RefCell<Option<DateTime<Utc>>> = RefCell::new(None);
    }

    /// モック時間を取得する。
    pub fn now() -> DateTime<Utc> {
        MOCK_TIME.with(|cell| cell.borrow().as_ref().cloned().unwrap_or_else(Utc::now))
    }

    /// モック時間を設定する。
    pub fn set_mock_time(time: DateTime<Utc>) {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = Some(time));
    }

    // 設定したモック時間をクリアする。
    pub fn clear_mock_time() {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
pub use mock_datetime::now;

/// Odooへ送る時刻のずれ。-6時間+30分の固定値で、タイムゾーンDBは参照しない。
fn odoo_offset() -> Duration {
    Duration::hours(-6) + Duration::minutes(30)
}

/// UTCの日時をOdooが期待する書式の文字列に変換する。
///
/// 固定のオフセット(-5.5時間)をずらしてから`YYYY-MM-DD HH:MM:SS`で出力する。
/// 日付や年の繰り上がりはchronoの演算に任せる。
///
/// # Examples
///
/// ```
/// let instant = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
/// assert_eq!(to_odoo_timestamp(&instant), "2024-01-01 02:30:00");
/// ```
pub fn to_odoo_timestamp(instant: &DateTime<Utc>) -> String {
    (*instant + odoo_offset())
        .format(ODOO_DATETIME_FORMAT)
        .to_string()
}

/// Odooから返された日時の文字列をパースする。
///
/// Odooの日時はタイムゾーンを持たないため、UTCとして扱う。
/// RFC3339形式も受け付ける。
pub fn parse_odoo_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, ODOO_DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }

    let datetime = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Failed to parse Odoo timestamp: {}", s))?
        .to_utc();

    Ok(datetime)
}
