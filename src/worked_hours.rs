use chrono::{DateTime, Utc};

/// 出勤から退勤までの勤務時間を時間単位で計算する。
///
/// 退勤していない場合は0を返す。
/// 小数点以下2桁で丸める。退勤が出勤より前の場合は負の値になる。
///
/// # Arguments
///
/// * `check_in` - 出勤日時
/// * `check_out` - 退勤日時
pub fn worked_hours(check_in: &DateTime<Utc>, check_out: Option<&DateTime<Utc>>) -> f64 {
    let Some(check_out) = check_out else {
        return 0.0;
    };

    let seconds = (*check_out - *check_in).num_seconds() as f64;
    round_hundredths(seconds / 3600.0)
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    use super::worked_hours;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().to_utc()
    }

    #[test]
    fn test_no_check_out_is_zero() {
        assert_eq!(worked_hours(&instant("2024-01-01T08:00:00Z"), None), 0.0);
    }

    #[rstest]
    #[case::same_instant("2024-01-01T08:00:00Z", "2024-01-01T08:00:00Z", 0.0)]
    #[case::eight_and_a_half("2024-01-01T08:00:00Z", "2024-01-01T16:30:00Z", 8.5)]
    #[case::overnight("2024-01-01T22:00:00Z", "2024-01-02T06:15:00Z", 8.25)]
    #[case::rounded("2024-01-01T08:00:00Z", "2024-01-01T08:20:00Z", 0.33)]
    #[case::rounded_up("2024-01-01T08:00:00Z", "2024-01-01T08:40:00Z", 0.67)]
    fn test_worked_hours(#[case] check_in: &str, #[case] check_out: &str, #[case] expected: f64) {
        assert_eq!(
            worked_hours(&instant(check_in), Some(&instant(check_out))),
            expected
        );
    }

    /// 退勤が出勤より前のデータ不整合でもpanicせず、負の値を返すことを確認する。
    #[test]
    fn test_check_out_before_check_in_is_negative() {
        assert_eq!(
            worked_hours(
                &instant("2024-01-01T16:30:00Z"),
                Some(&instant("2024-01-01T08:00:00Z"))
            ),
            -8.5
        );
    }
}
