use chrono::{DateTime, NaiveDate, Utc};

use crate::worked_hours::worked_hours;

/// 従業員の勤怠記録。
///
/// 退勤日時が無い間は未退勤(open)として扱う。
#[derive(Clone, Debug, PartialEq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub employee_id: i64,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// 未退勤かどうかを返す。
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// 出勤した日付を返す。
    pub fn check_in_date(&self) -> NaiveDate {
        self.check_in.date_naive()
    }

    pub fn worked_hours(&self) -> f64 {
        worked_hours(&self.check_in, self.check_out.as_ref())
    }
}

/// 名前で検索した従業員。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub display_name: String,
}
