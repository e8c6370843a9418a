use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use log::debug;

use crate::attendance::AttendanceRecord;

/// カレンダーの日付に付ける勤怠の状態。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkStatus {
    /// 出勤したが退勤していない。
    Open,
    /// 出勤、退勤ともに済んでいる。
    Closed,
}

impl MarkStatus {
    /// カレンダー上での表示色。
    pub fn color(&self) -> &'static str {
        match self {
            MarkStatus::Open => "red",
            MarkStatus::Closed => "blue",
        }
    }
}

/// 1日分のカレンダーの注釈。
///
/// 勤務時間は出勤日の翌日に付くため、状態を持たない日もある。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkedDateEntry {
    pub status: Option<MarkStatus>,
    pub worked_hours: Option<f64>,
}

pub type Markings = BTreeMap<NaiveDate, MarkedDateEntry>;

/// 勤怠記録からカレンダーの注釈を作成する。
///
/// 出勤日には退勤の有無に応じた状態を付ける。
/// 退勤済みの記録は勤務時間を計算し、出勤日の翌日に付ける。
/// 同じ日に複数の勤務時間が付く場合は合計せず、後の記録で上書きする。
///
/// # Arguments
///
/// * `records` - 1人の従業員の勤怠記録
pub fn build_markings(records: &[AttendanceRecord]) -> Markings {
    records.iter().fold(Markings::new(), |mut markings, record| {
        let date = record.check_in_date();
        let status = if record.is_open() {
            MarkStatus::Open
        } else {
            MarkStatus::Closed
        };
        markings.entry(date).or_default().status = Some(status);

        if record.is_open() {
            return markings;
        }

        match date.checked_add_days(Days::new(1)) {
            Some(next_day) => {
                markings.entry(next_day).or_default().worked_hours = Some(record.worked_hours());
            }
            None => debug!("No day after {} to attribute record {}", date, record.id),
        }
        markings
    })
}

/// 指定された月の注釈だけを取り出す。
pub fn markings_in_month(markings: &Markings, year: i32, month: u32) -> Markings {
    markings
        .iter()
        .filter(|(date, _)| date.year() == year && date.month() == month)
        .map(|(date, entry)| (*date, entry.clone()))
        .collect()
}

/// 選択された日付の勤務時間を説明する文言を返す。
pub fn describe_day(markings: &Markings, date: &NaiveDate) -> String {
    match markings.get(date).and_then(|entry| entry.worked_hours) {
        Some(hours) => format!(
            "Worked Hours for {}: You worked: {:.2} hours",
            date.format("%Y-%m-%d"),
            hours
        ),
        None => "No Attendance Record: You have not checked in or there are no worked hours recorded for this day.".to_string(),
    }
}
