use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use crate::calendar::{build_markings, describe_day, markings_in_month, Markings};
use crate::console::ConsolePresenter;
use crate::odoo::OdooRepository;
use crate::session::Session;

/// `calendar`サブコマンドの引数を表す構造体。
#[derive(Debug, Default, clap::Args)]
pub struct CalendarArgs {
    #[clap(
        short = 'm',
        long = "month",
        help = "Shows only the month in the format YYYY-MM",
        parse(try_from_str = parse_month),
    )]
    month: Option<NaiveDate>,

    #[clap(
        short = 'd',
        long = "date",
        help = "Shows worked hours of the date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,
}

pub struct CalendarCommand<'a, T: OdooRepository + ?Sized> {
    odoo: &'a T,
}

impl<'a, T: OdooRepository + ?Sized> CalendarCommand<'a, T> {
    /// 新しい`CalendarCommand`を返す。
    pub fn new(odoo: &'a T) -> Self {
        Self { odoo }
    }

    /// `calendar`サブコマンドの処理を行う。
    ///
    /// 従業員の全ての勤怠記録からカレンダーの注釈を作成して表示する。
    /// 月が指定された場合はその月だけを表示する。
    /// 日付が指定された場合は、その日に付いた勤務時間も表示する。
    ///
    /// # Arguments
    ///
    /// * `session` - ログイン中の従業員
    /// * `args` - `calendar`サブコマンドの引数
    /// * `presenter` - 結果の表示先
    pub async fn run<P: ConsolePresenter>(
        &self,
        session: &Session,
        args: CalendarArgs,
        presenter: &mut P,
    ) -> Result<Markings> {
        let records = self
            .odoo
            .read_attendances(session.employee_id)
            .await
            .context("Failed to retrieve attendance records")?;
        info!("Attendance records retrieved successfully.");

        records
            .iter()
            .filter(|record| record.worked_hours() < 0.0)
            .for_each(|record| {
                warn!(
                    "Attendance {} checks out before it checks in ({} hours)",
                    record.id,
                    record.worked_hours()
                )
            });

        let markings = build_markings(&records);
        let shown = match args.month {
            Some(month) => markings_in_month(&markings, month.year(), month.month()),
            None => markings.clone(),
        };
        presenter.show_markings(&shown)?;

        if let Some(date) = args.date {
            presenter.show_message(&describe_day(&markings, &date))?;
        }

        Ok(shown)
    }
}

/// 日付をパースする。
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

/// 月をパースし、その月の1日を返す。
fn parse_month(s: &str) -> Result<NaiveDate> {
    let target_date = s.to_string() + "-01";
    NaiveDate::parse_from_str(&target_date, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse month: {}", s))
}
