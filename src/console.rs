use std::io::Write;

use anyhow::{Context, Result};

use crate::calendar::Markings;
use crate::datetime::ODOO_DATETIME_FORMAT;
use crate::session::Session;
use crate::tracker::AttendanceState;

/// Consoleに勤怠の情報を表示するためのtrait。
pub trait ConsolePresenter {
    /// 現在の勤怠の状態を表示する。
    ///
    /// # Arguments
    ///
    /// * `session` - ログイン中の従業員
    /// * `state` - 表示する勤怠の状態
    fn show_state(&mut self, session: &Session, state: &AttendanceState) -> Result<()>;

    /// カレンダーの注釈を表示する。
    ///
    /// # Arguments
    ///
    /// * `markings` - 表示する注釈
    fn show_markings(&mut self, markings: &Markings) -> Result<()>;

    /// 1行のメッセージを表示する。
    fn show_message(&mut self, message: &str) -> Result<()>;
}

/// 勤怠の情報をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    fn show_state(&mut self, session: &Session, state: &AttendanceState) -> Result<()> {
        let written = match state {
            AttendanceState::OpenRecord(record) => writeln!(
                self.writer,
                "- {}: checked in since {}",
                session.name,
                record.check_in.format(ODOO_DATETIME_FORMAT)
            ),
            AttendanceState::NoOpenRecord => {
                writeln!(self.writer, "- {}: not checked in", session.name)
            }
        };
        written.with_context(|| format!("Failed to write attendance state: {:?}", state))?;

        Ok(())
    }

    // 日付順に、状態と翌日に付いた勤務時間をlist形式で表示する。
    fn show_markings(&mut self, markings: &Markings) -> Result<()> {
        for (date, entry) in markings {
            let mut columns = Vec::new();
            if let Some(status) = entry.status {
                columns.push(format!("{:?} ({})", status, status.color()).to_lowercase());
            }
            if let Some(hours) = entry.worked_hours {
                columns.push(format!("worked {:.2} h", hours));
            }
            writeln!(
                self.writer,
                "- {}: {}",
                date.format("%Y-%m-%d"),
                columns.join(", ")
            )
            .with_context(|| format!("Failed to write marking: {} {:?}", date, entry))?;
        }

        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message).context("Failed to write message")?;

        Ok(())
    }
}
