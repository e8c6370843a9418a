use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::console::ConsolePresenter;
use crate::error::{AttendanceError, AttendanceResult};
use crate::odoo::OdooRepository;
use crate::session::Session;
use crate::status::StatusLine;
use crate::tracker::AttendanceTracker;

/// 1回で終わる勤怠の操作。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttendanceAction {
    Status,
    CheckIn,
    CheckOut,
}

pub struct AttendanceCommand<'a, T: OdooRepository + ?Sized> {
    odoo: &'a T,
}

impl<'a, T: OdooRepository + ?Sized> AttendanceCommand<'a, T> {
    /// 新しい`AttendanceCommand`を返す。
    ///
    /// # Arguments
    /// * `odoo` - Odoo APIと通信するためのリポジトリ
    pub fn new(odoo: &'a T) -> Self {
        Self { odoo }
    }

    /// `status`、`check-in`、`check-out`サブコマンドの処理を行う。
    ///
    /// サーバーから現在の状態を取得してから操作する。
    /// `status`では挨拶に続けて現在の状態を表示する。
    /// 出勤済みでの出勤などクライアント側で拒否した操作は、メッセージを表示して正常終了する。
    ///
    /// # Arguments
    ///
    /// * `session` - ログイン中の従業員
    /// * `action` - 行う操作
    /// * `presenter` - 結果の表示先
    pub async fn run<P: ConsolePresenter>(
        &self,
        session: Session,
        action: AttendanceAction,
        presenter: &mut P,
    ) -> Result<()> {
        let mut tracker = AttendanceTracker::new(self.odoo, session);
        tracker
            .refresh()
            .await
            .context("Failed to retrieve current attendance")?;

        let outcome = match action {
            AttendanceAction::Status => {
                presenter.show_message(&tracker.session().greeting())?;
                return presenter.show_state(tracker.session(), tracker.state());
            }
            AttendanceAction::CheckIn => tracker.check_in().await,
            AttendanceAction::CheckOut => tracker.check_out().await,
        };

        match outcome {
            Ok(message) => presenter.show_message(&message),
            Err(err) if err.is_guard_violation() => {
                warn!("{}", err);
                presenter.show_message(&err.to_string())
            }
            Err(err) => Err(err).with_context(|| format!("Failed to {:?}", action)),
        }
    }

    /// `attendance`サブコマンドの処理を行う。
    ///
    /// 1行ごとに`in`、`out`、`status`、`refresh`、`quit`を受け付ける対話画面。
    /// 操作の結果はステータス行に表示し、一定時間で消える。
    /// 画面を抜けるとステータス行のタイマーも中断される。
    ///
    /// # Arguments
    ///
    /// * `session` - ログイン中の従業員
    /// * `input` - 操作を読み込む入力
    /// * `presenter` - 結果の表示先
    pub async fn interactive<B, P>(&self, session: Session, input: B, presenter: &mut P) -> Result<()>
    where
        B: AsyncBufRead + Unpin,
        P: ConsolePresenter,
    {
        presenter.show_message(&session.greeting())?;
        let mut tracker = AttendanceTracker::new(self.odoo, session);
        let mut status = StatusLine::default();
        if let Err(err) = tracker.refresh().await {
            status.show(err.to_string());
        }
        render(&tracker, &status, presenter)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read command")? {
            match line.trim() {
                "" => continue,
                "in" => status.show(status_message("Check In", tracker.check_in().await)),
                "out" => status.show(status_message("Check Out", tracker.check_out().await)),
                "refresh" => {
                    if let Err(err) = tracker.refresh().await {
                        status.show(err.to_string());
                    }
                }
                "status" => {}
                "quit" | "exit" => break,
                other => status.show(format!("Unknown command: {}", other)),
            }
            render(&tracker, &status, presenter)?;
        }
        info!("Leaving attendance screen");

        Ok(())
    }
}

fn render<T, P>(tracker: &AttendanceTracker<T>, status: &StatusLine, presenter: &mut P) -> Result<()>
where
    T: OdooRepository + ?Sized,
    P: ConsolePresenter,
{
    presenter.show_state(tracker.session(), tracker.state())?;
    if let Some(message) = status.current() {
        presenter.show_message(&message)?;
    }

    Ok(())
}

/// 操作の結果をステータス行の文言にする。
fn status_message(label: &str, outcome: AttendanceResult<String>) -> String {
    match outcome {
        Ok(message) => message,
        Err(err @ (AttendanceError::AlreadyCheckedIn | AttendanceError::NotCheckedIn)) => {
            err.to_string()
        }
        Err(_) => format!("{} Error", label),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{status_message, AttendanceAction, AttendanceCommand};
    use crate::attendance::AttendanceRecord;
    use crate::console::ConsoleMarkdownList;
    use crate::error::AttendanceError;
    use crate::odoo::MockOdooRepository;
    use crate::session::Session;

    fn session() -> Session {
        Session {
            employee_id: 7,
            name: "John Doe".to_string(),
        }
    }

    fn open_record() -> AttendanceRecord {
        AttendanceRecord {
            id: 11,
            employee_id: 7,
            check_in: Utc.with_ymd_and_hms(2024, 3, 1, 3, 30, 0).unwrap(),
            check_out: None,
        }
    }

    #[rstest]
    #[case::success(Ok("Check In Successful: John Doe".to_string()), "Check In Successful: John Doe")]
    #[case::guard(Err(AttendanceError::AlreadyCheckedIn), "Already checked in")]
    #[case::network(Err(AttendanceError::NetworkOrServer("down".to_string())), "Check In Error")]
    fn test_status_message(
        #[case] outcome: Result<String, AttendanceError>,
        #[case] expected: &str,
    ) {
        assert_eq!(status_message("Check In", outcome), expected);
    }

    #[tokio::test]
    async fn test_run_status() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .times(1)
            .returning(|_| Ok(None));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let result = command
            .run(session(), AttendanceAction::Status, &mut presenter)
            .await;

        assert!(result.is_ok());
        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "Welcome, John Doe\n- John Doe: not checked in\n"
        );
    }

    /// 出勤済みで出勤した場合は、記録を作らずメッセージを表示して正常終了する。
    #[tokio::test]
    async fn test_run_check_in_when_already_checked_in() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .returning(|_| Ok(Some(open_record())));
        odoo.expect_create_attendance().never();
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let result = command
            .run(session(), AttendanceAction::CheckIn, &mut presenter)
            .await;

        assert!(result.is_ok());
        assert_eq!(String::from_utf8(writer).unwrap(), "Already checked in\n");
    }

    #[tokio::test]
    async fn test_run_check_out() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .returning(|_| Ok(Some(open_record())));
        odoo.expect_close_attendance()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let result = command
            .run(session(), AttendanceAction::CheckOut, &mut presenter)
            .await;

        assert!(result.is_ok());
        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "Check Out Successful: John Doe\n"
        );
    }

    #[tokio::test]
    async fn test_run_check_out_failed() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .returning(|_| Ok(Some(open_record())));
        odoo.expect_close_attendance()
            .returning(|_, _| Err(anyhow!("Cannot write")));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let result = command
            .run(session(), AttendanceAction::CheckOut, &mut presenter)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_refresh_failed() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .returning(|_| Err(anyhow!("timeout")));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let result = command
            .run(session(), AttendanceAction::Status, &mut presenter)
            .await;

        assert!(result.is_err());
    }

    /// 名前の無い従業員には`Guest`として挨拶する。
    #[tokio::test]
    async fn test_interactive_greets_guest() {
        let mut odoo = MockOdooRepository::new();
        odoo.expect_read_open_attendance()
            .times(1)
            .returning(|_| Ok(None));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);
        let session = Session {
            employee_id: 7,
            name: String::new(),
        };

        let command = AttendanceCommand::new(&odoo);
        let input: &[u8] = b"quit\n";
        command
            .interactive(session, input, &mut presenter)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "Welcome, Guest\n- : not checked in\n"
        );
    }

    /// 対話画面で出勤、再度の出勤、退勤を順に行う。
    #[tokio::test]
    async fn test_interactive() {
        let mut odoo = MockOdooRepository::new();
        let mut refreshed = 0;
        odoo.expect_read_open_attendance().times(2).returning(move |_| {
            refreshed += 1;
            if refreshed == 1 {
                Ok(None)
            } else {
                Ok(Some(open_record()))
            }
        });
        odoo.expect_create_attendance()
            .times(1)
            .returning(|_, _| Ok(11));
        odoo.expect_close_attendance()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        let command = AttendanceCommand::new(&odoo);
        let input: &[u8] = b"in\nin\n\nout\nquit\nin\n";
        command
            .interactive(session(), input, &mut presenter)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            [
                "Welcome, John Doe\n",
                "- John Doe: not checked in\n",
                "- John Doe: checked in since 2024-03-01 03:30:00\n",
                "Check In Successful: John Doe\n",
                "- John Doe: checked in since 2024-03-01 03:30:00\n",
                "Already checked in\n",
                "- John Doe: not checked in\n",
                "Check Out Successful: John Doe\n",
            ]
            .join("")
        );
    }
}
