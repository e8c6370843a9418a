use log::{error, info, warn};

use crate::attendance::AttendanceRecord;
use crate::datetime::{now, parse_odoo_timestamp, to_odoo_timestamp};
use crate::error::{AttendanceError, AttendanceResult};
use crate::odoo::OdooRepository;
use crate::session::Session;

/// 従業員の勤怠の状態。
#[derive(Clone, Debug, PartialEq)]
pub enum AttendanceState {
    /// 未退勤の記録が無い。次は出勤のみ可能。
    NoOpenRecord,
    /// 未退勤の記録がある。次は退勤のみ可能。
    OpenRecord(AttendanceRecord),
}

/// 勤怠の状態を保持し、出勤と退勤を行う。
///
/// 出勤済みでの出勤、未出勤での退勤はOdooへ送る前に拒否する。
/// 最終的な判断はOdoo側で行われるため、拒否された場合は`refresh`してからやり直す。
pub struct AttendanceTracker<'a, R: OdooRepository + ?Sized> {
    repository: &'a R,
    session: Session,
    state: AttendanceState,
}

impl<'a, R: OdooRepository + ?Sized> AttendanceTracker<'a, R> {
    /// 新しい`AttendanceTracker`を返す。
    ///
    /// サーバーの状態を反映するには`refresh`を呼ぶ。
    ///
    /// # Arguments
    /// * `repository` - Odooと通信するためのリポジトリ
    /// * `session` - ログイン中の従業員
    pub fn new(repository: &'a R, session: Session) -> Self {
        Self {
            repository,
            session,
            state: AttendanceState::NoOpenRecord,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &AttendanceState {
        &self.state
    }

    /// 未退勤の記録をOdooから取得し、状態を置き換える。
    pub async fn refresh(&mut self) -> AttendanceResult<&AttendanceState> {
        let record = self
            .repository
            .read_open_attendance(self.session.employee_id)
            .await
            .map_err(|err| {
                error!("Error checking current attendance: {:#}", err);
                AttendanceError::network(err)
            })?;

        self.state = match record {
            Some(record) => AttendanceState::OpenRecord(record),
            None => AttendanceState::NoOpenRecord,
        };

        Ok(&self.state)
    }

    /// 出勤する。
    ///
    /// 成功した場合は表示用のメッセージを返す。
    pub async fn check_in(&mut self) -> AttendanceResult<String> {
        if let AttendanceState::OpenRecord(_) = self.state {
            return Err(AttendanceError::AlreadyCheckedIn);
        }

        let check_in = to_odoo_timestamp(&now());
        let attendance_id = self
            .repository
            .create_attendance(self.session.employee_id, &check_in)
            .await
            .map_err(|err| {
                error!("Check In Error: {:#}", err);
                AttendanceError::network(err)
            })?;
        info!(
            "Check In Details: Employee ID: {}, Name: {}, Check-In Time: {}",
            self.session.employee_id, self.session.name, check_in
        );

        // 作成は済んでいるため、取り直しに失敗しても出勤済みとして扱う
        let reported_open = match self.refresh().await {
            Ok(state) => matches!(state, AttendanceState::OpenRecord(_)),
            Err(err) => {
                warn!("Failed to refresh after check in: {}", err);
                false
            }
        };
        if !reported_open {
            warn!(
                "Attendance {} is not reported as open yet, keeping it locally",
                attendance_id
            );
            self.state = AttendanceState::OpenRecord(AttendanceRecord {
                id: attendance_id,
                employee_id: self.session.employee_id,
                check_in: parse_odoo_timestamp(&check_in)
                    .map_err(AttendanceError::network)?,
                check_out: None,
            });
        }

        Ok(format!("Check In Successful: {}", self.session.name))
    }

    /// 退勤する。
    ///
    /// 成功した場合は表示用のメッセージを返す。
    pub async fn check_out(&mut self) -> AttendanceResult<String> {
        let attendance_id = match &self.state {
            AttendanceState::OpenRecord(record) => record.id,
            AttendanceState::NoOpenRecord => return Err(AttendanceError::NotCheckedIn),
        };

        let check_out = to_odoo_timestamp(&now());
        self.repository
            .close_attendance(attendance_id, &check_out)
            .await
            .map_err(|err| {
                error!("Check Out Error: {:#}", err);
                AttendanceError::network(err)
            })?;
        info!(
            "Check Out Details: Employee ID: {}, Name: {}, Check-Out Time: {}",
            self.session.employee_id, self.session.name, check_out
        );
        self.state = AttendanceState::NoOpenRecord;

        Ok(format!("Check Out Successful: {}", self.session.name))
    }
}
