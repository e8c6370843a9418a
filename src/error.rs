use thiserror::Error;

/// 勤怠操作で発生するエラー。
///
/// 通信層のエラーは`anyhow::Error`のまま扱い、呼び出し側でこの型に変換する。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Already checked in")]
    AlreadyCheckedIn,

    #[error("Not checked in")]
    NotCheckedIn,

    #[error("Network or server error: {0}")]
    NetworkOrServer(String),
}

impl AttendanceError {
    /// 通信層のエラーを`NetworkOrServer`に変換する。
    ///
    /// contextの連鎖を残すため`{:#}`で文字列化する。
    pub fn network(error: anyhow::Error) -> Self {
        Self::NetworkOrServer(format!("{:#}", error))
    }

    /// クライアント側のガードによる拒否かどうかを返す。
    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::AlreadyCheckedIn | Self::NotCheckedIn)
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;
