use log::{error, info};

use crate::error::{AttendanceError, AttendanceResult};
use crate::odoo::OdooRepository;

/// ログイン中の従業員の情報。
///
/// 画面間で引き回す代わりに、各コマンドへ明示的に渡す。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub employee_id: i64,
    pub name: String,
}

impl Session {
    /// ログイン後に表示する挨拶を返す。
    pub fn greeting(&self) -> String {
        let name = match self.name.trim() {
            "" => "Guest",
            name => name,
        };
        format!("Welcome, {}", name)
    }
}

/// ログインして従業員を特定する。
///
/// 認証の失敗と通信の失敗は区別せず`AuthenticationFailed`として返す。
/// 認証したユーザー名に一致する従業員がいない場合は`EmployeeNotFound`を返す。
///
/// # Arguments
///
/// * `repository` - Odooと通信するためのリポジトリ
/// * `username` - ログインID
/// * `password` - パスワード
pub async fn login<R: OdooRepository + ?Sized>(
    repository: &R,
    username: &str,
    password: &str,
) -> AttendanceResult<Session> {
    let user = repository
        .authenticate(username, password)
        .await
        .map_err(|err| {
            error!("Login failed: {:#}", err);
            AttendanceError::AuthenticationFailed(format!("{:#}", err))
        })?;
    let name = user.name.unwrap_or_else(|| "Guest".to_string());

    let employee = repository
        .find_employee(&name)
        .await
        .map_err(|err| {
            error!("Error fetching employee ID: {:#}", err);
            AttendanceError::network(err)
        })?
        .ok_or_else(|| AttendanceError::EmployeeNotFound(name.clone()))?;
    info!(
        "Login Details: Employee ID: {}, Name: {}",
        employee.id,
        user.username.as_deref().unwrap_or(username)
    );

    Ok(Session {
        employee_id: employee.id,
        name: employee.display_name,
    })
}
