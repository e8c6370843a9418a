use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::attendance::{AttendanceRecord, Employee};
use crate::config::OdooConfig;
use crate::datetime::parse_odoo_timestamp;

/// JSON-RPCのリクエスト。
#[derive(Debug, Serialize)]
struct RpcRequest<P> {
    jsonrpc: &'static str,
    method: &'static str,
    params: P,
}

impl<P> RpcRequest<P> {
    fn call(params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
        }
    }
}

/// `/web/dataset/call_kw`に渡すパラメータ。
#[derive(Debug, Serialize)]
struct CallKwParams<'a> {
    model: &'a str,
    method: &'a str,
    args: Value,
    kwargs: Value,
}

/// `/web/session/authenticate`に渡すパラメータ。
#[derive(Debug, Serialize)]
struct AuthenticateParams<'a> {
    db: &'a str,
    login: &'a str,
    password: &'a str,
}

/// JSON-RPCのレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl RpcResponse {
    /// `result`を取り出す。
    ///
    /// `result`が無い、またはfalsyな値の場合は失敗として扱う。
    fn into_result(self) -> Result<Value> {
        if let Some(error) = &self.error {
            warn!("Odoo returned an error: {}", error);
        }

        match self.result {
            Some(result) if !is_falsy(&result) => Ok(result),
            _ => {
                let message = self
                    .error
                    .as_ref()
                    .and_then(|error| {
                        error
                            .pointer("/data/message")
                            .or_else(|| error.get("message"))
                    })
                    .and_then(Value::as_str)
                    .unwrap_or("empty result");
                bail!("Odoo returned no result: {}", message)
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Odooは値が無いフィールドを`false`で返すため、`None`として読む。
fn false_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FalseOr<T> {
        Value(T),
        False(bool),
    }

    match Option::<FalseOr<T>>::deserialize(deserializer)? {
        Some(FalseOr::Value(value)) => Ok(Some(value)),
        Some(FalseOr::False(false)) | None => Ok(None),
        Some(FalseOr::False(true)) => Err(de::Error::custom(
            "expected a value or `false`, found `true`",
        )),
    }
}

/// 認証に成功したユーザーの情報。
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct OdooUser {
    #[serde(default, deserialize_with = "false_as_none")]
    pub uid: Option<i64>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub name: Option<String>,
}

/// `hr.employee`の行をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct OdooEmployee {
    id: i64,
    #[serde(default, deserialize_with = "false_as_none")]
    name: Option<String>,
}

/// `hr.attendance`の行をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct OdooAttendance {
    id: i64,
    #[serde(default, deserialize_with = "false_as_none")]
    employee_id: Option<(i64, String)>,
    check_in: String,
    #[serde(default, deserialize_with = "false_as_none")]
    check_out: Option<String>,
}

impl OdooAttendance {
    /// 勤怠記録に変換する。
    ///
    /// 行に従業員が含まれない場合は、検索に利用した従業員IDを使う。
    fn into_record(self, employee_id: i64) -> Result<AttendanceRecord> {
        let check_in = parse_odoo_timestamp(&self.check_in)
            .with_context(|| format!("Invalid check_in on attendance {}", self.id))?;
        let check_out = self
            .check_out
            .as_deref()
            .map(parse_odoo_timestamp)
            .transpose()
            .with_context(|| format!("Invalid check_out on attendance {}", self.id))?;

        Ok(AttendanceRecord {
            id: self.id,
            employee_id: self
                .employee_id
                .map(|(id, _)| id)
                .unwrap_or(employee_id),
            check_in,
            check_out,
        })
    }
}

fn parse_rows<T: for<'de> Deserialize<'de>>(result: Value) -> Result<Vec<T>> {
    serde_json::from_value(result).context("Failed to deserialize rows")
}

/// Odooの勤怠に関する操作を行うリポジトリ。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OdooRepository {
    /// ユーザー名とパスワードで認証する。
    async fn authenticate(&self, login: &str, password: &str) -> Result<OdooUser>;

    /// 名前が一致する従業員を検索する。
    async fn find_employee(&self, name: &str) -> Result<Option<Employee>>;

    /// 従業員の未退勤の勤怠記録を取得する。
    async fn read_open_attendance(&self, employee_id: i64) -> Result<Option<AttendanceRecord>>;

    /// 出勤記録を作成し、作成した記録のIDを返す。
    async fn create_attendance(&self, employee_id: i64, check_in: &str) -> Result<i64>;

    /// 勤怠記録に退勤日時を書き込む。
    async fn close_attendance(&self, attendance_id: i64, check_out: &str) -> Result<()>;

    /// 従業員の全ての勤怠記録を取得する。
    async fn read_attendances(&self, employee_id: i64) -> Result<Vec<AttendanceRecord>>;
}

/// Odoo APIと通信するためのクライアント。
///
/// 認証で得たセッションをcookieで保持するため、同じクライアントを使い回す。
///
/// # Examples
///
/// ```
/// let client = OdooClient::new(&OdooConfig::from_env()).unwrap();
/// let user = client.authenticate("admin", "admin").await.unwrap();
/// ```
pub struct OdooClient {
    client: Client,
    api_url: String,
    database: String,
}

impl OdooClient {
    /// 新しい`OdooClient`を返す。
    pub fn new(config: &OdooConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.url.clone(),
            database: config.database.clone(),
        })
    }

    /// JSON-RPCでリクエストを送り、`result`を返す。
    async fn post<P: Serialize>(&self, path: &str, params: P) -> Result<Value> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&RpcRequest::call(params))
            .send()
            .await
            .with_context(|| format!("Failed to send request to Odoo at {}", url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<RpcResponse>()
            .await
            .context("Failed to deserialize response")?;

        response.into_result()
    }

    /// モデルのメソッドを呼び出す。
    ///
    /// # Arguments
    ///
    /// * `model` - 呼び出すモデル(例: `hr.attendance`)
    /// * `method` - 呼び出すメソッド(例: `search_read`)
    /// * `args` - メソッドに渡す位置引数
    pub async fn call_kw(&self, model: &str, method: &str, args: Value) -> Result<Value> {
        debug!("Calling {}.{} with {}", model, method, args);
        self.post(
            "/web/dataset/call_kw",
            CallKwParams {
                model,
                method,
                args,
                kwargs: json!({}),
            },
        )
        .await
        .with_context(|| format!("Failed to call {}.{}", model, method))
    }
}

#[async_trait]
impl OdooRepository for OdooClient {
    async fn authenticate(&self, login: &str, password: &str) -> Result<OdooUser> {
        let result = self
            .post(
                "/web/session/authenticate",
                AuthenticateParams {
                    db: &self.database,
                    login,
                    password,
                },
            )
            .await
            .context("Authentication failed. Please check your credentials.")?;
        let user: OdooUser =
            serde_json::from_value(result).context("Failed to deserialize session info")?;
        info!("Authenticated as {:?} (uid: {:?})", user.username, user.uid);

        Ok(user)
    }

    async fn find_employee(&self, name: &str) -> Result<Option<Employee>> {
        let result = self
            .call_kw(
                "hr.employee",
                "search_read",
                json!([[["name", "=", name]], ["id", "name"]]),
            )
            .await?;
        let employees: Vec<OdooEmployee> = parse_rows(result)?;
        info!("length of employees named {}: {}", name, employees.len());

        Ok(employees.into_iter().next().map(|employee| Employee {
            id: employee.id,
            display_name: employee.name.unwrap_or_else(|| name.to_string()),
        }))
    }

    async fn read_open_attendance(&self, employee_id: i64) -> Result<Option<AttendanceRecord>> {
        let result = self
            .call_kw(
                "hr.attendance",
                "search_read",
                json!([
                    [["employee_id", "=", employee_id], ["check_out", "=", false]],
                    ["employee_id", "check_in", "check_out"]
                ]),
            )
            .await?;
        let rows: Vec<OdooAttendance> = parse_rows(result)?;

        rows.into_iter()
            .next()
            .map(|row| row.into_record(employee_id))
            .transpose()
    }

    async fn create_attendance(&self, employee_id: i64, check_in: &str) -> Result<i64> {
        let result = self
            .call_kw(
                "hr.attendance",
                "create",
                json!([{ "employee_id": employee_id, "check_in": check_in }]),
            )
            .await?;

        // 単一のdictを渡すとIDが、listを渡すとIDのlistが返る
        result
            .as_i64()
            .or_else(|| result.get(0).and_then(Value::as_i64))
            .with_context(|| format!("Unexpected result from hr.attendance.create: {}", result))
    }

    async fn close_attendance(&self, attendance_id: i64, check_out: &str) -> Result<()> {
        self.call_kw(
            "hr.attendance",
            "write",
            json!([[attendance_id], { "check_out": check_out }]),
        )
        .await?;

        Ok(())
    }

    async fn read_attendances(&self, employee_id: i64) -> Result<Vec<AttendanceRecord>> {
        let result = self
            .call_kw(
                "hr.attendance",
                "search_read",
                json!([[["employee_id", "=", employee_id]], ["check_in", "check_out"]]),
            )
            .await?;
        let rows: Vec<OdooAttendance> = parse_rows(result)?;
        info!("length of attendances: {}", rows.len());

        rows.into_iter()
            .map(|row| row.into_record(employee_id))
            .collect()
    }
}
