use std::env;

const DEFAULT_ODOO_URL: &str = "https://developers4.odoo.com";
const DEFAULT_ODOO_DB: &str = "developers4";

/// 接続先のOdooの設定。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OdooConfig {
    pub url: String,
    pub database: String,
}

impl OdooConfig {
    /// 環境変数`ODOO_URL`、`ODOO_DB`から設定を作成する。
    ///
    /// 設定されていない、または空の場合は既定値を利用する。
    pub fn from_env() -> Self {
        Self::from_values(env::var("ODOO_URL").ok(), env::var("ODOO_DB").ok())
    }

    fn from_values(url: Option<String>, database: Option<String>) -> Self {
        let url = non_blank(url).unwrap_or_else(|| DEFAULT_ODOO_URL.to_string());
        let database = non_blank(database).unwrap_or_else(|| DEFAULT_ODOO_DB.to_string());

        Self {
            url: url.trim_end_matches('/').to_string(),
            database,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
