use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_SQL_FILE: &str = "database/setup_database.sql";
pub const DEFAULT_RPC_FUNCTION: &str = "exec_sql";
pub const DEFAULT_RPC_PARAM: &str = "sql";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub connect_timeout_ms: u64,
    pub statement_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            statement_timeout_ms: 30000,
            probe_timeout_ms: 10000,
        }
    }
}

/// Values given on the command line. They shadow the environment key by key,
/// so a flag can stand in for a required variable.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sql_file: Option<PathBuf>,
    pub service_url: Option<String>,
    pub rpc_function: Option<String>,
    pub check_connection: bool,
    pub append_semicolon: bool,
}

impl Overrides {
    pub fn get(&self, k: &str) -> Option<String> {
        match k {
            "SQL_FILE" => self
                .sql_file
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            "SERVICE_URL" => self.service_url.clone(),
            "RPC_FUNCTION" => self.rpc_function.clone(),
            "CHECK_CONNECTION" if self.check_connection => Some("true".to_string()),
            "SQL_APPEND_SEMICOLON" if self.append_semicolon => Some("true".to_string()),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub service_url: String,
    pub service_key: String,
    pub sql_file: PathBuf,
    pub rpc_function: String,
    pub rpc_param: String,
    pub append_semicolon: bool,
    pub check_connection: bool,
    pub client: ClientSettings,
}

// Hand-written so the access key never ends up in a log line.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("service_url", &self.service_url)
            .field("service_key", &"<redacted>")
            .field("sql_file", &self.sql_file)
            .field("rpc_function", &self.rpc_function)
            .field("rpc_param", &self.rpc_param)
            .field("append_semicolon", &self.append_semicolon)
            .field("check_connection", &self.check_connection)
            .field("client", &self.client)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|k| overrides.get(k).or_else(|| std::env::var(k).ok()))
    }

    /// Builds the config from any key lookup; `from_env` passes the command
    /// line values layered over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_url = required(&lookup, "SERVICE_URL")?;
        let service_url = normalize_service_url(&service_url)?;
        let service_key = required(&lookup, "SERVICE_KEY")?;

        let sql_file = lookup("SQL_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SQL_FILE));
        let rpc_function = lookup("RPC_FUNCTION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_FUNCTION.to_string());
        let rpc_param = lookup("RPC_PARAM")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_PARAM.to_string());

        let append_semicolon = env_bool(&lookup, "SQL_APPEND_SEMICOLON", false);
        let check_connection = env_bool(&lookup, "CHECK_CONNECTION", false);

        let mut client = ClientSettings::default();
        client.connect_timeout_ms =
            env_u64(&lookup, "SERVICE_CONNECT_TIMEOUT_MS", client.connect_timeout_ms);
        client.statement_timeout_ms =
            env_u64(&lookup, "STATEMENT_TIMEOUT_MS", client.statement_timeout_ms);
        client.probe_timeout_ms = env_u64(&lookup, "PROBE_TIMEOUT_MS", client.probe_timeout_ms);

        Ok(Self {
            service_url,
            service_key,
            sql_file,
            rpc_function,
            rpc_param,
            append_semicolon,
            check_connection,
            client,
        })
    }

    pub fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.service_url, self.rpc_function)
    }

    pub fn rest_root_url(&self) -> String {
        format!("{}/rest/v1/", self.service_url)
    }
}

fn normalize_service_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ConfigError::Invalid {
            name: "SERVICE_URL",
            reason: format!("expected an http(s) URL, got {:?}", raw),
        });
    }
    Ok(url.to_string())
}

fn required<F>(lookup: &F, k: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(k) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(k)),
    }
}

fn env_bool<F>(lookup: &F, k: &str, d: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(k)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(d)
}

fn env_u64<F>(lookup: &F, k: &str, d: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(k)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(d)
}
