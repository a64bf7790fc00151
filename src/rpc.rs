//! Remote execution of single statements through the service's exec-SQL RPC.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{config::AppConfig, timeouts::InterfaceClass};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("HTTP {status}: {message}")]
    Service { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Runs one SQL statement somewhere and reports what happened.
///
/// Implementations must not retry; the caller decides what a failure means.
#[allow(async_fn_in_trait)]
pub trait StatementExecutor {
    async fn execute(&self, sql: &str) -> Result<Value, ExecError>;
}

/// Calls `POST {url}/rest/v1/rpc/{function}` with `{ "<param>": sql }`.
#[derive(Clone)]
pub struct RpcExecutor {
    client: Client,
    url: String,
    param: String,
    budget: Option<Duration>,
}

impl RpcExecutor {
    pub fn new(client: Client, cfg: &AppConfig) -> Self {
        Self {
            client,
            url: cfg.rpc_url(),
            param: cfg.rpc_param.clone(),
            budget: InterfaceClass::Statement.request_budget(&cfg.client),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn body(&self, sql: &str) -> Value {
        let mut body = Map::new();
        body.insert(self.param.clone(), Value::String(sql.to_string()));
        Value::Object(body)
    }
}

impl StatementExecutor for RpcExecutor {
    async fn execute(&self, sql: &str) -> Result<Value, ExecError> {
        let mut rb = self
            .client
            .post(&self.url)
            .header("Prefer", "return=minimal")
            .json(&self.body(sql));
        if let Some(budget) = self.budget {
            rb = rb.timeout(budget);
        }

        let started = Instant::now();
        let resp = rb.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(
            event = "rpc_response",
            status = status.as_u16(),
            sql_len = sql.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
        );

        if matches!(
            status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
        ) {
            return Ok(parse_payload(&text));
        }

        Err(ExecError::Service {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }
}

fn parse_payload(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// PostgREST error body; `code`, `details` and `hint` are ignored.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

/// Prefers the `message` of a JSON error body, otherwise passes the body
/// through as text.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ServiceErrorBody {
        message: Some(message),
    }) = serde_json::from_str::<ServiceErrorBody>(body)
    {
        return message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
