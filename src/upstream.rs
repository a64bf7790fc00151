use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, StatusCode,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, ClientSettings},
    timeouts::InterfaceClass,
};

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("SERVICE_KEY contains characters that are not valid in an HTTP header")]
    InvalidKey,
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("service answered {0}")]
    Status(StatusCode),
    #[error("service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client with the service credentials attached to every request.
pub fn build_service_client(
    service_key: &str,
    settings: &ClientSettings,
) -> Result<Client, ClientBuildError> {
    let mut apikey =
        HeaderValue::from_str(service_key).map_err(|_| ClientBuildError::InvalidKey)?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", service_key))
        .map_err(|_| ClientBuildError::InvalidKey)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);

    let client = Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()?;
    Ok(client)
}

/// Checks that the REST root answers with the configured key.
pub async fn probe_connection(client: &Client, cfg: &AppConfig) -> Result<(), ProbeError> {
    let url = cfg.rest_root_url();
    let mut rb = client.get(&url);
    if let Some(budget) = InterfaceClass::Probe.request_budget(&cfg.client) {
        rb = rb.timeout(budget);
    }

    let resp = match rb.send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(event = "probe_failed", url = %url, message = %e);
            return Err(ProbeError::Transport(e));
        }
    };

    let status = resp.status();
    if status != StatusCode::OK {
        warn!(event = "probe_failed", url = %url, status = status.as_u16());
        return Err(ProbeError::Status(status));
    }
    info!(event = "probe_ok", url = %url);
    Ok(())
}
