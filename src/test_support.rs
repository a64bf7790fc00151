use axum::Router;
use tokio::net::TcpListener;

use crate::config::AppConfig;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_service(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config_for(base_url: &str, key: &str) -> AppConfig {
    let base_url = base_url.to_string();
    let key = key.to_string();
    AppConfig::from_lookup(move |k| match k {
        "SERVICE_URL" => Some(base_url.clone()),
        "SERVICE_KEY" => Some(key.clone()),
        "STATEMENT_TIMEOUT_MS" | "PROBE_TIMEOUT_MS" => Some("2000".to_string()),
        _ => None,
    })
    .unwrap()
}
