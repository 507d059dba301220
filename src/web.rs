//! Minimal web front-end exposing link resolution over HTTP.
//!
//! Resolution only: the server maps GoFile content URLs to direct download
//! links but never downloads anything itself.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{GofileClient, RemoteFile};
use crate::error::Result;

#[derive(Clone)]
struct AppState {
    client: Arc<GofileClient>,
}

#[derive(Deserialize)]
struct ResolveRequest {
    urls: Vec<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct UrlResult {
    url: String,
    files: Vec<RemoteFile>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ResolveResponse {
    results: Vec<UrlResult>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn api_health() -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn api_resolve(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ResolveRequest>,
) -> impl IntoResponse {
    let mut results = Vec::with_capacity(payload.urls.len());
    for url in payload.urls {
        let result = state
            .client
            .resolve(url.trim(), payload.password.as_deref())
            .await;
        results.push(match result {
            Ok(files) => UrlResult {
                url,
                files,
                error: None,
            },
            Err(e) => UrlResult {
                url,
                files: Vec::new(),
                error: Some(e.to_string()),
            },
        });
    }
    axum::Json(ResolveResponse { results })
}

async fn index_page() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>gofile-dl link resolver</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 640px; margin: 60px auto; color: #e0e0e0; background: #1a1a2e; }
  h1 { font-size: 1.4rem; }
  textarea, input { width: 100%; background: #16213e; color: #e0e0e0; border: 1px solid #0f3460; border-radius: 4px; padding: 8px; }
  button { padding: 10px 20px; margin: 12px 0; background: #0f3460; color: #e94560; border: 2px solid #e94560; border-radius: 6px; font-weight: bold; cursor: pointer; }
  button:hover { background: #16213e; }
  pre { background: #16213e; padding: 10px; border-radius: 4px; overflow-x: auto; }
</style>
</head>
<body>
<h1>gofile-dl link resolver</h1>
<p>Paste GoFile URLs (one per line), optionally a password, and get direct download links.</p>
<textarea id="urls" rows="5" placeholder="https://gofile.io/d/..."></textarea>
<input id="password" type="password" placeholder="Password (optional)">
<button onclick="resolveLinks()">Resolve</button>
<pre id="out"></pre>
<script>
async function resolveLinks() {
  const urls = document.getElementById('urls').value.split('\n').map(u => u.trim()).filter(u => u);
  const password = document.getElementById('password').value || null;
  const res = await fetch('/api/resolve', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({urls, password}),
  });
  document.getElementById('out').textContent = JSON.stringify(await res.json(), null, 2);
}
</script>
</body>
</html>"#,
    )
}

/// Builds the resolver router around a shared GoFile client.
#[must_use]
pub fn router(client: Arc<GofileClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_page))
        .route("/api/health", get(api_health))
        .route("/api/resolve", post(api_resolve))
        .layer(cors)
        .with_state(AppState { client })
}

/// Binds the resolver server and runs it until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(client: Arc<GofileClient>, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("resolver listening on http://{addr}");
    axum::serve(listener, router(client)).await?;
    Ok(())
}
