//! Full-session tests: URL list in, files and session log out, driven
//! against a mock GoFile API served in-process.

#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;
use tempfile::TempDir;

use gofile_dl::api::hash_password;
use gofile_dl::session::run_session;
use gofile_dl::{AppConfig, Downloader, Error, GofileClient, LiveDisplay};

const BODY_A: &[u8] = b"the quick brown fox jumps over the lazy dog";

/// Serves a mock GoFile API on an ephemeral port and returns its base URL.
///
/// `/accounts` hands out a guest token, `/contents/{id}` knows the content
/// ids `abc123` (folder with one good and one missing file), `locked`
/// (password `secret`) and nothing else, `/files/{name}` serves the bodies.
async fn spawn_mock_api() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let files_base = base.clone();
    let app = Router::new()
        .route(
            "/accounts",
            post(|| async { axum::Json(json!({"status": "ok", "data": {"token": "guest-token"}})) }),
        )
        .route(
            "/contents/{id}",
            get(
                move |Path(id): Path<String>, Query(query): Query<HashMap<String, String>>| {
                    let base = files_base.clone();
                    async move { contents_response(&base, &id, &query) }
                },
            ),
        )
        .route(
            "/files/{name}",
            get(|Path(name): Path<String>| async move {
                if name == "a.bin" {
                    (StatusCode::OK, BODY_A.to_vec())
                } else {
                    (StatusCode::NOT_FOUND, Vec::new())
                }
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn contents_response(
    base: &str,
    id: &str,
    query: &HashMap<String, String>,
) -> axum::response::Response {
    let body = match id {
        "abc123" => json!({
            "status": "ok",
            "data": {
                "type": "folder",
                "children": {
                    "a": {
                        "type": "file",
                        "name": "a.bin",
                        "link": format!("{base}/files/a.bin"),
                        "size": BODY_A.len(),
                    },
                    "b": {
                        "type": "file",
                        "name": "missing.bin",
                        "link": format!("{base}/files/missing.bin"),
                        "size": 10,
                    },
                },
            },
        }),
        "locked" => {
            let status = if query.get("password") == Some(&hash_password("secret")) {
                "passwordOk"
            } else {
                "passwordWrong"
            };
            json!({
                "status": "ok",
                "data": {
                    "password": true,
                    "passwordStatus": status,
                    "type": "file",
                    "name": "a.bin",
                    "link": format!("{base}/files/a.bin"),
                    "size": BODY_A.len(),
                },
            })
        }
        _ => json!({"status": "error-notFound"}),
    };
    axum::Json(body).into_response()
}

/// Points every session path at a temp directory.
fn test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::new();
    config.paths.download_dir = dir.path().join("downloads");
    config.paths.urls_file = dir.path().join("URLs.txt");
    config.paths.session_log = dir.path().join("session_log.txt");
    config
}

async fn test_client(base: &str) -> GofileClient {
    GofileClient::with_api_base(reqwest::Client::new(), base)
        .await
        .unwrap()
}

#[tokio::test]
async fn session_downloads_urls_and_logs_failures() {
    let base = spawn_mock_api().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.paths.urls_file, "https://gofile.io/d/abc123\n").unwrap();

    let client = test_client(&base).await;
    assert_eq!(client.token(), "guest-token");
    let downloader = Downloader::new(reqwest::Client::new());
    let live = Arc::new(LiveDisplay::new(&config.download));

    run_session(&config, &client, &downloader, &live, None)
        .await
        .unwrap();

    // The good file landed byte-for-byte; the failed one was never created.
    let downloaded = std::fs::read(config.paths.download_dir.join("a.bin")).unwrap();
    assert_eq!(downloaded, BODY_A);
    assert!(!config.paths.download_dir.join("missing.bin").exists());

    // The list is truncated once the session drains.
    assert_eq!(
        std::fs::read_to_string(&config.paths.urls_file).unwrap(),
        ""
    );

    // The failing file left a line in the session log.
    let log = std::fs::read_to_string(&config.paths.session_log).unwrap();
    assert!(log.contains("missing.bin"), "session log: {log}");

    let snap = live.progress().snapshot();
    assert_eq!(snap.overalls.len(), 1);
    assert_eq!(snap.overalls[0].description, "abc123");
    assert_eq!(snap.overalls[0].completed, 1);
    assert_eq!(snap.overalls[0].failed, 1);
    assert!(snap.overalls[0].finished);
}

#[tokio::test]
async fn empty_url_list_is_a_no_op() {
    let base = spawn_mock_api().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.paths.urls_file, "").unwrap();

    let client = test_client(&base).await;
    let downloader = Downloader::new(reqwest::Client::new());
    let live = Arc::new(LiveDisplay::new(&config.download));

    run_session(&config, &client, &downloader, &live, None)
        .await
        .unwrap();

    assert!(live.progress().snapshot().overalls.is_empty());
    assert!(!config.paths.download_dir.exists());
}

#[tokio::test]
async fn unresolvable_url_is_logged_and_skipped() {
    let base = spawn_mock_api().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.paths.urls_file, "https://gofile.io/d/nosuchid\n").unwrap();

    let client = test_client(&base).await;
    let downloader = Downloader::new(reqwest::Client::new());
    let live = Arc::new(LiveDisplay::new(&config.download));

    run_session(&config, &client, &downloader, &live, None)
        .await
        .unwrap();

    // No overall task is ever registered for a URL that fails resolution,
    // but the failure is recorded and the list still cleared.
    assert!(live.progress().snapshot().overalls.is_empty());
    let log = std::fs::read_to_string(&config.paths.session_log).unwrap();
    assert!(log.contains("nosuchid"), "session log: {log}");
    assert_eq!(
        std::fs::read_to_string(&config.paths.urls_file).unwrap(),
        ""
    );
}

#[tokio::test]
async fn password_protected_content_rejects_wrong_password() {
    let base = spawn_mock_api().await;
    let client = test_client(&base).await;

    let err = client
        .resolve("https://gofile.io/d/locked", Some("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(_)));

    let err = client
        .resolve("https://gofile.io/d/locked", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(_)));
}

#[tokio::test]
async fn password_protected_content_resolves_with_the_right_password() {
    let base = spawn_mock_api().await;
    let client = test_client(&base).await;

    let files = client
        .resolve("https://gofile.io/d/locked", Some("secret"))
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "a.bin");
    assert_eq!(files[0].size, Some(BODY_A.len() as u64));
}
