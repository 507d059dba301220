//! GoFile API client: guest account creation and link resolution.
//!
//! This is the collaborator the download core consumes: given a content URL
//! and optional password, it produces the flat list of (filename, direct
//! download URL, size) records.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::GOFILE_API;
use crate::error::{Error, Result};

static CONTENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gofile\.io/d/([A-Za-z0-9]+)").expect("valid regex"));

/// Extracts the content id from a `https://gofile.io/d/{id}` URL.
#[must_use]
pub fn extract_content_id(url: &str) -> Option<&str> {
    CONTENT_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Hashes a content password for transmission (SHA-256 hex digest).
#[must_use]
pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// One resolved file within a GoFile folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    /// File name as stored on the host.
    pub filename: String,
    /// Direct download URL.
    pub download_url: String,
    /// Size in bytes, `None` when the API omits it.
    pub size: Option<u64>,
}

/// Authenticated GoFile API client backed by a guest account token.
pub struct GofileClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GofileClient {
    /// Creates a guest account against the production API and returns a
    /// client holding its bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the account request fails or the response
    /// carries no token.
    pub async fn new_guest(http: reqwest::Client) -> Result<Self> {
        Self::with_api_base(http, GOFILE_API).await
    }

    /// Same as [`new_guest`](Self::new_guest) against a custom API base.
    ///
    /// # Errors
    ///
    /// Returns an error if the account request fails or the response
    /// carries no token.
    pub async fn with_api_base(http: reqwest::Client, api_base: &str) -> Result<Self> {
        let body: Value = http
            .post(format!("{api_base}/accounts"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if body["status"] != "ok" {
            return Err(Error::Api(format!(
                "account creation rejected: {}",
                body["status"]
            )));
        }
        let token = body["data"]["token"]
            .as_str()
            .ok_or_else(|| Error::Api("account response missing token".to_string()))?
            .to_string();
        Ok(Self {
            http,
            api_base: api_base.to_string(),
            token,
        })
    }

    /// Returns the account token, used as the download cookie.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolves a content URL into its flat file list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for non-GoFile URLs, password-protected
    /// content without a valid password, or a non-ok API status.
    pub async fn resolve(&self, url: &str, password: Option<&str>) -> Result<Vec<RemoteFile>> {
        let content_id = extract_content_id(url)
            .ok_or_else(|| Error::Api(format!("not a GoFile content URL: {url}")))?;
        self.resolve_content(content_id, password).await
    }

    /// Resolves a content id into its flat file list.
    ///
    /// # Errors
    ///
    /// Same conditions as [`resolve`](Self::resolve).
    pub async fn resolve_content(
        &self,
        content_id: &str,
        password: Option<&str>,
    ) -> Result<Vec<RemoteFile>> {
        let mut request = self
            .http
            .get(format!("{}/contents/{content_id}", self.api_base))
            .bearer_auth(&self.token);
        if let Some(password) = password {
            request = request.query(&[("password", hash_password(password))]);
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        if body["status"] != "ok" {
            return Err(Error::Api(format!(
                "content {content_id} rejected: {}",
                body["status"]
            )));
        }

        let data = &body["data"];
        if data.get("password").is_some() && data["passwordStatus"] != "passwordOk" {
            return Err(Error::Api(format!(
                "content {content_id} requires a valid password"
            )));
        }

        let mut files = Vec::new();
        flatten_content(data, &mut files);
        Ok(files)
    }
}

/// Walks a content node, descending folders depth-first and collecting
/// files in the order the API lists them.
fn flatten_content(data: &Value, out: &mut Vec<RemoteFile>) {
    if data["type"] == "folder" {
        if let Some(children) = data["children"].as_object() {
            for child in children.values() {
                if child["type"] == "folder" {
                    flatten_content(child, out);
                } else {
                    push_file(child, out);
                }
            }
        }
    } else {
        push_file(data, out);
    }
}

fn push_file(node: &Value, out: &mut Vec<RemoteFile>) {
    if let (Some(name), Some(link)) = (node["name"].as_str(), node["link"].as_str()) {
        out.push(RemoteFile {
            filename: name.to_string(),
            download_url: link.to_string(),
            size: node["size"].as_u64(),
        });
    }
}
