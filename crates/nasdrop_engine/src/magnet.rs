use std::time::Duration;

use nasdrop_logging::nas_info;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;

use crate::gateway::GatewayError;

const LOGIN_METHOD: &str = "auth.login";
const ADD_MAGNET_METHOD: &str = "core.add_torrent_magnet";

/// Hands magnet links to a torrent client.
#[async_trait::async_trait]
pub trait MagnetGateway: Send + Sync {
    /// Returns the client's identifier for the new torrent.
    async fn add_magnet(&self, magnet_uri: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct DelugeSettings {
    /// JSON-RPC endpoint of the Deluge web UI, e.g. `http://nas:8112/json`.
    pub url: String,
    pub password: String,
    pub download_path: String,
    pub request_timeout: Duration,
}

impl Default for DelugeSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8112/json".to_string(),
            password: String::new(),
            download_path: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

/// Deluge web JSON-RPC client. The session cookie from `auth.login` is kept for later calls.
pub struct DelugeClient {
    client: reqwest::Client,
    settings: DelugeSettings,
    session_cookie: OnceCell<String>,
}

impl DelugeClient {
    pub fn new(settings: DelugeSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::Transport {
                api: LOGIN_METHOD.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            settings,
            session_cookie: OnceCell::new(),
        })
    }

    async fn session_cookie(&self) -> Result<&str, GatewayError> {
        self.session_cookie
            .get_or_try_init(|| self.login())
            .await
            .map(String::as_str)
    }

    async fn login(&self) -> Result<String, GatewayError> {
        nas_info!("Logging in to Deluge at {}", self.settings.url);
        let (response, cookie) = self
            .rpc(LOGIN_METHOD, json!([self.settings.password]), None)
            .await?;
        if response.result != serde_json::Value::Bool(true) {
            return Err(GatewayError::Rejected {
                api: LOGIN_METHOD.to_string(),
                message: "login refused".to_string(),
            });
        }
        cookie.ok_or_else(|| GatewayError::InvalidResponse {
            api: LOGIN_METHOD.to_string(),
            message: "no session cookie".to_string(),
        })
    }

    async fn rpc(
        &self,
        method: &str,
        params: serde_json::Value,
        cookie: Option<&str>,
    ) -> Result<(RpcResponse, Option<String>), GatewayError> {
        let body = json!({ "method": method, "params": params, "id": 1 });
        let mut request = self
            .client
            .post(&self.settings.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|err| GatewayError::Transport {
            api: method.to_string(),
            message: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus {
                api: method.to_string(),
                status: status.as_u16(),
            });
        }

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|pair| pair.trim().to_string());
        let text = response.text().await.map_err(|err| GatewayError::Transport {
            api: method.to_string(),
            message: err.to_string(),
        })?;
        let parsed: RpcResponse =
            serde_json::from_str(&text).map_err(|err| GatewayError::InvalidResponse {
                api: method.to_string(),
                message: err.to_string(),
            })?;

        if let Some(error) = parsed.error {
            return Err(GatewayError::Rejected {
                api: method.to_string(),
                message: error.message,
            });
        }
        Ok((parsed, set_cookie))
    }
}

#[async_trait::async_trait]
impl MagnetGateway for DelugeClient {
    async fn add_magnet(&self, magnet_uri: &str) -> Result<String, GatewayError> {
        let cookie = self.session_cookie().await?;
        let mut options = serde_json::Map::new();
        if !self.settings.download_path.is_empty() {
            options.insert("download_location".to_string(), json!(self.settings.download_path));
        }

        let (response, _) = self
            .rpc(ADD_MAGNET_METHOD, json!([magnet_uri, options]), Some(cookie))
            .await?;
        match response.result {
            serde_json::Value::String(torrent_id) => {
                nas_info!("Deluge accepted magnet as {}", torrent_id);
                Ok(torrent_id)
            }
            other => Err(GatewayError::InvalidResponse {
                api: ADD_MAGNET_METHOD.to_string(),
                message: format!("unexpected result {other}"),
            }),
        }
    }
}
