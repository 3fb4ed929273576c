//! Synology DSM Web API client: File Station for folders, Download Station for tasks.
use std::time::Duration;

use nasdrop_core::PendingTask;
use nasdrop_logging::{nas_debug, nas_info};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::{form_urlencoded, Url};

use crate::gateway::{GatewayError, TaskGateway};

const AUTH_API: &str = "SYNO.API.Auth";
const CREATE_FOLDER_API: &str = "SYNO.FileStation.CreateFolder";
const TASK_API: &str = "SYNO.DownloadStation.Task";

const AUTH_CGI: &str = "auth.cgi";
const ENTRY_CGI: &str = "entry.cgi";
const TASK_CGI: &str = "DownloadStation/task.cgi";

#[derive(Debug, Clone)]
pub struct SynologySettings {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub account: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for SynologySettings {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 5000,
            account: String::new(),
            password: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl SynologySettings {
    pub fn webapi_url(&self) -> Result<Url, GatewayError> {
        let raw = format!("{}://{}:{}/webapi/", self.protocol, self.host, self.port);
        Url::parse(&raw).map_err(|err| GatewayError::InvalidUrl(format!("{raw}: {err}")))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TaskListData {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    title: String,
    #[serde(default)]
    additional: Option<TaskAdditional>,
}

#[derive(Debug, Deserialize)]
struct TaskAdditional {
    #[serde(default)]
    detail: Option<TaskDetail>,
}

#[derive(Debug, Deserialize)]
struct TaskDetail {
    #[serde(default)]
    destination: String,
}

/// Logs in lazily on the first call and reuses the session id afterwards.
pub struct SynologyGateway {
    client: reqwest::Client,
    webapi: Url,
    settings: SynologySettings,
    sid: OnceCell<String>,
}

impl SynologyGateway {
    pub fn new(settings: SynologySettings) -> Result<Self, GatewayError> {
        let webapi = settings.webapi_url()?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::Transport {
                api: AUTH_API.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            webapi,
            settings,
            sid: OnceCell::new(),
        })
    }

    fn endpoint(&self, cgi: &str, params: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self
            .webapi
            .join(cgi)
            .map_err(|err| GatewayError::InvalidUrl(err.to_string()))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn session_id(&self) -> Result<&str, GatewayError> {
        self.sid
            .get_or_try_init(|| self.login())
            .await
            .map(String::as_str)
    }

    async fn login(&self) -> Result<String, GatewayError> {
        nas_info!("Logging in to {} as {}", self.webapi, self.settings.account);
        let url = self.endpoint(
            AUTH_CGI,
            &[
                ("api", AUTH_API),
                ("version", "3"),
                ("method", "login"),
                ("account", self.settings.account.as_str()),
                ("passwd", self.settings.password.as_str()),
                ("session", "DownloadStation"),
                ("format", "sid"),
            ],
        )?;
        let data = self.call(AUTH_API, self.client.get(url)).await?;
        let login: LoginData = parse_data(AUTH_API, data)?;
        Ok(login.sid)
    }

    /// Send a request and unwrap the `{success, data, error}` envelope.
    async fn call(
        &self,
        api: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, GatewayError> {
        let response = request.send().await.map_err(|err| GatewayError::Transport {
            api: api.to_string(),
            message: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus {
                api: api.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| GatewayError::Transport {
            api: api.to_string(),
            message: err.to_string(),
        })?;
        let envelope: ApiResponse =
            serde_json::from_str(&body).map_err(|err| GatewayError::InvalidResponse {
                api: api.to_string(),
                message: err.to_string(),
            })?;

        if !envelope.success {
            return Err(GatewayError::Api {
                api: api.to_string(),
                code: envelope.error.map(|e| e.code).unwrap_or(-1),
            });
        }
        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait::async_trait]
impl TaskGateway for SynologyGateway {
    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<(), GatewayError> {
        self.create_folders_batch(&[parent_path.to_string()], &[name.to_string()])
            .await
    }

    async fn create_folders_batch(
        &self,
        parent_paths: &[String],
        names: &[String],
    ) -> Result<(), GatewayError> {
        if parent_paths.len() != names.len() {
            return Err(GatewayError::Rejected {
                api: CREATE_FOLDER_API.to_string(),
                message: format!(
                    "{} parent paths for {} folder names",
                    parent_paths.len(),
                    names.len()
                ),
            });
        }
        if names.is_empty() {
            return Ok(());
        }

        let sid = self.session_id().await?;
        let absolute: Vec<String> = parent_paths.iter().map(|p| absolute_folder_path(p)).collect();
        let folder_path = json_array(CREATE_FOLDER_API, &absolute)?;
        let name = json_array(CREATE_FOLDER_API, names)?;
        let url = self.endpoint(
            ENTRY_CGI,
            &[
                ("api", CREATE_FOLDER_API),
                ("version", "2"),
                ("method", "create"),
                ("folder_path", folder_path.as_str()),
                ("name", name.as_str()),
                ("force_parent", "true"),
                ("_sid", sid),
            ],
        )?;

        nas_debug!("Creating {} folders via {}", names.len(), CREATE_FOLDER_API);
        self.call(CREATE_FOLDER_API, self.client.get(url)).await?;
        Ok(())
    }

    async fn create_download_task(&self, uri: &str, destination: &str) -> Result<(), GatewayError> {
        self.create_download_task_batch(&[uri.to_string()], destination)
            .await
    }

    async fn create_download_task_batch(
        &self,
        uris: &[String],
        destination: &str,
    ) -> Result<(), GatewayError> {
        if uris.is_empty() {
            return Ok(());
        }

        let sid = self.session_id().await?;
        let url = self.endpoint(TASK_CGI, &[])?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("api", TASK_API)
            .append_pair("version", "1")
            .append_pair("method", "create")
            .append_pair("uri", &uris.join(","))
            .append_pair("destination", destination)
            .append_pair("_sid", sid)
            .finish();

        nas_debug!("Creating {} tasks in {}", uris.len(), destination);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        self.call(TASK_API, request).await?;
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<PendingTask>, GatewayError> {
        let sid = self.session_id().await?;
        let url = self.endpoint(
            TASK_CGI,
            &[
                ("api", TASK_API),
                ("version", "1"),
                ("method", "list"),
                ("additional", "detail"),
                ("_sid", sid),
            ],
        )?;
        let data = self.call(TASK_API, self.client.get(url)).await?;
        let listing: TaskListData = parse_data(TASK_API, data)?;

        Ok(listing
            .tasks
            .into_iter()
            .map(|task| {
                let destination = task
                    .additional
                    .and_then(|a| a.detail)
                    .map(|d| d.destination)
                    .unwrap_or_default();
                PendingTask::new(task.title, destination)
            })
            .collect())
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(
    api: &str,
    data: serde_json::Value,
) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|err| GatewayError::InvalidResponse {
        api: api.to_string(),
        message: err.to_string(),
    })
}

fn json_array(api: &str, values: &[String]) -> Result<String, GatewayError> {
    serde_json::to_string(values).map_err(|err| GatewayError::InvalidResponse {
        api: api.to_string(),
        message: err.to_string(),
    })
}

/// File Station wants share-rooted paths such as `/downloads/show`.
fn absolute_folder_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}
