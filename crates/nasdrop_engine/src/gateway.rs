use nasdrop_core::PendingTask;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
    #[error("{api}: transport error: {message}")]
    Transport { api: String, message: String },
    #[error("{api}: http status {status}")]
    HttpStatus { api: String, status: u16 },
    #[error("{api}: failed with error code {code}")]
    Api { api: String, code: i64 },
    #[error("{api}: rejected: {message}")]
    Rejected { api: String, message: String },
    #[error("{api}: invalid response: {message}")]
    InvalidResponse { api: String, message: String },
}

/// Folder management and download-task creation on the NAS.
///
/// Calls are not transactional: a failed batch may have been partially applied.
#[async_trait::async_trait]
pub trait TaskGateway: Send + Sync {
    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<(), GatewayError>;

    /// `parent_paths` and `names` are index-aligned.
    async fn create_folders_batch(
        &self,
        parent_paths: &[String],
        names: &[String],
    ) -> Result<(), GatewayError>;

    async fn create_download_task(&self, uri: &str, destination: &str) -> Result<(), GatewayError>;

    async fn create_download_task_batch(
        &self,
        uris: &[String],
        destination: &str,
    ) -> Result<(), GatewayError>;

    /// Snapshot of queued and active tasks.
    async fn list_tasks(&self) -> Result<Vec<PendingTask>, GatewayError>;
}
