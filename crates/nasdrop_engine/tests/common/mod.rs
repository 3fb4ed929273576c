#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use nasdrop_core::PendingTask;
use nasdrop_engine::{
    FailureKind, FetchError, FetchedPage, GatewayError, PageFetcher, ProgressSink, TaskGateway,
};

#[derive(Default)]
pub struct TestSink {
    messages: Mutex<Vec<String>>,
}

impl TestSink {
    pub fn new() -> Self {
        nasdrop_logging::initialize_for_tests();
        Self::default()
    }

    pub fn take(&self) -> Vec<String> {
        self.messages.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Serves canned index pages and records every requested URL.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, url: &str, links: &[&str]) -> Self {
        let body = links
            .iter()
            .map(|link| format!(r#"<a href="{link}">{link}</a>"#))
            .collect::<Vec<_>>()
            .join("\n");
        self.pages
            .insert(url.to_string(), format!("<html><body>{body}</body></html>"));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                final_url: url.to_string(),
                content_type: Some("text/html".to_string()),
                encoding_label: "UTF-8".to_string(),
                body: body.clone(),
            }),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "not found")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateFolder { parent_path: String, name: String },
    CreateFolders { parent_paths: Vec<String>, names: Vec<String> },
    CreateTask { uri: String, destination: String },
    CreateTasks { uris: Vec<String>, destination: String },
    ListTasks,
}

/// Records gateway calls; can be told to fail the n-th task batch.
#[derive(Default)]
pub struct RecordingGateway {
    pending: Vec<PendingTask>,
    fail_task_call: Option<usize>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pending(mut self, pending: Vec<PendingTask>) -> Self {
        self.pending = pending;
        self
    }

    /// Fail the task-creation call with this zero-based index.
    pub fn failing_task_call(mut self, index: usize) -> Self {
        self.fail_task_call = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record_task_call(&self, call: Call) -> Result<(), GatewayError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls
            .iter()
            .filter(|c| matches!(c, Call::CreateTask { .. } | Call::CreateTasks { .. }))
            .count();
        if self.fail_task_call == Some(index) {
            return Err(GatewayError::Api {
                api: "SYNO.DownloadStation.Task".to_string(),
                code: 400,
            });
        }
        calls.push(call);
        Ok(())
    }
}

#[async_trait::async_trait]
impl TaskGateway for RecordingGateway {
    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::CreateFolder {
            parent_path: parent_path.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn create_folders_batch(
        &self,
        parent_paths: &[String],
        names: &[String],
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::CreateFolders {
            parent_paths: parent_paths.to_vec(),
            names: names.to_vec(),
        });
        Ok(())
    }

    async fn create_download_task(&self, uri: &str, destination: &str) -> Result<(), GatewayError> {
        self.record_task_call(Call::CreateTask {
            uri: uri.to_string(),
            destination: destination.to_string(),
        })
    }

    async fn create_download_task_batch(
        &self,
        uris: &[String],
        destination: &str,
    ) -> Result<(), GatewayError> {
        self.record_task_call(Call::CreateTasks {
            uris: uris.to_vec(),
            destination: destination.to_string(),
        })
    }

    async fn list_tasks(&self) -> Result<Vec<PendingTask>, GatewayError> {
        self.calls.lock().unwrap().push(Call::ListTasks);
        Ok(self.pending.clone())
    }
}
