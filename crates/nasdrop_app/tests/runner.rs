use std::sync::{Arc, Mutex};

use nasdrop_app::config::AppConfig;
use nasdrop_app::runner::{build_services, describe, run_to_completion};
use nasdrop_core::{PendingTask, PlanConfig};
use nasdrop_engine::{
    CrawlSettings, EngineHandle, EngineServices, FetchSettings, GatewayError, Outcome,
    PlanSummary, Request, ReqwestFetcher, TaskGateway,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct CountingGateway {
    queued: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl TaskGateway for CountingGateway {
    async fn create_folder(&self, _parent_path: &str, _name: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn create_folders_batch(
        &self,
        _parent_paths: &[String],
        _names: &[String],
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn create_download_task(&self, uri: &str, _destination: &str) -> Result<(), GatewayError> {
        self.queued.lock().unwrap().push(uri.to_string());
        Ok(())
    }

    async fn create_download_task_batch(
        &self,
        uris: &[String],
        _destination: &str,
    ) -> Result<(), GatewayError> {
        self.queued.lock().unwrap().extend(uris.iter().cloned());
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<PendingTask>, GatewayError> {
        Ok(Vec::new())
    }
}

fn engine_with(gateway: Arc<CountingGateway>) -> EngineHandle {
    let services = EngineServices {
        fetcher: Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap()),
        gateway,
        magnet: None,
        plan_config: PlanConfig::with_rules("downloads", Vec::new()),
        crawl_settings: CrawlSettings::default(),
    };
    EngineHandle::new(services).unwrap()
}

#[test]
fn flat_urls_run_to_completion_with_progress() {
    let gateway = Arc::new(CountingGateway::default());
    let engine = engine_with(gateway.clone());
    let mut progress = Vec::new();

    let outcome = run_to_completion(
        &engine,
        Request::Urls {
            urls: vec!["http://host/a.zip".to_string(), "http://host/b.zip".to_string()],
            make_folders: false,
            custom_folder: None,
        },
        |message| progress.push(message.to_string()),
    )
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::Planned(PlanSummary {
            folders_created: 0,
            urls_submitted: 2,
            urls_skipped: 0,
            remote_calls: 2,
        })
    );
    assert_eq!(progress, vec!["Queued 2 downloads in downloads".to_string()]);
    assert_eq!(gateway.queued.lock().unwrap().len(), 2);
    assert_eq!(
        describe(&outcome),
        "Done: 0 folders created, 2 downloads queued, 0 already queued (2 remote calls)"
    );
}

#[test]
fn failed_request_becomes_an_error() {
    let engine = engine_with(Arc::new(CountingGateway::default()));

    let err = run_to_completion(
        &engine,
        Request::Magnet {
            uri: "magnet:?xt=urn:btih:abc".to_string(),
        },
        |_| {},
    )
    .unwrap_err();

    assert!(err.to_string().contains("no torrent client configured"));
}

#[test]
fn default_config_builds_services_without_deluge() {
    let services = build_services(&AppConfig::default()).unwrap();

    assert!(services.magnet.is_none());
    assert_eq!(services.plan_config, PlanConfig::default());
}
