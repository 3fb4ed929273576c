use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use nasdrop_core::PlanConfig;
use nasdrop_logging::{nas_error, nas_info};
use tokio::task::JoinHandle;

use crate::crawl::CrawlSettings;
use crate::fetch::PageFetcher;
use crate::gateway::{GatewayError, TaskGateway};
use crate::magnet::MagnetGateway;
use crate::planner::{download_folders, DownloadPlanner};
use crate::sink::ChannelProgressSink;
use crate::{EngineEvent, EventKind, Outcome, Request, RequestId};

/// Collaborators and configuration shared by every request.
#[derive(Clone)]
pub struct EngineServices {
    pub fetcher: Arc<dyn PageFetcher>,
    pub gateway: Arc<dyn TaskGateway>,
    pub magnet: Option<Arc<dyn MagnetGateway>>,
    pub plan_config: PlanConfig,
    pub crawl_settings: CrawlSettings,
}

struct EngineCommand {
    request_id: RequestId,
    request: Request,
}

/// Runs requests on a background tokio runtime and reports lifecycle events.
///
/// Requests run concurrently with each other; each one is a sequential pipeline.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    next_id: AtomicU64,
}

impl EngineHandle {
    pub fn new(services: EngineServices) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let services = Arc::new(services);

        thread::spawn(move || {
            let mut running: Vec<JoinHandle<()>> = Vec::new();
            while let Ok(command) = cmd_rx.recv() {
                // Only unfinished requests are kept for the shutdown join.
                running.retain(|task| !task.is_finished());
                let services = services.clone();
                let event_tx = event_tx.clone();
                running.push(runtime.spawn(async move {
                    handle_command(&services, command, event_tx).await;
                }));
            }
            // Sender dropped: let in-flight requests finish before the runtime goes away.
            runtime.block_on(async {
                for task in running {
                    let _ = task.await;
                }
            });
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn submit(&self, request: Request) -> RequestId {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.cmd_tx.send(EngineCommand {
            request_id,
            request,
        });
        request_id
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    services: &EngineServices,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let EngineCommand {
        request_id,
        request,
    } = command;
    let emit = |kind: EventKind| {
        let _ = event_tx.send(EngineEvent { request_id, kind });
    };

    emit(EventKind::Started);
    let sink = ChannelProgressSink::new(request_id, event_tx.clone());

    let result: Result<Outcome, String> = match request {
        Request::Urls {
            urls,
            make_folders,
            custom_folder,
        } => DownloadPlanner::new(services.gateway.as_ref(), &services.plan_config)
            .handle_urls(&urls, make_folders, custom_folder.as_deref(), &sink)
            .await
            .map(Outcome::Planned)
            .map_err(|err| err.to_string()),
        Request::Folders { roots } => download_folders(
            services.fetcher.as_ref(),
            services.gateway.as_ref(),
            &services.plan_config,
            services.crawl_settings,
            &roots,
            &sink,
        )
        .await
        .map(Outcome::Planned)
        .map_err(|err| err.to_string()),
        Request::Magnet { uri } => match services.magnet.as_ref() {
            Some(magnet) => magnet
                .add_magnet(&uri)
                .await
                .map(Outcome::MagnetAdded)
                .map_err(|err| err.to_string()),
            None => Err(GatewayError::Rejected {
                api: "magnet".to_string(),
                message: "no torrent client configured".to_string(),
            }
            .to_string()),
        },
    };

    match result {
        Ok(outcome) => {
            nas_info!("Request {} done: {:?}", request_id, outcome);
            emit(EventKind::Done(outcome));
        }
        Err(message) => {
            nas_error!("Request {} failed: {}", request_id, message);
            emit(EventKind::Failed(message));
        }
    }
}
