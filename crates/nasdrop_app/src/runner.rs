use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use nasdrop_engine::{
    DelugeClient, EngineHandle, EngineServices, EventKind, MagnetGateway, Outcome, ReqwestFetcher,
    Request, SynologyGateway,
};
use nasdrop_logging::{nas_debug, nas_info};

use crate::config::AppConfig;

/// Build the HTTP clients described by `config`.
pub fn build_services(config: &AppConfig) -> Result<EngineServices> {
    let fetcher = ReqwestFetcher::new(config.crawler.fetch_settings())
        .context("failed to build page fetcher")?;
    let gateway = SynologyGateway::new(config.synology.settings())
        .context("failed to build Synology client")?;
    let magnet = match &config.deluge {
        Some(deluge) => {
            let client =
                DelugeClient::new(deluge.settings()).context("failed to build Deluge client")?;
            Some(Arc::new(client) as Arc<dyn MagnetGateway>)
        }
        None => None,
    };

    Ok(EngineServices {
        fetcher: Arc::new(fetcher),
        gateway: Arc::new(gateway),
        magnet,
        plan_config: config.synology.plan_config(),
        crawl_settings: config.crawler.crawl_settings(),
    })
}

/// Submit one request and block until it finishes, forwarding progress messages.
pub fn run_to_completion(
    engine: &EngineHandle,
    request: Request,
    mut on_progress: impl FnMut(&str),
) -> Result<Outcome> {
    let request_id = engine.submit(request);
    nas_info!("Submitted request {}", request_id);

    while let Some(event) = engine.recv() {
        if event.request_id != request_id {
            continue;
        }
        match event.kind {
            EventKind::Started => nas_debug!("Request {} started", request_id),
            EventKind::Progress(message) => on_progress(&message),
            EventKind::Done(outcome) => return Ok(outcome),
            EventKind::Failed(message) => return Err(anyhow!(message)),
        }
    }
    Err(anyhow!("engine stopped before request {request_id} finished"))
}

pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Planned(summary) => format!(
            "Done: {} folders created, {} downloads queued, {} already queued ({} remote calls)",
            summary.folders_created, summary.urls_submitted, summary.urls_skipped, summary.remote_calls
        ),
        Outcome::MagnetAdded(id) => format!("Done: torrent added as {id}"),
    }
}
