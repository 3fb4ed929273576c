mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeFetcher, RecordingGateway};
use nasdrop_core::{DomainRule, PlanConfig};
use nasdrop_engine::{
    CrawlSettings, EngineEvent, EngineHandle, EngineServices, EventKind, GatewayError,
    MagnetGateway, Outcome, PlanSummary, Request, RequestId,
};

struct FixedMagnet;

#[async_trait::async_trait]
impl MagnetGateway for FixedMagnet {
    async fn add_magnet(&self, _magnet_uri: &str) -> Result<String, GatewayError> {
        Ok("torrent-1".to_string())
    }
}

fn services(magnet: Option<Arc<dyn MagnetGateway>>) -> EngineServices {
    EngineServices {
        fetcher: Arc::new(FakeFetcher::new()),
        gateway: Arc::new(RecordingGateway::new()),
        magnet,
        plan_config: PlanConfig::with_rules("base", vec![DomainRule::new("site", "/a/")]),
        crawl_settings: CrawlSettings::default(),
    }
}

/// Collect events for one request until it finishes.
fn events_for(engine: &EngineHandle, request_id: RequestId) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Some(EngineEvent { request_id: id, kind }) =
        engine.recv_timeout(Duration::from_secs(5))
    {
        if id != request_id {
            continue;
        }
        let finished = matches!(kind, EventKind::Done(_) | EventKind::Failed(_));
        kinds.push(kind);
        if finished {
            break;
        }
    }
    kinds
}

#[test]
fn url_request_reports_progress_then_done() {
    let engine = EngineHandle::new(services(None)).expect("engine");
    let id = engine.submit(Request::Urls {
        urls: vec!["http://site/a/1/f1.zip".to_string()],
        make_folders: true,
        custom_folder: None,
    });

    let kinds = events_for(&engine, id);

    assert_eq!(kinds.first(), Some(&EventKind::Started));
    assert!(kinds.contains(&EventKind::Progress(
        "Queued 1 downloads in base/_1".to_string()
    )));
    assert_eq!(
        kinds.last(),
        Some(&EventKind::Done(Outcome::Planned(PlanSummary {
            folders_created: 1,
            urls_submitted: 1,
            urls_skipped: 0,
            remote_calls: 3,
        })))
    );
}

#[test]
fn empty_request_fails() {
    let engine = EngineHandle::new(services(None)).expect("engine");
    let id = engine.submit(Request::Urls {
        urls: Vec::new(),
        make_folders: false,
        custom_folder: None,
    });

    let kinds = events_for(&engine, id);

    assert_eq!(
        kinds,
        vec![
            EventKind::Started,
            EventKind::Failed("no urls were provided".to_string()),
        ]
    );
}

#[test]
fn magnet_without_client_fails() {
    let engine = EngineHandle::new(services(None)).expect("engine");
    let id = engine.submit(Request::Magnet {
        uri: "magnet:?xt=urn:btih:abc".to_string(),
    });

    match events_for(&engine, id).last() {
        Some(EventKind::Failed(message)) => {
            assert!(message.contains("no torrent client configured"))
        }
        other => panic!("unexpected final event {other:?}"),
    }
}

#[test]
fn magnet_with_client_is_added() {
    let engine = EngineHandle::new(services(Some(Arc::new(FixedMagnet)))).expect("engine");
    let id = engine.submit(Request::Magnet {
        uri: "magnet:?xt=urn:btih:abc".to_string(),
    });

    assert_eq!(
        events_for(&engine, id),
        vec![
            EventKind::Started,
            EventKind::Done(Outcome::MagnetAdded("torrent-1".to_string())),
        ]
    );
}

#[test]
fn request_ids_are_distinct() {
    let engine = EngineHandle::new(services(None)).expect("engine");
    let first = engine.submit(Request::Folders { roots: Vec::new() });
    let second = engine.submit(Request::Folders { roots: Vec::new() });

    assert_ne!(first, second);
    assert!(matches!(
        events_for(&engine, second).last(),
        Some(EventKind::Failed(_))
    ));
}

#[test]
fn long_lived_engine_keeps_serving_requests() {
    let engine = EngineHandle::new(services(Some(Arc::new(FixedMagnet)))).expect("engine");

    for _ in 0..50 {
        let id = engine.submit(Request::Magnet {
            uri: "magnet:?xt=urn:btih:abc".to_string(),
        });
        assert_eq!(
            events_for(&engine, id).last(),
            Some(&EventKind::Done(Outcome::MagnetAdded("torrent-1".to_string())))
        );
    }
}
