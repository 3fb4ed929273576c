//! Nasdrop engine: page fetching, folder crawling and plan execution against the NAS.
mod crawl;
mod decode;
mod engine;
mod fetch;
mod gateway;
mod links;
mod magnet;
mod planner;
mod sink;
mod synology;
mod types;

pub use crawl::{
    normalize_folder_url, CrawlError, CrawlOutput, CrawlSettings, FolderCrawler, DEFAULT_MAX_DEPTH,
};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use engine::{EngineHandle, EngineServices};
pub use fetch::{FetchSettings, PageFetcher, ReqwestFetcher};
pub use gateway::{GatewayError, TaskGateway};
pub use links::extract_links;
pub use magnet::{DelugeClient, DelugeSettings, MagnetGateway};
pub use planner::{download_folders, DownloadPlanner, PlanSummary, RunError};
pub use sink::{ChannelProgressSink, ProgressSink};
pub use synology::{SynologyGateway, SynologySettings};
pub use types::{
    EngineEvent, EventKind, FailureKind, FetchError, FetchedPage, Outcome, Request, RequestId,
};
