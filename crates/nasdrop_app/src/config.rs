//! RON configuration file for the `nasdrop` binary.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use nasdrop_core::{DomainRule, PlanConfig, SubmitMode, DEFAULT_BATCH_SIZE};
use nasdrop_engine::{CrawlSettings, DelugeSettings, FetchSettings, SynologySettings};
use nasdrop_logging::nas_info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "nasdrop.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub synology: SynologyConfig,
    pub crawler: CrawlerConfig,
    pub deluge: Option<DelugeConfig>,
}

/// NAS connection plus everything that decides where downloads land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynologyConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub account: String,
    pub password: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub base_download_dir: String,
    pub domain_rules: Vec<DomainRule>,
    pub submit_mode: SubmitMode,
    pub batch_size: usize,
}

impl Default for SynologyConfig {
    fn default() -> Self {
        let connection = SynologySettings::default();
        let plan = PlanConfig::default();
        Self {
            protocol: connection.protocol,
            host: connection.host,
            port: connection.port,
            account: connection.account,
            password: connection.password,
            connect_timeout_secs: connection.connect_timeout.as_secs(),
            request_timeout_secs: connection.request_timeout.as_secs(),
            base_download_dir: plan.base_download_dir,
            domain_rules: plan.domain_rules,
            submit_mode: plan.submit_mode,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SynologyConfig {
    pub fn settings(&self) -> SynologySettings {
        SynologySettings {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            port: self.port,
            account: self.account.clone(),
            password: self.password.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig {
            base_download_dir: self.base_download_dir.clone(),
            domain_rules: self.domain_rules.clone(),
            submit_mode: self.submit_mode,
            batch_size: self.batch_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub max_depth: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            max_depth: CrawlSettings::default().max_depth,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
        }
    }
}

impl CrawlerConfig {
    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            max_depth: self.max_depth,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelugeConfig {
    pub url: String,
    pub password: String,
    pub download_path: String,
    pub request_timeout_secs: u64,
}

impl Default for DelugeConfig {
    fn default() -> Self {
        let deluge = DelugeSettings::default();
        Self {
            url: deluge.url,
            password: deluge.password,
            download_path: deluge.download_path,
            request_timeout_secs: deluge.request_timeout.as_secs(),
        }
    }
}

impl DelugeConfig {
    pub fn settings(&self) -> DelugeSettings {
        DelugeSettings {
            url: self.url.clone(),
            password: self.password.clone(),
            download_path: self.download_path.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    nas_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// Write `config` as pretty RON. Refuses to replace an existing file unless `overwrite`.
pub fn write_config(path: &Path, config: &AppConfig, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists", path.display());
    }
    let pretty = ron::ser::PrettyConfig::new();
    let content =
        ron::ser::to_string_pretty(config, pretty).context("failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    nas_info!("Wrote configuration to {:?}", path);
    Ok(())
}
