use nasdrop_core::{build_plan, prepare, DownloadPlan, PlanConfig, PlanError, SubmitMode};
use nasdrop_logging::{nas_info, nas_warn};
use thiserror::Error;

use crate::crawl::{CrawlError, CrawlSettings, FolderCrawler};
use crate::fetch::PageFetcher;
use crate::gateway::{GatewayError, TaskGateway};
use crate::sink::ProgressSink;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidInput(#[from] PlanError),
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error(transparent)]
    Remote(#[from] GatewayError),
}

/// What one invocation did on the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub folders_created: usize,
    pub urls_submitted: usize,
    pub urls_skipped: usize,
    pub remote_calls: usize,
}

/// Turns URL batches into folder and task calls on a [`TaskGateway`].
///
/// Every remote call is awaited before the next is issued. A failing call
/// aborts the rest of the plan; earlier calls are not undone.
pub struct DownloadPlanner<'a> {
    gateway: &'a dyn TaskGateway,
    config: &'a PlanConfig,
}

impl<'a> DownloadPlanner<'a> {
    pub fn new(gateway: &'a dyn TaskGateway, config: &'a PlanConfig) -> Self {
        Self { gateway, config }
    }

    pub async fn handle_urls(
        &self,
        urls: &[String],
        make_folders: bool,
        custom_folder_name: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<PlanSummary, RunError> {
        let prepared = prepare(urls, make_folders, self.config, custom_folder_name)?;
        let pending = self.gateway.list_tasks().await?;
        nas_info!("{} tasks already on the download service", pending.len());

        let plan = build_plan(prepared, &pending);
        if !plan.skipped.is_empty() {
            sink.report(&format!(
                "Skipped {} already queued downloads",
                plan.skipped.len()
            ));
        }

        let mut summary = self.execute(&plan, sink).await?;
        summary.remote_calls += 1;
        Ok(summary)
    }

    /// Submit a finished plan: folders first, then tasks per destination.
    pub async fn execute(
        &self,
        plan: &DownloadPlan,
        sink: &dyn ProgressSink,
    ) -> Result<PlanSummary, RunError> {
        let mut summary = PlanSummary {
            urls_skipped: plan.skipped.len(),
            ..PlanSummary::default()
        };

        let result = match self.config.submit_mode {
            SubmitMode::Batched => self.submit_batched(plan, sink, &mut summary).await,
            SubmitMode::PerFile => self.submit_per_file(plan, sink, &mut summary).await,
        };
        if let Err(err) = result {
            nas_warn!(
                "Plan aborted after {} remote calls: {}",
                summary.remote_calls,
                err
            );
            return Err(err.into());
        }
        Ok(summary)
    }

    async fn submit_batched(
        &self,
        plan: &DownloadPlan,
        sink: &dyn ProgressSink,
        summary: &mut PlanSummary,
    ) -> Result<(), GatewayError> {
        if !plan.folders_to_create.is_empty() {
            let (parents, names): (Vec<String>, Vec<String>) = plan
                .folders_to_create
                .iter()
                .map(|f| (f.parent_path.clone(), f.name.clone()))
                .unzip();
            self.gateway.create_folders_batch(&parents, &names).await?;
            summary.remote_calls += 1;
            summary.folders_created += names.len();

            let created: Vec<String> = plan
                .folders_to_create
                .iter()
                .map(|f| format!("{}/{}", f.parent_path, f.name))
                .collect();
            sink.report(&format!(
                "Created {} folders: {}",
                created.len(),
                created.join(", ")
            ));
        }

        let batch_size = self.config.effective_batch_size();
        for destination in &plan.tasks_by_destination {
            for batch in destination.batches(batch_size) {
                self.gateway
                    .create_download_task_batch(batch, &destination.destination)
                    .await?;
                summary.remote_calls += 1;
                summary.urls_submitted += batch.len();
                sink.report(&format!(
                    "Queued {} downloads in {}",
                    batch.len(),
                    destination.destination
                ));
            }
        }
        Ok(())
    }

    async fn submit_per_file(
        &self,
        plan: &DownloadPlan,
        sink: &dyn ProgressSink,
        summary: &mut PlanSummary,
    ) -> Result<(), GatewayError> {
        for folder in &plan.folders_to_create {
            self.gateway
                .create_folder(&folder.parent_path, &folder.name)
                .await?;
            summary.remote_calls += 1;
            summary.folders_created += 1;
            sink.report(&format!(
                "Created folder {}/{}",
                folder.parent_path, folder.name
            ));
        }

        for destination in &plan.tasks_by_destination {
            for url in &destination.urls {
                self.gateway
                    .create_download_task(url, &destination.destination)
                    .await?;
                summary.remote_calls += 1;
                summary.urls_submitted += 1;
            }
            sink.report(&format!(
                "Queued {} downloads in {}",
                destination.urls.len(),
                destination.destination
            ));
        }
        Ok(())
    }
}

/// Crawl folder-index pages and queue everything found, mirroring the folder layout.
pub async fn download_folders(
    fetcher: &dyn PageFetcher,
    gateway: &dyn TaskGateway,
    config: &PlanConfig,
    crawl_settings: CrawlSettings,
    roots: &[String],
    sink: &dyn ProgressSink,
) -> Result<PlanSummary, RunError> {
    if roots.is_empty() {
        return Err(PlanError::NoInput.into());
    }

    let crawler = FolderCrawler::new(fetcher, crawl_settings, &config.domain_rules);
    let crawled = crawler.crawl(roots, sink).await?;
    sink.report(&format!(
        "Found {} files in {} folders",
        crawled.files.len(),
        crawled.visited_folders.len()
    ));

    DownloadPlanner::new(gateway, config)
        .handle_urls(&crawled.files, true, None, sink)
        .await
}
