use std::collections::HashSet;

use nasdrop_logging::{nas_debug, nas_info};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::PlanConfig;
use crate::credentials::inject_credentials;
use crate::error::PlanError;
use crate::path::{derive_path, folder_chain, join_destination};
use crate::rule::find_domain_rule;

/// Characters left alone when percent-encoding a file name (matches `encodeURIComponent`).
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderToCreate {
    pub parent_path: String,
    pub name: String,
}

impl FolderToCreate {
    pub fn new(parent_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parent_path: parent_path.into(),
            name: name.into(),
        }
    }
}

/// Folder requests collapsed by `(parent_path, name)`, keeping first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FolderSet {
    entries: Vec<FolderToCreate>,
    seen: HashSet<FolderToCreate>,
    requested: usize,
}

impl FolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the folder was already requested.
    pub fn insert(&mut self, folder: FolderToCreate) -> bool {
        self.requested += 1;
        if self.seen.contains(&folder) {
            return false;
        }
        self.seen.insert(folder.clone());
        self.entries.push(folder);
        true
    }

    pub fn extend(&mut self, folders: impl IntoIterator<Item = FolderToCreate>) {
        for folder in folders {
            self.insert(folder);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of insert calls, duplicates included.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn iter(&self) -> impl Iterator<Item = &FolderToCreate> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<FolderToCreate> {
        self.entries
    }
}

/// A task already queued on the download service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub title: String,
    pub destination: String,
}

impl PendingTask {
    pub fn new(title: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            destination: destination.into(),
        }
    }
}

/// One URL (credentials already injected) bound for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPlan {
    pub destination: String,
    pub urls: Vec<String>,
}

impl DestinationPlan {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            urls: Vec::new(),
        }
    }

    /// URLs split into consecutive chunks of at most `size` entries.
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, String> {
        self.urls.chunks(size.max(1))
    }
}

/// Output of [`prepare`]: folders to create and every URL with its destination.
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub folders: FolderSet,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadPlan {
    pub folders_to_create: Vec<FolderToCreate>,
    pub tasks_by_destination: Vec<DestinationPlan>,
    /// Candidates dropped because the service already holds them.
    pub skipped: Vec<Candidate>,
}

impl DownloadPlan {
    pub fn url_count(&self) -> usize {
        self.tasks_by_destination.iter().map(|plan| plan.urls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.folders_to_create.is_empty() && self.tasks_by_destination.is_empty()
    }
}

/// Resolve destinations, folders and credentials for `urls` without touching the network.
///
/// With `make_folders`, each URL lands in the folder mirrored from its source
/// path and the whole folder chain is requested. Otherwise URLs go to
/// `custom_folder_name` (created under the base directory) or to the base
/// directory itself.
pub fn prepare(
    urls: &[String],
    make_folders: bool,
    config: &PlanConfig,
    custom_folder_name: Option<&str>,
) -> Result<PreparedBatch, PlanError> {
    if urls.is_empty() {
        return Err(PlanError::NoInput);
    }

    let base = config.base_download_dir.as_str();
    let custom_folder_name = custom_folder_name
        .map(|name| name.trim_matches('/'))
        .filter(|name| !name.is_empty());
    let mut folders = FolderSet::new();
    let mut candidates = Vec::with_capacity(urls.len());

    for url in urls {
        let rule = find_domain_rule(url, &config.domain_rules);
        let sub_path = if make_folders {
            let derived = rule.and_then(|rule| derive_path(url, rule));
            if let Some(path) = derived.as_deref() {
                folders.extend(folder_chain(base, path));
            }
            derived
        } else if let Some(name) = custom_folder_name {
            folders.extend(folder_chain(base, name));
            Some(name.to_string())
        } else {
            None
        };

        candidates.push(Candidate {
            url: inject_credentials(url, rule),
            destination: join_destination(base, sub_path.as_deref()),
        });
    }

    nas_info!(
        "Distinct folder list from {} items to {} items.",
        folders.requested(),
        folders.len()
    );

    Ok(PreparedBatch {
        folders,
        candidates,
    })
}

/// Group candidates by destination, dropping anything already pending at that destination.
///
/// Destinations keep first-seen order and URLs keep submission order.
pub fn build_plan(prepared: PreparedBatch, pending: &[PendingTask]) -> DownloadPlan {
    let mut plan = DownloadPlan {
        folders_to_create: prepared.folders.into_vec(),
        ..DownloadPlan::default()
    };

    for candidate in prepared.candidates {
        let file_name = file_name_of(&candidate.url);
        let already_pending = pending.iter().any(|task| {
            same_destination(&task.destination, &candidate.destination)
                && titles_match(file_name, &task.title)
        });
        if already_pending {
            nas_debug!(
                "Skipping {} - already queued in {}",
                candidate.url,
                candidate.destination
            );
            plan.skipped.push(candidate);
            continue;
        }

        let index = match plan
            .tasks_by_destination
            .iter()
            .position(|existing| existing.destination == candidate.destination)
        {
            Some(index) => index,
            None => {
                plan.tasks_by_destination
                    .push(DestinationPlan::new(candidate.destination.clone()));
                plan.tasks_by_destination.len() - 1
            }
        };
        let target = &mut plan.tasks_by_destination[index];
        if !target.urls.contains(&candidate.url) {
            target.urls.push(candidate.url);
        }
    }

    plan
}

/// Final path segment of a URL, ignoring any query or fragment.
pub fn file_name_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or(path)
}

/// Compare two file names, tolerating percent-encoding on either side.
pub fn titles_match(left: &str, right: &str) -> bool {
    let left = encoding_variants(left);
    let right = encoding_variants(right);
    left.iter().any(|l| right.iter().any(|r| l == r))
}

fn encoding_variants(name: &str) -> [String; 3] {
    [
        name.to_string(),
        percent_decode_str(name).decode_utf8_lossy().into_owned(),
        utf8_percent_encode(name, FILE_NAME_ENCODE_SET).to_string(),
    ]
}

fn same_destination(left: &str, right: &str) -> bool {
    left.trim_matches('/') == right.trim_matches('/')
}
