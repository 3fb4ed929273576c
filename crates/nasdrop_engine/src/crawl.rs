use std::collections::HashSet;

use nasdrop_core::{decode_uri, try_inject_credentials, DomainRule};
use nasdrop_logging::{nas_debug, nas_info};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::fetch::PageFetcher;
use crate::links::extract_links;
use crate::sink::ProgressSink;
use crate::FetchError;

pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Characters kept verbatim when re-encoding a folder URL (the `encodeURI` set, plus `%`).
const FOLDER_URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#')
    .remove(b'%');

// Schemes that show up in index pages without `//`.
const OPAQUE_SCHEMES: &[&str] = &["mailto:", "javascript:", "magnet:", "data:", "tel:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Folders at this depth are fetched but their sub-folders are only reported.
    pub max_depth: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("folder urls to crawl must end with '/': {0}")]
    InvalidInput(String),
    #[error("failed to fetch folder {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutput {
    /// Absolute file URLs in discovery order.
    pub files: Vec<String>,
    /// Lowercased folder URLs in the order they were fetched.
    pub visited_folders: Vec<String>,
}

#[derive(Default)]
struct CrawlState {
    visited: HashSet<String>,
    seen_files: HashSet<String>,
    output: CrawlOutput,
}

impl CrawlState {
    fn is_visited(&self, folder_url: &str) -> bool {
        self.visited.contains(&folder_url.to_lowercase())
    }

    fn mark_visited(&mut self, folder_url: &str) -> bool {
        let key = folder_url.to_lowercase();
        if !self.visited.insert(key.clone()) {
            return false;
        }
        self.output.visited_folders.push(key);
        true
    }

    fn push_file(&mut self, url: String) {
        if self.seen_files.insert(url.clone()) {
            self.output.files.push(url);
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Listing {
    files: Vec<String>,
    folders: Vec<String>,
}

/// Depth-first walk over folder-index pages.
pub struct FolderCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    settings: CrawlSettings,
    rules: &'a [DomainRule],
}

impl<'a> FolderCrawler<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, settings: CrawlSettings, rules: &'a [DomainRule]) -> Self {
        Self {
            fetcher,
            settings,
            rules,
        }
    }

    /// Collect every file reachable from `roots` within the configured depth.
    ///
    /// All roots are validated before the first fetch. Any fetch failure
    /// aborts the whole crawl.
    pub async fn crawl(
        &self,
        roots: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<CrawlOutput, CrawlError> {
        let roots: Vec<String> = roots.iter().map(|root| normalize_folder_url(root)).collect();
        if let Some(invalid) = roots.iter().find(|root| !root.ends_with('/')) {
            return Err(CrawlError::InvalidInput(invalid.clone()));
        }

        let mut state = CrawlState::default();
        for root in roots {
            self.walk(root, &mut state, sink).await?;
        }

        nas_info!(
            "Crawl finished: {} files in {} folders",
            state.output.files.len(),
            state.output.visited_folders.len()
        );
        Ok(state.output)
    }

    async fn walk(
        &self,
        root: String,
        state: &mut CrawlState,
        sink: &dyn ProgressSink,
    ) -> Result<(), CrawlError> {
        let mut worklist = vec![(root, 1usize)];

        while let Some((folder_url, depth)) = worklist.pop() {
            if !state.mark_visited(&folder_url) {
                nas_debug!("Skipping already visited folder {}", folder_url);
                continue;
            }

            let page = self
                .fetcher
                .fetch(&try_inject_credentials(&folder_url, self.rules))
                .await
                .map_err(|source| CrawlError::Fetch {
                    url: folder_url.clone(),
                    source,
                })?;
            if page.final_url != page.url {
                nas_debug!("{} redirected to {}", page.url, page.final_url);
            }
            nas_debug!(
                "Read {} bytes of {} as {}",
                page.body.len(),
                page.content_type.as_deref().unwrap_or("untyped content"),
                page.encoding_label
            );
            let listing = classify_links(extract_links(&page.body));
            nas_debug!(
                "{} (depth {}): {} files, {} folders",
                folder_url,
                depth,
                listing.files.len(),
                listing.folders.len()
            );

            for file in &listing.files {
                state.push_file(format!("{folder_url}{file}"));
            }

            if depth >= self.settings.max_depth {
                if !listing.folders.is_empty() {
                    let skipped: Vec<String> = listing
                        .folders
                        .iter()
                        .map(|sub| normalize_folder_url(&format!("{folder_url}{sub}")))
                        .collect();
                    sink.report(&format!("MAX DEPTH REACHED! SKIPPING: {}", skipped.join("\n")));
                }
                continue;
            }

            // Reversed so the first link on the page is walked first.
            for sub in listing.folders.iter().rev() {
                let child = normalize_folder_url(&format!("{folder_url}{sub}"));
                if state.is_visited(&child) {
                    nas_debug!("Skipping already visited folder {}", child);
                    continue;
                }
                worklist.push((child, depth + 1));
            }
        }

        Ok(())
    }
}

fn classify_links(links: Vec<String>) -> Listing {
    let mut listing = Listing::default();
    for link in links {
        let link = strip_current_dir(&link);
        if link.is_empty() || link == "." || link.starts_with("..") {
            continue;
        }
        if is_unsupported_link(&link) {
            nas_debug!("Ignoring unsupported link {}", link);
            continue;
        }
        if link.ends_with('/') {
            listing.folders.push(link.to_string());
        } else {
            listing.files.push(link.to_string());
        }
    }
    listing
}

/// Leading `./` segments removed; a bare `./` becomes empty.
fn strip_current_dir(link: &str) -> &str {
    let mut link = link;
    while let Some(rest) = link.strip_prefix("./") {
        link = rest;
    }
    link
}

/// Host-root, absolute, and query/fragment-only targets cannot be placed below the current folder.
fn is_unsupported_link(link: &str) -> bool {
    link.starts_with('/')
        || link.starts_with('?')
        || link.starts_with('#')
        || link.contains("://")
        || OPAQUE_SCHEMES.iter().any(|scheme| {
            link.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
}

/// Canonical form of a folder URL: escapes decoded, then re-encoded consistently.
///
/// Escapes of reserved characters, and escapes that are not UTF-8, are kept as written.
pub fn normalize_folder_url(url: &str) -> String {
    let decoded = decode_uri(url.trim());
    utf8_percent_encode(&decoded, FOLDER_URL_ENCODE_SET).to_string()
}
