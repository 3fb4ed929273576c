//! Nasdrop core: pure URL-to-download-plan logic.
//!
//! Nothing in this crate performs IO. The engine crate feeds it URLs and a
//! pending-task snapshot and executes the resulting [`DownloadPlan`].
mod config;
mod credentials;
mod error;
mod escape;
mod path;
mod plan;
mod rule;

pub use config::{PlanConfig, SubmitMode, DEFAULT_BATCH_SIZE};
pub use credentials::{inject_credentials, try_inject_credentials};
pub use error::PlanError;
pub use escape::decode_uri;
pub use path::{derive_path, folder_chain, join_destination};
pub use plan::{
    build_plan, file_name_of, prepare, titles_match, Candidate, DestinationPlan, DownloadPlan,
    FolderSet, FolderToCreate, PendingTask, PreparedBatch,
};
pub use rule::{find_domain_rule, DomainRule};
