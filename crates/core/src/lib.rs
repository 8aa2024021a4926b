//! Sharesweep core
//!
//! Enumerates an organization's members and, for each one, copies the files
//! shared with them into a single consolidation folder in their own storage,
//! skipping files owned by configured third parties.

pub mod batch;
pub mod config;
pub mod consolidator;
pub mod directory;
pub mod filter;
pub mod folder;
pub mod interfaces;
pub mod paging;
pub mod types;

pub use batch::{BatchDriver, BatchReport, IdentityOutcome, OutcomeHook};
pub use config::RunConfig;
pub use consolidator::{record_path, ConsolidationSummary, ShareConsolidator};
pub use directory::enumerate_identities;
pub use filter::{should_skip, SkipRules};
pub use folder::resolve_folder;
pub use interfaces::{
    ConsolidationError, DirectoryService, DriveClientFactory, DriveService, ServiceError,
};
pub use paging::collect_pages;
pub use types::{DriveFile, FileMetadata, FileQuery, Member, MemberQuery, Owner, Page};
pub use tokio_util::sync::CancellationToken;
