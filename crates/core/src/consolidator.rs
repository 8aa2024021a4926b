//! Per-identity consolidation: list shared files, filter, record, copy.

use crate::filter::SkipRules;
use crate::folder::resolve_folder;
use crate::interfaces::{ConsolidationError, DriveService};
use crate::paging::collect_pages;
use crate::types::{DriveFile, FileMetadata, FileQuery};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Largest page the storage backend returns for file listings.
pub const SHARED_FILES_PAGE_SIZE: u32 = 1000;

/// Counters for one identity's consolidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    pub folder_id: String,
    pub listed: usize,
    pub skipped: usize,
    pub recorded: usize,
    pub copied: usize,
    pub copy_failed: usize,
}

/// Copies files shared with an identity into its consolidation folder and
/// records every file it acts on.
#[derive(Debug, Clone)]
pub struct ShareConsolidator {
    output_dir: PathBuf,
    skip_rules: SkipRules,
    page_size: u32,
}

impl ShareConsolidator {
    pub fn new(output_dir: impl Into<PathBuf>, skip_rules: SkipRules) -> Self {
        Self {
            output_dir: output_dir.into(),
            skip_rules,
            page_size: SHARED_FILES_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn skip_rules(&self) -> &SkipRules {
        &self.skip_rules
    }

    /// Path of the consolidation record for `identity`.
    pub fn record_path(&self, identity: &str) -> PathBuf {
        record_path(&self.output_dir, identity)
    }

    /// Consolidate everything shared with `identity`.
    ///
    /// The record is truncated on every run. A file is recorded before its
    /// copy is attempted; copy failures are logged and counted without
    /// stopping the identity, while record write failures abort it.
    /// Cancellation is checked before each file.
    pub async fn consolidate(
        &self,
        drive: &dyn DriveService,
        identity: &str,
        cancel: &CancellationToken,
    ) -> Result<ConsolidationSummary, ConsolidationError> {
        let path = self.record_path(identity);
        let mut record = File::create(&path)
            .await
            .map_err(|source| output_error(&path, source))?;

        let files = self.list_shared_files(drive).await?;
        debug!(identity, files = files.len(), "Listed shared files");

        let folder_id = resolve_folder(drive)
            .await
            .map_err(ConsolidationError::FolderResolution)?;

        let mut summary = ConsolidationSummary {
            folder_id,
            listed: files.len(),
            ..ConsolidationSummary::default()
        };

        for file in &files {
            if cancel.is_cancelled() {
                info!(identity, recorded = summary.recorded, "Cancelled before next file");
                return Err(ConsolidationError::Cancelled);
            }

            if let Some((owner, substring)) = self.skip_rules.first_match(file) {
                info!(
                    identity,
                    file_id = %file.id,
                    file_name = %file.name,
                    owner = %owner.email_address,
                    owner_substring = substring,
                    "Skipping file: owner matches skip rule"
                );
                summary.skipped += 1;
                continue;
            }

            write_record(&mut record, &path, file).await?;
            summary.recorded += 1;

            match drive
                .copy_file(&file.id, &FileMetadata::copy_into(&summary.folder_id))
                .await
            {
                Ok(copy) => {
                    info!(identity, file_name = %file.name, copy_id = %copy.id, "Copied file");
                    summary.copied += 1;
                }
                Err(source) => {
                    let err = ConsolidationError::Copy {
                        file_id: file.id.clone(),
                        source,
                    };
                    warn!(identity, file_name = %file.name, error = %err, "Copy failed");
                    summary.copy_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn list_shared_files(
        &self,
        drive: &dyn DriveService,
    ) -> Result<Vec<DriveFile>, ConsolidationError> {
        let query = FileQuery::shared_with_me(self.page_size);
        let query = &query;
        collect_pages(move |token| async move { drive.list_files(query, token.as_deref()).await })
            .await
            .map_err(ConsolidationError::FileListing)
    }
}

/// `{dir}/{identity}_shared_files.txt`, with path separators in the address
/// replaced so the record always lands directly in `dir`.
pub fn record_path(dir: &Path, identity: &str) -> PathBuf {
    let stem: String = identity
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.join(format!("{}_shared_files.txt", stem))
}

async fn write_record(
    record: &mut File,
    path: &Path,
    file: &DriveFile,
) -> Result<(), ConsolidationError> {
    record
        .write_all(file.record_line().as_bytes())
        .await
        .map_err(|source| output_error(path, source))?;
    record
        .flush()
        .await
        .map_err(|source| output_error(path, source))
}

fn output_error(path: &Path, source: std::io::Error) -> ConsolidationError {
    ConsolidationError::OutputIo {
        path: path.to_path_buf(),
        source,
    }
}
