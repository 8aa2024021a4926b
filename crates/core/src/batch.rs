//! Batch driver: one consolidation per directory member, failures isolated.

use crate::config::RunConfig;
use crate::consolidator::{ConsolidationSummary, ShareConsolidator};
use crate::directory::enumerate_identities;
use crate::interfaces::{ConsolidationError, DirectoryService, DriveClientFactory};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Result of processing one identity.
#[derive(Debug)]
pub struct IdentityOutcome {
    pub identity: String,
    pub result: Result<ConsolidationSummary, ConsolidationError>,
}

impl IdentityOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of a whole run.
#[derive(Debug)]
pub struct BatchReport {
    /// Number of identities the directory returned.
    pub roster_size: usize,
    pub outcomes: Vec<IdentityOutcome>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// True only when every enumerated identity was processed and succeeded.
    pub fn all_succeeded(&self) -> bool {
        !self.cancelled
            && self.outcomes.len() == self.roster_size
            && self.outcomes.iter().all(IdentityOutcome::succeeded)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &IdentityOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Identities never reached because the run was cancelled.
    pub fn not_processed(&self) -> usize {
        self.roster_size.saturating_sub(self.outcomes.len())
    }
}

/// Called with each outcome as soon as its identity finishes.
pub type OutcomeHook = Box<dyn Fn(&IdentityOutcome) + Send + Sync>;

/// Enumerates the directory once, then consolidates each identity in turn.
pub struct BatchDriver {
    directory: Arc<dyn DirectoryService>,
    factory: Arc<dyn DriveClientFactory>,
    consolidator: ShareConsolidator,
    customer: String,
    identity_timeout: Option<Duration>,
    on_outcome: Option<OutcomeHook>,
}

impl BatchDriver {
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        factory: Arc<dyn DriveClientFactory>,
        config: &RunConfig,
    ) -> Self {
        Self {
            directory,
            factory,
            consolidator: ShareConsolidator::new(
                config.output_dir.clone(),
                config.skip_rules.clone(),
            ),
            customer: config.customer.clone(),
            identity_timeout: Some(config.identity_timeout),
            on_outcome: None,
        }
    }

    pub fn with_consolidator(mut self, consolidator: ShareConsolidator) -> Self {
        self.consolidator = consolidator;
        self
    }

    pub fn with_identity_timeout(mut self, limit: Option<Duration>) -> Self {
        self.identity_timeout = limit;
        self
    }

    pub fn on_outcome<F>(mut self, hook: F) -> Self
    where
        F: Fn(&IdentityOutcome) + Send + Sync + 'static,
    {
        self.on_outcome = Some(Box::new(hook));
        self
    }

    /// Process every directory member.
    ///
    /// Only a directory failure is returned as an error; every per-identity
    /// failure is recorded in the report and the batch moves on. Cancellation
    /// is honored between identities and, inside an identity, between files.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<BatchReport, ConsolidationError> {
        let started_at = Utc::now();
        let identities = enumerate_identities(self.directory.as_ref(), &self.customer).await?;

        let mut outcomes = Vec::with_capacity(identities.len());
        let mut cancelled = false;
        let roster_size = identities.len();

        for identity in identities {
            if cancel.is_cancelled() {
                warn!(
                    remaining = roster_size - outcomes.len(),
                    "Cancelled, stopping before next identity"
                );
                cancelled = true;
                break;
            }

            info!(identity = %identity, "Processing identity");
            let result = self.process_identity(&identity, cancel).await;
            match &result {
                Ok(summary) => info!(
                    identity = %identity,
                    listed = summary.listed,
                    skipped = summary.skipped,
                    recorded = summary.recorded,
                    copied = summary.copied,
                    copy_failed = summary.copy_failed,
                    "Identity consolidated"
                ),
                Err(err) => error!(identity = %identity, error = %err, "Identity failed"),
            }

            let stop = matches!(result, Err(ConsolidationError::Cancelled));
            let outcome = IdentityOutcome { identity, result };
            if let Some(hook) = &self.on_outcome {
                hook(&outcome);
            }
            outcomes.push(outcome);
            if stop {
                cancelled = true;
                break;
            }
        }

        let report = BatchReport {
            roster_size,
            outcomes,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            users = report.roster_size,
            succeeded = report.succeeded(),
            failed = report.failures().count(),
            not_processed = report.not_processed(),
            cancelled = report.cancelled,
            "Batch finished"
        );
        Ok(report)
    }

    async fn process_identity(
        &self,
        identity: &str,
        cancel: &CancellationToken,
    ) -> Result<ConsolidationSummary, ConsolidationError> {
        let work = async {
            let drive = self.factory.drive_for(identity).await.map_err(|source| {
                ConsolidationError::ClientConstruction {
                    identity: identity.to_string(),
                    source,
                }
            })?;
            self.consolidator
                .consolidate(drive.as_ref(), identity, cancel)
                .await
        };

        match self.identity_timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or_else(|_| Err(ConsolidationError::Timeout(limit))),
            None => work.await,
        }
    }
}
