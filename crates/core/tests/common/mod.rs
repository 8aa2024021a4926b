//! In-memory collaborators shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sharesweep_core::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub fn owned(id: &str, name: &str, owner_email: &str) -> DriveFile {
    DriveFile::new(id, name, vec![Owner::new("Owner", owner_email)])
}

/// Storage for one identity. Shared listings are paged by the query's page
/// size (or `page_size` when set); folders persist across calls.
#[derive(Default)]
pub struct FakeDrive {
    pub shared: Vec<DriveFile>,
    pub page_size: Option<usize>,
    pub failing_copies: HashSet<String>,
    pub fail_shared_list: bool,
    pub fail_folder_list: bool,
    pub list_delay: Option<Duration>,
    pub cancel_after_copies: Option<(usize, CancellationToken)>,
    pub folders: Mutex<Vec<DriveFile>>,
    pub created: Mutex<Vec<FileMetadata>>,
    pub copies: Mutex<Vec<(String, FileMetadata)>>,
    pub shared_pages_served: Mutex<usize>,
}

impl FakeDrive {
    pub fn with_shared(shared: Vec<DriveFile>) -> Self {
        Self {
            shared,
            ..Self::default()
        }
    }

    pub fn copied_ids(&self) -> Vec<String> {
        self.copies.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl DriveService for FakeDrive {
    async fn list_files(
        &self,
        query: &FileQuery,
        page_token: Option<&str>,
    ) -> Result<Page<DriveFile>, ServiceError> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        if query.q == FileQuery::destination_folder().q {
            if self.fail_folder_list {
                return Err(ServiceError::Api {
                    status: 500,
                    message: "internal error".into(),
                });
            }
            return Ok(Page::last(self.folders.lock().clone()));
        }

        assert_eq!(query.q, "sharedWithMe = true");
        if self.fail_shared_list {
            return Err(ServiceError::Http("connection reset".into()));
        }

        let size = self
            .page_size
            .or(query.page_size.map(|s| s as usize))
            .unwrap()
            .max(1);
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + size).min(self.shared.len());
        *self.shared_pages_served.lock() += 1;

        let items = self.shared[start..end].to_vec();
        if end < self.shared.len() {
            Ok(Page::with_next(items, end.to_string()))
        } else {
            Ok(Page::last(items))
        }
    }

    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile, ServiceError> {
        self.created.lock().push(metadata.clone());
        let mut folders = self.folders.lock();
        let folder = DriveFile::new(
            format!("folder-{}", folders.len() + 1),
            metadata.name.clone().unwrap_or_default(),
            vec![],
        );
        folders.push(folder.clone());
        Ok(folder)
    }

    async fn copy_file(
        &self,
        file_id: &str,
        metadata: &FileMetadata,
    ) -> Result<DriveFile, ServiceError> {
        self.copies
            .lock()
            .push((file_id.to_string(), metadata.clone()));

        if let Some((after, token)) = &self.cancel_after_copies {
            if self.copies.lock().len() >= *after {
                token.cancel();
            }
        }

        if self.failing_copies.contains(file_id) {
            return Err(ServiceError::Api {
                status: 403,
                message: "cannotCopyFile".into(),
            });
        }
        Ok(DriveFile::new(format!("copy-of-{}", file_id), "", vec![]))
    }
}

pub struct FakeDirectory {
    pub members: Vec<String>,
    pub fail: bool,
}

impl FakeDirectory {
    pub fn new(members: &[&str]) -> Self {
        Self {
            members: members.iter().map(|m| m.to_string()).collect(),
            fail: false,
        }
    }
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list_members(
        &self,
        _query: &MemberQuery,
        _page_token: Option<&str>,
    ) -> Result<Page<Member>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Auth("admin not delegated".into()));
        }
        Ok(Page::last(
            self.members
                .iter()
                .map(|email| Member {
                    primary_email: email.clone(),
                })
                .collect(),
        ))
    }
}

/// Hands out the registered drive for each identity; unknown identities fail
/// client construction.
#[derive(Default)]
pub struct FakeFactory {
    pub drives: HashMap<String, Arc<FakeDrive>>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn with(mut self, identity: &str, drive: FakeDrive) -> Self {
        self.drives.insert(identity.to_string(), Arc::new(drive));
        self
    }

    pub fn drive(&self, identity: &str) -> Arc<FakeDrive> {
        self.drives[identity].clone()
    }
}

#[async_trait]
impl DriveClientFactory for FakeFactory {
    async fn drive_for(&self, identity: &str) -> Result<Arc<dyn DriveService>, ServiceError> {
        self.requested.lock().push(identity.to_string());
        match self.drives.get(identity) {
            Some(drive) => Ok(drive.clone() as Arc<dyn DriveService>),
            None => Err(ServiceError::Auth(format!(
                "unauthorized_client for {}",
                identity
            ))),
        }
    }
}

pub fn read_record(dir: &std::path::Path, identity: &str) -> Vec<String> {
    std::fs::read_to_string(record_path(dir, identity))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Fields of one emitted event, rendered as strings; the text is under
/// `message`.
pub type CapturedEvent = HashMap<String, String>;

/// Layer that keeps every event it sees.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    pub events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.get("message").map(String::as_str) == Some(message))
            .cloned()
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCapture::default();
        event.record(&mut fields);
        self.events.lock().push(fields.0);
    }
}

#[derive(Default)]
struct FieldCapture(CapturedEvent);

impl Visit for FieldCapture {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{:?}", value));
    }
}
