//! Find-or-create of the per-identity consolidation folder.

use crate::interfaces::{DriveService, ServiceError};
use crate::types::{FileMetadata, FileQuery, DESTINATION_FOLDER_NAME};
use tracing::{info, warn};

/// Return the id of the consolidation folder under the identity's root,
/// creating it when none exists.
///
/// Several pre-existing folders with the fixed name are not merged; the first
/// one in the backend's listing order is used.
pub async fn resolve_folder(drive: &dyn DriveService) -> Result<String, ServiceError> {
    let existing = drive
        .list_files(&FileQuery::destination_folder(), None)
        .await?
        .items;

    if let Some(folder) = existing.first() {
        if existing.len() > 1 {
            warn!(
                folder_id = %folder.id,
                candidates = existing.len(),
                "Multiple {} folders found, using the first",
                DESTINATION_FOLDER_NAME
            );
        }
        return Ok(folder.id.clone());
    }

    let created = drive
        .create_file(&FileMetadata::destination_folder())
        .await?;
    info!(folder_id = %created.id, "Created {} folder", DESTINATION_FOLDER_NAME);
    Ok(created.id)
}
