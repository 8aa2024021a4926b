//! Organization roster enumeration.

use crate::interfaces::{ConsolidationError, DirectoryService};
use crate::paging::collect_pages;
use crate::types::MemberQuery;
use tracing::info;

/// Customer alias for the account that owns the credentials.
pub const DEFAULT_CUSTOMER: &str = "my_customer";

/// Largest page the directory accepts.
pub const DIRECTORY_PAGE_SIZE: u32 = 500;

pub const DIRECTORY_ORDER_BY: &str = "email";

/// Suspended accounts cannot be impersonated.
pub const ACTIVE_MEMBERS_FILTER: &str = "isSuspended=false";

impl MemberQuery {
    /// Every active member of `customer`, ordered by address.
    pub fn for_customer(customer: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            page_size: DIRECTORY_PAGE_SIZE,
            order_by: DIRECTORY_ORDER_BY.to_string(),
            filter: Some(ACTIVE_MEMBERS_FILTER.to_string()),
        }
    }
}

/// List the primary address of every member, following pagination.
///
/// Any page failure aborts the enumeration: a truncated roster would silently
/// leave real users unprocessed.
pub async fn enumerate_identities(
    directory: &dyn DirectoryService,
    customer: &str,
) -> Result<Vec<String>, ConsolidationError> {
    let query = MemberQuery::for_customer(customer);
    let query = &query;
    let members = collect_pages(move |token| async move {
        directory.list_members(query, token.as_deref()).await
    })
    .await
    .map_err(ConsolidationError::DirectoryFetch)?;

    let identities: Vec<String> = members
        .into_iter()
        .map(|member| member.primary_email)
        .collect();
    info!(customer, users = identities.len(), "Enumerated directory");
    Ok(identities)
}
