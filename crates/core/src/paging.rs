//! Exhaustive pagination over token-based listings.

use crate::interfaces::ServiceError;
use crate::types::Page;
use std::future::Future;
use tracing::debug;

/// Follow page tokens until the listing is exhausted.
///
/// `fetch` receives the token of the page to request (`None` for the first
/// page). An empty token ends the listing. A token identical to the previous
/// one is reported as [`ServiceError::Pagination`] instead of being followed.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ServiceError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ServiceError>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(token.clone()).await?;
        pages += 1;
        items.extend(page.items);

        match page.next_page_token.filter(|next| !next.is_empty()) {
            Some(next) => {
                if token.as_deref() == Some(next.as_str()) {
                    return Err(ServiceError::Pagination(format!(
                        "page token {} repeated after page {}",
                        next, pages
                    )));
                }
                token = Some(next);
            }
            None => break,
        }
    }

    debug!(pages, items = items.len(), "Listing exhausted");
    Ok(items)
}
