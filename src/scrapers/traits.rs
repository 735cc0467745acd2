use crate::error::FetchError;
use crate::models::{Listing, ListingDetails};
use async_trait::async_trait;

/// Common trait for listing sources.
/// Split into search-page and detail-page steps so the pipeline can dedupe
/// against the seen-set before spending a request per listing.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the raw HTML of the search-results page.
    async fn search_page(&self) -> Result<String, FetchError>;

    /// Fetch and parse the ad's detail page. Never fails: a listing whose
    /// page cannot be read still yields a link-only record.
    async fn listing_details(&self, listing: &Listing) -> ListingDetails;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}
