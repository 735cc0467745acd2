pub mod details;
pub mod search;
pub mod traits;
pub mod wg_gesucht;

pub use search::extract_listings;
pub use traits::ListingSource;
pub use wg_gesucht::WgGesuchtScraper;
