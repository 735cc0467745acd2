use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry on the search-results page: the ad id and its absolute URL.
/// Produced fresh every run; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub link: String,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link: link.into(),
            scraped_at: Utc::now(),
        }
    }
}

/// A titled block of free-text description from the ad page
/// (Zimmer, Lage, WG-Leben, Sonstiges).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionSection {
    pub heading: String,
    pub body: String,
}

/// Everything we could read off the ad's detail page. Every field except the
/// link is independently extracted and independently allowed to be absent;
/// a listing with nothing but a link is still notifiable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub link: String,
    pub title: Option<String>,
    /// Monthly rent in EUR, integer part only.
    pub price: Option<u32>,
    /// Room size in m².
    pub size: Option<u32>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub available_from: Option<String>,
    pub online_since: Option<String>,
    pub sections: Vec<DescriptionSection>,
}

impl ListingDetails {
    /// Degraded record used when the detail page cannot be fetched or parsed.
    pub fn link_only(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }
}
