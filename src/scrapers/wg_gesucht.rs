use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{Listing, ListingDetails};
use crate::scrapers::details::parse_details;
use crate::scrapers::traits::ListingSource;

/// WG-Gesucht scraper over plain HTTP.
pub struct WgGesuchtScraper {
    client: Client,
    search_url: String,
}

impl WgGesuchtScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("de,en;q=0.9"));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ListingSource for WgGesuchtScraper {
    async fn search_page(&self) -> Result<String, FetchError> {
        debug!("Fetching search page: {}", self.search_url);
        let html = self.get_text(&self.search_url).await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    async fn listing_details(&self, listing: &Listing) -> ListingDetails {
        match self.get_text(&listing.link).await {
            Ok(html) => parse_details(&html, &listing.link),
            Err(err) => {
                warn!("Could not fetch details for {}: {}", listing.id, err);
                ListingDetails::link_only(&listing.link)
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "WG-Gesucht"
    }
}
