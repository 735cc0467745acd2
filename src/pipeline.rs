use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::{Config, DeliveryPolicy};
use crate::notify::{build_caption, Notify};
use crate::scrapers::{extract_listings, ListingSource};
use crate::state::SeenStore;

/// What a single run did. `found` counts everything on the page, `new` the
/// subset not yet in the seen-set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub found: usize,
    pub new: usize,
    pub sent: usize,
    pub failed: usize,
}

/// One scheduled run: fetch → extract → diff against the seen-set → notify
/// new listings in page order → persist.
///
/// A fetch failure aborts before any state mutation, so the next scheduled
/// run retries the identical work. Ids are marked seen one by one directly
/// after their send succeeds; whichever way the run ends, every id already
/// sent is persisted and nothing is notified twice.
pub async fn run(
    config: &Config,
    source: &dyn ListingSource,
    notifier: &dyn Notify,
    html_file: Option<&Path>,
) -> Result<RunReport> {
    let mut store = SeenStore::load(&config.state_path);
    info!(
        "Loaded {} seen listing ids from {}",
        store.len(),
        store.path().display()
    );

    let html = match html_file {
        Some(path) => {
            info!("Reading listings from local file {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            info!("Fetching search page from {}", source.source_name());
            source.search_page().await?
        }
    };

    let listings = extract_listings(&html);
    info!("Found {} listing links on page", listings.len());

    if listings.is_empty() && config.debug_dump_html {
        dump_page(&html);
    }

    let mut report = RunReport {
        found: listings.len(),
        ..RunReport::default()
    };

    let new_listings: Vec<_> = listings
        .into_iter()
        .filter(|listing| !store.contains(&listing.id))
        .collect();
    report.new = new_listings.len();

    if new_listings.is_empty() {
        info!("No new listings detected");
        return Ok(report);
    }

    let new_ids: Vec<&str> = new_listings.iter().map(|l| l.id.as_str()).collect();
    info!("Detected {} new listing(s): {:?}", new_ids.len(), new_ids);

    for (i, listing) in new_listings.iter().enumerate() {
        if i > 0 && !config.send_pacing.is_zero() {
            tokio::time::sleep(config.send_pacing).await;
        }

        let details = source.listing_details(listing).await;
        let caption = build_caption(&details);

        match notifier.notify(listing, &caption).await {
            Ok(()) => {
                store.insert(listing.id.clone());
                report.sent += 1;
            }
            Err(err) => {
                report.failed += 1;
                match config.delivery_policy {
                    DeliveryPolicy::SkipAndContinue => {
                        error!("Failed to send message for {}: {}", listing.id, err);
                    }
                    DeliveryPolicy::Abort => {
                        // Persist what was already sent before bailing, so the
                        // next run picks up exactly where this one stopped.
                        store.save().context("Failed to persist seen ids")?;
                        return Err(err).with_context(|| {
                            format!("Aborting run after delivery failure for {}", listing.id)
                        });
                    }
                }
            }
        }
    }

    store.save().context("Failed to persist seen ids")?;
    info!(
        "Saved {} total seen listing ids to {}",
        store.len(),
        store.path().display()
    );

    Ok(report)
}

fn dump_page(html: &str) {
    let write = std::fs::create_dir_all("data")
        .and_then(|_| std::fs::write("data/last_search.html", html));
    match write {
        Ok(()) => info!("Wrote fetched HTML to data/last_search.html"),
        Err(err) => warn!("Could not dump page HTML: {}", err),
    }
}
