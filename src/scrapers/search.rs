use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::Listing;

const SITE_BASE: &str = "https://www.wg-gesucht.de";

/// Extract listing ids and links from the search-results page.
///
/// Several strategies run in sequence so a markup change on the site does not
/// silently drop everything: raw-HTML regexes over absolute and relative ad
/// links, then DOM passes over anchors, data attributes and element ids.
/// First occurrence wins; the result is in page order and free of duplicates.
pub fn extract_listings(html: &str) -> Vec<Listing> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut listings: Vec<Listing> = Vec::new();

    // Absolute links first; 6+ digits avoids false positives in raw HTML.
    let absolute = Regex::new(r"https?://www\.wg-gesucht\.de/(\d{6,})\.html").unwrap();
    for caps in absolute.captures_iter(html) {
        push(&mut listings, &mut seen, &caps[1], None);
    }

    let relative = Regex::new(r"/(\d{6,})\.html").unwrap();
    for caps in relative.captures_iter(html) {
        push(&mut listings, &mut seen, &caps[1], None);
    }

    // DOM passes tolerate shorter ids since the attribute context vouches
    // for them.
    let in_href = Regex::new(r"/(\d{5,})\.html").unwrap();
    let digits_only = Regex::new(r"^\d{5,}$").unwrap();
    let in_element_id = Regex::new(r"liste-details-ad-(\d{5,})").unwrap();

    let document = Html::parse_document(html);

    let anchor_sel = Selector::parse("a").unwrap();
    for anchor in document.select(&anchor_sel) {
        let href = anchor
            .value()
            .attr("href")
            .or_else(|| anchor.value().attr("data-href"));
        let Some(href) = href else { continue };
        if let Some(caps) = in_href.captures(href) {
            let link = href.starts_with("http").then(|| href.to_string());
            push(&mut listings, &mut seen, &caps[1], link);
        }
    }

    for attr in ["data-id", "data-ad_id"] {
        let sel = Selector::parse(&format!("[{attr}]")).unwrap();
        for element in document.select(&sel) {
            let value = element.value().attr(attr).unwrap_or("").trim();
            if digits_only.is_match(value) {
                push(&mut listings, &mut seen, value, None);
            }
        }
    }

    let with_id = Selector::parse("[id]").unwrap();
    for element in document.select(&with_id) {
        if let Some(caps) = in_element_id.captures(element.value().attr("id").unwrap_or("")) {
            push(&mut listings, &mut seen, &caps[1], None);
        }
    }

    listings
}

fn push(listings: &mut Vec<Listing>, seen: &mut HashSet<String>, id: &str, link: Option<String>) {
    if seen.insert(id.to_string()) {
        let link = link.unwrap_or_else(|| format!("{SITE_BASE}/{id}.html"));
        listings.push(Listing::new(id, link));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
          <a href="https://www.wg-gesucht.de/1234567.html">Zimmer in der Altstadt</a>
          <div class="offer_list_item" data-id="2345678">
            <a data-href="/2345678.html">15m² WG-Zimmer</a>
          </div>
          <a href="/3456789.html?utm=x">Helles Zimmer</a>
          <tr id="liste-details-ad-4567890"><td>Anzeige</td></tr>
          <a href="https://www.wg-gesucht.de/1234567.html">duplicate</a>
          <a href="/ueber-uns.html">not a listing</a>
        </body></html>
    "#;

    #[test]
    fn extracts_ids_from_all_strategies() {
        let listings = extract_listings(FIXTURE);
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1234567", "2345678", "3456789", "4567890"]);
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let listings = extract_listings(FIXTURE);
        let count = listings.iter().filter(|l| l.id == "1234567").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn absolute_hrefs_are_kept_relative_ones_canonicalized() {
        let listings = extract_listings(FIXTURE);
        assert_eq!(listings[0].link, "https://www.wg-gesucht.de/1234567.html");
        assert_eq!(listings[1].link, "https://www.wg-gesucht.de/2345678.html");
    }

    #[test]
    fn extraction_is_idempotent() {
        let first: Vec<_> = extract_listings(FIXTURE)
            .into_iter()
            .map(|l| (l.id, l.link))
            .collect();
        let second: Vec<_> = extract_listings(FIXTURE)
            .into_iter()
            .map(|l| (l.id, l.link))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn short_ids_need_attribute_context() {
        // 5 digits is too short for the raw-HTML pass but fine for data-id.
        let html = r#"<a href="/12345.html">x</a><div data-id="54321"></div>"#;
        let listings = extract_listings(html);
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["12345", "54321"]);
    }

    #[test]
    fn empty_page_yields_no_listings() {
        assert!(extract_listings("<html><body></body></html>").is_empty());
    }
}
