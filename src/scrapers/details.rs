use regex::Regex;
use scraper::{Element, ElementRef, Html, Selector};

use crate::models::{DescriptionSection, ListingDetails};

// Label variants as they appear in the dt/dd blocks on ad pages.
const PRICE_LABELS: &[&str] = &[
    "miete",
    "gesamtmiete",
    "warmmiete",
    "kaltmiete",
    "miete pro monat",
    "miete/monat",
    "miete monatlich",
];
const SIZE_LABELS: &[&str] = &["größe", "zimmergröße", "fläche", "wohnfläche", "m²"];
const AVAILABLE_FROM_LABELS: &[&str] = &["frei ab", "einzugsdatum", "bezug ab"];
const ONLINE_LABELS: &[&str] = &["online seit", "online"];

const SECTION_TITLES: &[&str] = &["Zimmer", "Lage", "WG-Leben", "Sonstiges"];

const ADDRESS_MAX_CHARS: usize = 200;
const SECTION_MAX_CHARS: usize = 2000;

/// Parse the ad's detail page into an optional-field record. Each field is
/// extracted independently; whatever cannot be read stays absent.
pub fn parse_details(html: &str, link: &str) -> ListingDetails {
    let document = Html::parse_document(html);

    ListingDetails {
        link: link.to_string(),
        title: extract_title(&document),
        price: extract_price(&document),
        size: extract_size(&document),
        address: extract_address(&document),
        image: extract_image(&document),
        available_from: dt_dd_value(&document, AVAILABLE_FROM_LABELS)
            .or_else(|| label_following(&document, AVAILABLE_FROM_LABELS)),
        online_since: dt_dd_value(&document, ONLINE_LABELS)
            .or_else(|| label_following(&document, ONLINE_LABELS)),
        sections: extract_sections(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    for sel in ["h1", "title"] {
        let selector = Selector::parse(sel).unwrap();
        if let Some(el) = document.select(&selector).next() {
            let text = clean_text(&element_text(&el));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Integer EUR amount from text like "430 €" or "430,50 €". The fractional
/// part is matched so "29,90 €" yields 29, never 90.
pub fn parse_price_value(text: &str) -> Option<u32> {
    let normalized = text.replace('\u{a0}', " ");
    let re = Regex::new(r"(\d{1,4})(?:[.,]\d{1,2})?\s*€").unwrap();
    re.captures(&normalized)?.get(1)?.as_str().parse().ok()
}

fn parse_size_value(text: &str) -> Option<u32> {
    let re = Regex::new(r"(\d{1,3})\s*m²").unwrap();
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn extract_price(document: &Html) -> Option<u32> {
    if let Some(value) = dt_dd_value(document, PRICE_LABELS) {
        if let Some(price) = parse_price_value(&value) {
            return Some(price);
        }
    }

    // Fallback: any €-bearing text node with a rent label in a nearby ancestor.
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !text.contains('€') {
            continue;
        }
        let Some(price) = parse_price_value(text) else {
            continue;
        };
        let chain = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take(3)
            .map(|el| element_text(&el).to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        if PRICE_LABELS.iter().any(|label| chain.contains(label)) {
            return Some(price);
        }
    }
    None
}

fn extract_size(document: &Html) -> Option<u32> {
    if let Some(value) = dt_dd_value(document, SIZE_LABELS) {
        if let Some(size) = parse_size_value(&value) {
            return Some(size);
        }
    }
    // Fallback: first m² figure anywhere in the page text.
    parse_size_value(&element_text(&document.root_element()))
}

/// The meta description usually carries the street and district. When the
/// site puts the description-section blob there instead, drop it.
fn extract_address(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let content = document
        .select(&selector)
        .next()?
        .value()
        .attr("content")?;
    let address = clean_text(content);
    if address.is_empty() {
        return None;
    }
    let section_blob = Regex::new(r"\b(Zimmer|Lage|WG-Leben|Sonstiges)\b").unwrap();
    if section_blob.is_match(&address) {
        return None;
    }
    Some(truncate_chars(&address, ADDRESS_MAX_CHARS))
}

fn extract_image(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).unwrap();
    let content = document.select(&selector).next()?.value().attr("content")?;
    let url = content.trim();
    if url.starts_with("http") {
        Some(url.to_string())
    } else {
        None
    }
}

/// Value of the first `<dd>` following a `<dt>` whose label matches.
fn dt_dd_value(document: &Html, labels: &[&str]) -> Option<String> {
    let dt_selector = Selector::parse("dt").unwrap();
    for dt in document.select(&dt_selector) {
        let label = clean_text(&element_text(&dt)).to_lowercase();
        if !labels.iter().any(|l| label.contains(l)) {
            continue;
        }
        let mut sibling = dt.next_sibling_element();
        while let Some(el) = sibling {
            if el.value().name() == "dd" {
                let value = clean_text(&element_text(&el));
                if !value.is_empty() {
                    return Some(value);
                }
                break;
            }
            sibling = el.next_sibling_element();
        }
    }
    None
}

/// Fallback for pages without dt/dd: an element whose text is (or starts
/// with) the label, value taken from the following sibling.
fn label_following(document: &Html, labels: &[&str]) -> Option<String> {
    let any = Selector::parse("body *").unwrap();
    for el in document.select(&any) {
        let text = clean_text(&element_text(&el)).to_lowercase();
        if text.is_empty() || !labels.iter().any(|l| text == *l || text.starts_with(l)) {
            continue;
        }
        if let Some(sibling) = el.next_sibling_element() {
            let value = clean_text(&element_text(&sibling));
            if !value.is_empty() {
                return Some(value);
            }
        }
        if let Some(parent) = el.parent_element() {
            if let Some(sibling) = parent.next_sibling_element() {
                let value = clean_text(&element_text(&sibling));
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Collect the free-text description blocks. A heading matching one of the
/// known section titles opens a section; paragraph and list text is gathered
/// until the next known heading.
fn extract_sections(document: &Html) -> Vec<DescriptionSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for node in document.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let name = el.value().name();

        if matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            let heading = clean_text(&element_text(&el));
            if let Some(title) = SECTION_TITLES
                .iter()
                .find(|t| t.to_lowercase() == heading.to_lowercase())
            {
                flush_section(&mut sections, current.take());
                current = Some(((*title).to_string(), Vec::new()));
                continue;
            }
        }

        if let Some((_, collected)) = current.as_mut() {
            if matches!(name, "p" | "ul" | "ol") {
                let text = clean_text(&element_text(&el));
                if !text.is_empty() {
                    collected.push(text);
                }
            }
        }
    }

    flush_section(&mut sections, current.take());
    sections
}

fn flush_section(sections: &mut Vec<DescriptionSection>, current: Option<(String, Vec<String>)>) {
    if let Some((heading, collected)) = current {
        if !collected.is_empty() {
            sections.push(DescriptionSection {
                heading,
                body: truncate_chars(&collected.join(" "), SECTION_MAX_CHARS),
            });
        }
    }
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

/// Collapse all runs of whitespace to single spaces.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head} …")
    }
}
