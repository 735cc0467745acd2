use crate::models::ListingDetails;

/// Build the Telegram message (parse_mode HTML) for one listing.
///
/// Known fields go first, the ad link is always present, description sections
/// follow. Telegram collapses long messages on its own, so sections are only
/// trimmed, not dropped.
pub fn build_caption(details: &ListingDetails) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = &details.title {
        parts.push(format!("<b>{}</b>", escape_html(title)));
    }

    if details.price.is_some() || details.size.is_some() {
        let mut dims = Vec::new();
        if let Some(price) = details.price {
            dims.push(format!("{price} €"));
        }
        if let Some(size) = details.size {
            dims.push(format!("{size} m²"));
        }
        parts.push(dims.join(" | "));
    }

    if let Some(address) = &details.address {
        parts.push(format!("Adresse: {}", escape_html(address)));
    }
    if let Some(available_from) = &details.available_from {
        parts.push(format!("Frei ab: {}", escape_html(available_from)));
    }
    if let Some(online_since) = &details.online_since {
        parts.push(format!("Online: {}", escape_html(online_since)));
    }

    parts.push(format!(
        "<a href='{}'>Zur Anzeige</a>",
        escape_html(&details.link)
    ));

    if let Some(image) = &details.image {
        parts.push(format!("<a href='{}'>Foto</a>", escape_html(image)));
    }

    for section in &details.sections {
        parts.push(String::new());
        parts.push(format!("<b>{}</b>", escape_html(&section.heading)));
        parts.push(escape_html(&section.body));
    }

    parts.join("\n")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DescriptionSection, ListingDetails};

    #[test]
    fn link_only_listing_still_produces_a_caption() {
        let details = ListingDetails::link_only("https://www.wg-gesucht.de/1234567.html");
        let caption = build_caption(&details);
        assert_eq!(
            caption,
            "<a href='https://www.wg-gesucht.de/1234567.html'>Zur Anzeige</a>"
        );
    }

    #[test]
    fn full_listing_renders_all_lines_in_order() {
        let details = ListingDetails {
            link: "https://www.wg-gesucht.de/1234567.html".to_string(),
            title: Some("Helles Zimmer".to_string()),
            price: Some(430),
            size: Some(15),
            address: Some("Hechinger Straße, Tübingen".to_string()),
            image: Some("https://img.wg-gesucht.de/1.jpg".to_string()),
            available_from: Some("01.10.2026".to_string()),
            online_since: Some("3 Stunden".to_string()),
            sections: vec![DescriptionSection {
                heading: "Lage".to_string(),
                body: "Fünf Minuten zum Bahnhof.".to_string(),
            }],
        };
        let caption = build_caption(&details);
        let lines: Vec<&str> = caption.lines().collect();
        assert_eq!(lines[0], "<b>Helles Zimmer</b>");
        assert_eq!(lines[1], "430 € | 15 m²");
        assert_eq!(lines[2], "Adresse: Hechinger Straße, Tübingen");
        assert_eq!(lines[3], "Frei ab: 01.10.2026");
        assert_eq!(lines[4], "Online: 3 Stunden");
        assert_eq!(
            lines[5],
            "<a href='https://www.wg-gesucht.de/1234567.html'>Zur Anzeige</a>"
        );
        assert_eq!(lines[6], "<a href='https://img.wg-gesucht.de/1.jpg'>Foto</a>");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "<b>Lage</b>");
        assert_eq!(lines[9], "Fünf Minuten zum Bahnhof.");
    }

    #[test]
    fn price_alone_omits_the_separator() {
        let mut details = ListingDetails::link_only("x");
        details.price = Some(430);
        let caption = build_caption(&details);
        assert!(caption.starts_with("430 €\n"));
        assert!(!caption.contains('|'));
    }

    #[test]
    fn markup_in_scraped_text_is_escaped() {
        let mut details = ListingDetails::link_only("https://example.org/?a=1&b=2");
        details.title = Some("<script>alert('x')</script> & more".to_string());
        let caption = build_caption(&details);
        assert!(caption.contains(
            "<b>&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt; &amp; more</b>"
        ));
        assert!(caption.contains("<a href='https://example.org/?a=1&amp;b=2'>Zur Anzeige</a>"));
    }
}
