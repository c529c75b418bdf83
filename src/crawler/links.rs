//! Same-origin link extraction
//!
//! Only site-root-relative hrefs (`/path`) are followed. They are appended to
//! the origin of the page they were found on. Everything else on the page is
//! ignored: absolute links, fragments, `mailto:` and friends, relative paths
//! and protocol-relative `//host/...` links.
//!
//! No deduplication happens here; the frontier ignores URLs it already knows.

use scraper::{Html, Selector};
use url::Url;

/// Extracts same-origin links from an HTML page
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `source` - The URL the page was fetched from
///
/// # Returns
///
/// Absolute URLs in document order, duplicates included
///
/// # Example
///
/// ```
/// use recipe_harvester::crawler::extract_links;
/// use url::Url;
///
/// let html = r##"<a href="/b">b</a><a href="https://other.test/c">c</a><a href="#frag">f</a>"##;
/// let source = Url::parse("https://x.test/a").unwrap();
/// assert_eq!(extract_links(html, &source), vec!["https://x.test/b"]);
/// ```
pub fn extract_links(html: &str, source: &Url) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let origin = source.origin().ascii_serialization();
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_root_relative(href))
        .map(|href| format!("{}{}", origin, href))
        .collect()
}

fn is_root_relative(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}
