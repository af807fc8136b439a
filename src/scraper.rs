use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Container that holds the organic result listing on a results page.
pub const RESULTS_CONTAINER: &str = "#search";

/// Link hosts containing any of these are not counted as organic results.
const EXCLUDED_HOST_MARKERS: [&str; 3] = ["google", "youtube", "maps"];

// Create static selectors to avoid recompiling them each time
static RESULT_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#search a[href]").expect("Failed to parse result link selector")
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3").expect("Failed to parse title selector"));

/// One eligible organic result taken from a results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub result_url: String,
    pub host: String,
    pub displayed_title: String,
    pub position: u32,
}

pub fn build_search_url(host: &str, keyword: &str, window: usize) -> String {
    format!(
        "https://{}/search?q={}&num={}",
        host,
        urlencoding::encode(keyword),
        window
    )
}

/// Extract eligible organic results from a rendered results page.
///
/// Walks links under the results container in document order. Only absolute
/// `http`/`https` links are considered, and links whose host looks like
/// search-engine furniture (`google`, `youtube`, `maps`) are skipped without
/// consuming a position. Stops once `limit` entries have been collected.
pub fn extract_entries(html: &str, limit: usize) -> Vec<SearchResultEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for element in document.select(&RESULT_LINK_SELECTOR) {
        if entries.len() >= limit {
            break;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(url) = Url::parse(href.trim()) else {
            continue;
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }
        let Some(host) = url.host_str().map(str::to_lowercase) else {
            continue;
        };
        if is_excluded_host(&host) {
            continue;
        }

        entries.push(SearchResultEntry {
            result_url: url.to_string(),
            host,
            displayed_title: displayed_title(&element),
            position: entries.len() as u32 + 1,
        });
    }

    entries
}

/// Position of the first entry served from `target` or one of its subdomains.
pub fn find_rank(entries: &[SearchResultEntry], target: &str) -> Option<u32> {
    if target.is_empty() {
        return None;
    }
    entries
        .iter()
        .find(|entry| entry.host == target || entry.host.contains(target))
        .map(|entry| entry.position)
}

fn is_excluded_host(host: &str) -> bool {
    EXCLUDED_HOST_MARKERS
        .iter()
        .any(|marker| host.contains(marker))
}

fn displayed_title(element: &ElementRef) -> String {
    let heading = element
        .select(&TITLE_SELECTOR)
        .next()
        .map(|h| collapse_whitespace(&h.text().collect::<String>()));

    match heading {
        Some(title) if !title.is_empty() => title,
        _ => collapse_whitespace(&element.text().collect::<String>()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_page(links: &[(&str, &str)]) -> String {
        let anchors: String = links
            .iter()
            .map(|(href, title)| format!(r#"<div class="g"><a href="{href}"><h3>{title}</h3></a></div>"#))
            .collect();
        format!(
            r#"<html><body><a href="https://example.com/header">nav</a><div id="search">{anchors}</div></body></html>"#
        )
    }

    #[test]
    fn search_url_encodes_keyword() {
        assert_eq!(
            build_search_url("google.co.uk", "seo tools & more", 100),
            "https://google.co.uk/search?q=seo%20tools%20%26%20more&num=100"
        );
    }

    #[test]
    fn excluded_hosts_do_not_consume_positions() {
        let html = results_page(&[
            ("https://www.google.com/search?q=x", "Google"),
            ("https://www.youtube.com/watch?v=1", "Video"),
            ("https://example.com/page", "Example"),
        ]);
        let entries = extract_entries(&html, 100);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "example.com");
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].displayed_title, "Example");
        assert_eq!(find_rank(&entries, "example.com"), Some(1));
    }

    #[test]
    fn maps_hosts_are_excluded() {
        let html = results_page(&[
            ("https://maps.apple.com/place", "Maps"),
            ("https://other.org/", "Other"),
        ]);
        let entries = extract_entries(&html, 100);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "other.org");
    }

    #[test]
    fn relative_and_non_http_links_are_ignored() {
        let html = results_page(&[
            ("/url?q=https://example.com", "Redirect"),
            ("javascript:void(0)", "Script"),
            ("ftp://files.example.com/", "Ftp"),
            ("https://first.org/", "First"),
        ]);
        let entries = extract_entries(&html, 100);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].result_url, "https://first.org/");
    }

    #[test]
    fn links_outside_results_container_are_ignored() {
        let html = results_page(&[("https://other.org/", "Other")]);
        let entries = extract_entries(&html, 100);
        assert!(entries.iter().all(|e| e.host != "example.com"));
    }

    #[test]
    fn stops_at_limit() {
        let links: Vec<(String, String)> = (0..120)
            .map(|i| (format!("https://site{i}.com/"), format!("Site {i}")))
            .collect();
        let borrowed: Vec<(&str, &str)> = links
            .iter()
            .map(|(h, t)| (h.as_str(), t.as_str()))
            .collect();
        let entries = extract_entries(&results_page(&borrowed), 100);

        assert_eq!(entries.len(), 100);
        assert_eq!(entries.last().map(|e| e.position), Some(100));
        assert_eq!(find_rank(&entries, "site110.com"), None);
    }

    #[test]
    fn subdomains_match_target() {
        let html = results_page(&[
            ("https://other.org/", "Other"),
            ("https://blog.example.com/post", "Blog"),
            ("https://example.com/", "Home"),
        ]);
        let entries = extract_entries(&html, 100);
        assert_eq!(find_rank(&entries, "example.com"), Some(2));
    }

    #[test]
    fn falls_back_to_anchor_text_for_title() {
        let html = r#"<div id="search"><a href="https://example.com/">  Plain
            link  </a></div>"#;
        let entries = extract_entries(html, 100);
        assert_eq!(entries[0].displayed_title, "Plain link");
    }

    #[test]
    fn missing_domain_is_not_ranked() {
        let html = results_page(&[("https://other.org/", "Other")]);
        let entries = extract_entries(&html, 100);
        assert_eq!(find_rank(&entries, "example.com"), None);
        assert_eq!(find_rank(&entries, ""), None);
    }
}
