//! Host and domain normalisation.
//!
//! Both the target domain and the search-engine location arrive in whatever
//! form the user typed them (`https://www.Example.com/`, `example.com`,
//! `www.google.co.uk`). These helpers reduce them to a bare lowercase host.

use std::net::IpAddr;

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Characters that end the host part of a user-supplied value.
const HOST_TERMINATORS: [char; 4] = ['/', '?', '#', ':'];

/// Brand label every accepted search-engine host starts with.
const SEARCH_ENGINE_LABEL: &str = "google";

/// Lowercase, trim and strip any number of leading schemes and `www.`.
fn strip_prefixes(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut host = lowered.as_str();

    loop {
        let before = host.len();
        for scheme in SCHEMES {
            if let Some(rest) = host.strip_prefix(scheme) {
                host = rest;
            }
        }
        if let Some(rest) = host.strip_prefix("www.") {
            host = rest;
        }
        if host.len() == before {
            break;
        }
    }

    host.to_string()
}

/// Reduce a user-supplied host to its bare lowercase form.
///
/// Strips any leading scheme and `www.` prefixes and drops everything from
/// the first `/`, `?`, `#` or `:` onwards. Applying it twice yields the same
/// value.
pub fn normalize_host(raw: &str) -> String {
    let stripped = strip_prefixes(raw);
    let host = stripped.split(HOST_TERMINATORS).next().unwrap_or_default();
    host.trim().to_string()
}

/// Comparison key for the domain being tracked.
pub fn normalize_domain(raw: &str) -> String {
    normalize_host(raw)
}

/// Resolve a location identifier such as `google.co.uk` to the host queried.
///
/// Only plain DNS names shaped like a Google country domain are accepted:
/// `google.com`, `google.<cc>`, `google.co.<cc>` and `google.com.<cc>`. Ports,
/// paths, queries, credentials and IP literals are rejected rather than
/// stripped, since the result is navigated to by the server's browser.
pub fn search_engine_host(raw: &str) -> Option<String> {
    let stripped = strip_prefixes(raw);
    let host = stripped.strip_suffix('/').unwrap_or(&stripped);

    if host.is_empty() || host.len() > 253 || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels[0] != SEARCH_ENGINE_LABEL {
        return None;
    }
    let valid_label = |label: &&str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !labels.iter().all(valid_label) {
        return None;
    }
    let is_country =
        |label: &str| label.len() == 2 && label.chars().all(|c| c.is_ascii_alphabetic());
    let known_suffix = match labels[1..] {
        [tld] => tld == "com" || is_country(tld),
        [second, country] => (second == "co" || second == "com") && is_country(country),
        _ => false,
    };
    if !known_suffix {
        return None;
    }

    Some(host.to_string())
}
