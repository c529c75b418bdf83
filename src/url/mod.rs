//! URL handling module for Recipe-Harvester
//!
//! Seed URL validation and the host → site domain mapping used to pick a site
//! collaborator.

mod domain;

pub use domain::{extract_domain, site_domain};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a seed URL given on the command line
///
/// Only absolute `http`/`https` URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use recipe_harvester::url::parse_seed_url;
///
/// let url = parse_seed_url("https://www.kwestiasmaku.com/").unwrap();
/// assert_eq!(url.host_str(), Some("www.kwestiasmaku.com"));
///
/// assert!(parse_seed_url("ftp://example.com/").is_err());
/// ```
pub fn parse_seed_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_seed() {
        let url = parse_seed_url("https://example.com/przepisy").unwrap();
        assert_eq!(url.as_str(), "https://example.com/przepisy");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let url = parse_seed_url("  http://example.com/  ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_reject_relative() {
        assert!(matches!(
            parse_seed_url("/przepisy"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_reject_scheme() {
        assert!(matches!(
            parse_seed_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(s)) if s == "ftp"
        ));
    }

    #[test]
    fn test_reject_missing_host() {
        assert!(matches!(
            parse_seed_url("file:///tmp/page.html"),
            Err(UrlError::InvalidScheme(_))
        ));
    }
}
