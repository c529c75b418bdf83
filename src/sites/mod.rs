//! Site collaborators
//!
//! A [`Site`] knows how to decide whether a page of one particular website is a
//! recipe and how to extract it. The crawler core only talks to this trait;
//! supporting a new website means adding an implementation and registering it in
//! [`SiteRegistry`].

mod kwestiasmaku;

pub use kwestiasmaku::KwestiaSmaku;

use crate::model::Recipe;
use crate::url::site_domain;
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of classifying one page
///
/// A fetch error, a parse error and a page that simply is not a recipe all end up
/// as [`Classification::NotDocument`]; the crawler harvests links from `body` in
/// every one of those cases.
#[derive(Debug, Clone)]
pub enum Classification {
    /// The page is a recipe
    Document { document: Recipe, body: String },

    /// The page is not a recipe, or could not be fetched
    NotDocument {
        /// Raw response body, empty when nothing was received
        body: String,
        /// Human-readable explanation, for logging only
        reason: String,
    },
}

impl Classification {
    pub fn not_document(body: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotDocument {
            body: body.into(),
            reason: reason.into(),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document { .. })
    }

    /// Raw body of the fetched page
    pub fn body(&self) -> &str {
        match self {
            Self::Document { body, .. } | Self::NotDocument { body, .. } => body,
        }
    }
}

/// A website the crawler knows how to harvest
#[async_trait]
pub trait Site: Send + Sync {
    /// Site id under which jobs and documents are stored
    fn name(&self) -> &str;

    /// Origin host the site is registered for, without `www.`
    fn domain(&self) -> &str;

    /// `(name, domain)` pair identifying the site
    fn identity(&self) -> (&str, &str) {
        (self.name(), self.domain())
    }

    /// Fetches `url` and decides whether it is a recipe
    async fn classify(&self, client: &Client, url: &str) -> Classification;

    /// Path prefixes the site would like excluded from discovery
    ///
    /// Declared for every site but not consulted by link discovery yet.
    fn skip_prefixes(&self) -> &[&str] {
        &[]
    }
}

/// Lookup of site collaborators keyed by origin domain
pub struct SiteRegistry {
    sites: HashMap<String, Arc<dyn Site>>,
}

impl SiteRegistry {
    /// Creates a registry with no sites
    pub fn empty() -> Self {
        Self {
            sites: HashMap::new(),
        }
    }

    /// Registers a site under its domain, replacing any previous entry
    pub fn register(&mut self, site: Arc<dyn Site>) {
        self.sites.insert(site_domain(site.domain()), site);
    }

    /// Finds the site responsible for `host`
    ///
    /// The host is lower-cased and a leading `www.` ignored.
    pub fn find(&self, host: &str) -> Result<Arc<dyn Site>, ConfigError> {
        if self.sites.is_empty() {
            return Err(ConfigError::Validation("no registered sites".to_string()));
        }

        let domain = site_domain(host);
        self.sites
            .get(&domain)
            .cloned()
            .ok_or(ConfigError::UnknownSite(domain))
    }

    /// All registered sites, sorted by name
    pub fn sites(&self) -> Vec<Arc<dyn Site>> {
        let mut sites: Vec<_> = self.sites.values().cloned().collect();
        sites.sort_by(|a, b| a.name().cmp(b.name()));
        sites
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(KwestiaSmaku));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_finds_kwestiasmaku() {
        let registry = SiteRegistry::default();
        let site = registry.find("www.kwestiasmaku.com").unwrap();
        assert_eq!(site.identity(), ("kwestiasmaku.com", "kwestiasmaku.com"));
    }

    #[test]
    fn test_unknown_host() {
        let registry = SiteRegistry::default();
        let result = registry.find("example.com");
        assert!(matches!(result, Err(ConfigError::UnknownSite(d)) if d == "example.com"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = SiteRegistry::empty();
        assert!(matches!(
            registry.find("kwestiasmaku.com"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_skip_prefixes_default_empty() {
        assert!(KwestiaSmaku.skip_prefixes().is_empty());
    }

    #[test]
    fn test_classification_body() {
        let outcome = Classification::not_document("<html></html>", "no recipe");
        assert!(!outcome.is_document());
        assert_eq!(outcome.body(), "<html></html>");
    }
}
