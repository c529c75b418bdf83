use url::Url;

/// Reduces a host name to the domain sites are registered under
///
/// The host is lower-cased and a leading `www.` is dropped, so
/// `www.KwestiaSmaku.com` and `kwestiasmaku.com` resolve to the same site.
///
/// # Examples
///
/// ```
/// use recipe_harvester::url::site_domain;
///
/// assert_eq!(site_domain("www.example.com"), "example.com");
/// assert_eq!(site_domain("Blog.Example.com"), "blog.example.com");
/// ```
pub fn site_domain(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Extracts the site domain from a URL, if it has a host
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(site_domain)
}
