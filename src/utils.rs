use url::Url;

/// Trims and collapses internal whitespace runs to a single space
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves an href found on `page_url` into an absolute URL.
/// Falls back to the raw href when either side does not parse.
pub fn resolve_link(page_url: &str, href: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Sets `param=value` in the query string of `base`, replacing any previous value
pub fn with_query_param(base: &str, param: &str, value: u32) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != param)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair(param, &value.to_string());
            url.to_string()
        }
        Err(_) => format!("{}?{}={}", base, param, value),
    }
}
