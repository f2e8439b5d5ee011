//! URL helpers: request canonicalization, host labels and https upgrade.

use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a requested URL before fetching.
///
/// 1. Trim surrounding whitespace
/// 2. Default the scheme to `https://` when missing
/// 3. Lowercase the host
/// 4. Drop the fragment
/// 5. Keep the query untouched, since vendor pages carry the part number there
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut parsed = Url::parse(&with_scheme).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed.set_host(Some(&host)).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }
    parsed.set_fragment(None);

    Ok(parsed)
}

/// The host label just left of the top-level label (`thorlabs` in `www.thorlabs.de`).
pub fn second_level_label(host: &str) -> Option<&str> {
    let mut labels = host.trim_end_matches('.').rsplit('.');
    labels.next()?;
    labels.next().filter(|label| !label.is_empty())
}

/// Resolve `href` against `base` and force the `https` scheme.
///
/// Protocol-relative and `http://` links are upgraded; other schemes are left alone.
pub fn force_https(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href.trim()).ok()?.to_string();

    Some(match resolved.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => resolved,
    })
}
