//! URL normalization for stored long URLs.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("only HTTP and HTTPS URLs can be shortened")]
    UnsupportedScheme,
}

/// Brings a URL into canonical form before storage.
///
/// Lowercases the host, strips fragments and default ports, and rejects
/// anything that is not plain HTTP(S): `javascript:`, `data:`, `file:` and
/// friends must never become redirect targets.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedScheme);
    }

    if let Some(host) = url.host_str() {
        let lowered = host.to_ascii_lowercase();
        url.set_host(Some(&lowered))
            .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;
    }

    url.set_fragment(None);

    let default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if default_port {
        // set_port only fails for schemes that cannot carry a port.
        let _ = url.set_port(None);
    }

    Ok(url.to_string())
}
