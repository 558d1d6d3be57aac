use url::Url;

use crate::errors::{CoreError, CoreResult};

fn normalize(url: &Url) -> CoreResult<Url> {
    let mut canonical = url.clone();

    if canonical.host_str().is_none() {
        return Err(CoreError::MissingComponent("host".to_string()));
    }

    // Normalize scheme and host to lowercase
    let scheme = canonical.scheme();
    let scheme_lower = scheme.to_lowercase();
    if scheme != scheme_lower {
        let _ = canonical.set_scheme(&scheme_lower);
    }

    if let Some(host) = canonical.host_str() {
        let host_lower = host.to_lowercase();
        if host != host_lower {
            let _ = canonical.set_host(Some(&host_lower));
        }
    }

    // Remove default ports
    match (canonical.scheme(), canonical.port()) {
        ("https", Some(443)) | ("http", Some(80)) => {
            let _ = canonical.set_port(None);
        }
        _ => {}
    }

    Ok(canonical)
}

/// Canonical form of a content URL for identity purposes.
///
/// Query and fragment are dropped: CDN tokens and session parameters vary
/// between playbacks of the same content.
pub fn canonicalize_content_url(url: &Url) -> CoreResult<String> {
    let mut canonical = normalize(url)?;
    canonical.set_fragment(None);
    canonical.set_query(None);
    Ok(canonical.to_string())
}

/// Canonical form of an ad tag URL.
///
/// The query is kept: tag parameters select the ad schedule. Only the
/// fragment is dropped.
pub fn canonicalize_tag_url(url: &Url) -> CoreResult<String> {
    let mut canonical = normalize(url)?;
    canonical.set_fragment(None);
    Ok(canonical.to_string())
}
