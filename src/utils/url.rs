//! Outbound URL handling
//!
//! Validation of admin-supplied URLs plus the pure transformation pipeline
//! the resolver applies before redirecting: affiliate wrapping first, UTM
//! tagging last, so the tags sit on the outermost URL and survive the
//! affiliate redirect.

use url::Url;

use crate::config::{AffiliateMode, RedirectConfig};
use crate::errors::{BuylinkError, Result};

const UTM_KEYS: &[&str] = &["utm_source", "utm_medium", "utm_campaign"];

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// Validate an admin-supplied option URL.
///
/// Must be a well-formed absolute http(s) URL with a host; dangerous
/// schemes are rejected outright.
pub fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(BuylinkError::validation("URL cannot be empty"));
    }

    let url_lower = url.to_lowercase();
    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(BuylinkError::validation(format!(
                "Dangerous protocol blocked: {}",
                proto
            )));
        }
    }

    let parsed = Url::parse(url)
        .map_err(|e| BuylinkError::validation(format!("Invalid URL format: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(BuylinkError::validation(format!(
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                other
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(BuylinkError::validation("URL has no host"));
    }

    Ok(())
}

/// Rewrites a destination through the configured affiliate network's
/// redirect wrapper, embedding the original URL as an encoded parameter.
/// `Off` passes through unchanged.
pub fn wrap_affiliate(url: &str, mode: &AffiliateMode) -> String {
    match mode {
        AffiliateMode::Off => url.to_string(),
        AffiliateMode::Skimlinks { site_id } => format!(
            "https://go.skimresources.com/?id={}&url={}",
            site_id,
            urlencoding::encode(url)
        ),
    }
}

/// Sets the three UTM parameters on a URL, replacing any existing values
/// so repeated application cannot duplicate keys. A URL that does not
/// parse is returned unchanged; tagging must never break a redirect.
pub fn apply_utm(url_str: &str, cfg: &RedirectConfig) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(u) => u,
        Err(_) => return url_str.to_string(),
    };

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !UTM_KEYS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &retained {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("utm_source", &cfg.utm_source);
        pairs.append_pair("utm_medium", &cfg.utm_medium);
        pairs.append_pair("utm_campaign", &cfg.utm_campaign);
    }

    url.to_string()
}

/// The full outbound transformation: affiliate wrap, then UTM tag.
pub fn transform_outbound(url: &str, mode: &AffiliateMode, cfg: &RedirectConfig) -> String {
    apply_utm(&wrap_affiliate(url, mode), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RedirectConfig {
        RedirectConfig::default()
    }

    #[test]
    fn validate_accepts_https() {
        assert!(validate_url("https://shop.example/a?b=c").is_ok());
    }

    #[test]
    fn validate_rejects_javascript() {
        assert!(validate_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn validate_rejects_relative() {
        assert!(validate_url("/products/123").is_err());
    }

    #[test]
    fn validate_rejects_ftp() {
        assert!(validate_url("ftp://shop.example/file").is_err());
    }

    #[test]
    fn utm_is_appended() {
        let out = apply_utm("https://shop.example/a", &cfg());
        assert!(out.contains("utm_source=buylink"));
        assert!(out.contains("utm_medium=redirect"));
        assert!(out.contains("utm_campaign=product-links"));
    }

    #[test]
    fn utm_replaces_existing_values() {
        let out = apply_utm("https://shop.example/a?utm_source=other&x=1", &cfg());
        assert_eq!(out.matches("utm_source").count(), 1);
        assert!(out.contains("utm_source=buylink"));
        assert!(out.contains("x=1"));
    }

    #[test]
    fn utm_is_idempotent() {
        let once = apply_utm("https://shop.example/a?q=2", &cfg());
        let twice = apply_utm(&once, &cfg());
        assert_eq!(once, twice);
    }

    #[test]
    fn skimlinks_embeds_encoded_original() {
        let mode = AffiliateMode::Skimlinks {
            site_id: "12345X99".to_string(),
        };
        let out = wrap_affiliate("https://shop.example/a?b=c", &mode);
        assert!(out.starts_with("https://go.skimresources.com/?id=12345X99&url="));
        assert!(out.contains("https%3A%2F%2Fshop.example%2Fa%3Fb%3Dc"));
    }

    #[test]
    fn transform_tags_the_wrapper_not_the_inner_url() {
        let mode = AffiliateMode::Skimlinks {
            site_id: "12345X99".to_string(),
        };
        let out = transform_outbound("https://shop.example/a", &mode, &cfg());
        let parsed = Url::parse(&out).unwrap();
        assert_eq!(parsed.host_str(), Some("go.skimresources.com"));
        // utm params live on the outer URL
        assert!(parsed
            .query_pairs()
            .any(|(k, v)| k == "utm_source" && v == "buylink"));
        // the inner URL stays untagged
        let inner = parsed
            .query_pairs()
            .find(|(k, _)| k == "url")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(!inner.contains("utm_source"));
    }

    #[test]
    fn unparseable_url_passes_through() {
        assert_eq!(apply_utm("not a url", &cfg()), "not a url");
    }
}
