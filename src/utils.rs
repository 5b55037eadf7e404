use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

// Characters left untouched by JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Returns the link if it is a usable http(s) URL, otherwise `None`.
pub fn sanitize_link(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() || trimmed.len() > 2000 {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {
            Some(trimmed.to_string())
        }
        Ok(parsed) => {
            debug!("Dropping link with unsupported scheme {}: {}", parsed.scheme(), trimmed);
            None
        }
        Err(e) => {
            debug!("Dropping unparseable link {:?}: {}", trimmed, e);
            None
        }
    }
}

pub fn mask_api_key(key: &str) -> String {
    let visible: String = key.chars().take(5).collect();
    let hidden = key.chars().count().saturating_sub(5);
    format!("{}{}", visible, "*".repeat(hidden))
}
