//! Maps public URLs to object keys.
//!
//! A page published at `https://example.com/blog/index.html` is stored under
//! `blog/index.html`. The mapping depends on the URL alone, so republishing
//! the same URL always overwrites the same object.

use serde::{Deserialize, Serialize};

/// Where a local file lands in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
    pub content_type: Option<String>,
}

/// Derives the object key for a public URL.
///
/// Strips a leading `http(s)://host/` (scheme matched case-insensitively) or
/// a single leading `/`, then percent-decodes what is left. A bare origin
/// such as `https://example.com` yields an empty key.
pub fn resolve_key(url: &str) -> String {
    let path = strip_origin(url.trim());
    match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
        }
    }
}

fn strip_origin(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        let has_scheme = url
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme));
        if has_scheme {
            let rest = &url[scheme.len()..];
            return match rest.find('/') {
                Some(slash) => &rest[slash + 1..],
                None => "",
            };
        }
    }
    url.strip_prefix('/').unwrap_or(url)
}
