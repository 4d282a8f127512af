//! Tolerant session-descriptor handling.
//!
//! Current pipelines return the token as an explicit field. Older ones
//! only embedded it in the `pages`/`playlist` path, so the controller
//! keeps a path-derivation fallback: the token is the path segment
//! between the content prefix and the known suffix.

use serde::Deserialize;

/// Descriptor as relayed by the origin, with every field optional so
/// both response generations parse.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawDescriptor {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub token: Option<String>,
    pub pages: Option<String>,
    pub playlist: Option<String>,
}

impl RawDescriptor {
    /// Derives the session token: the explicit field when present,
    /// otherwise pattern-matched out of whichever path was returned.
    pub fn derive_token(&self) -> Option<String> {
        if let Some(token) = &self.token {
            if !token.is_empty() {
                return Some(token.clone());
            }
        }
        if let Some(pages) = &self.pages {
            if let Some(token) = token_between(pages, "/document/", "/pages") {
                return Some(token);
            }
        }
        if let Some(playlist) = &self.playlist {
            if let Some(token) = token_between(playlist, "/video/", "/playlist.m3u8") {
                return Some(token);
            }
        }
        None
    }
}

fn token_between(path: &str, prefix: &str, suffix: &str) -> Option<String> {
    let token = path.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if token.is_empty() || token.contains('/') {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> RawDescriptor {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn explicit_token_wins() {
        let desc = raw(serde_json::json!({
            "type": "document",
            "token": "explicit",
            "pages": "/document/embedded/pages",
        }));
        assert_eq!(desc.derive_token().as_deref(), Some("explicit"));
    }

    #[test]
    fn token_derived_from_pages_path() {
        let desc = raw(serde_json::json!({
            "type": "document",
            "pages": "/document/tok-abc/pages",
        }));
        assert_eq!(desc.derive_token().as_deref(), Some("tok-abc"));
    }

    #[test]
    fn token_derived_from_playlist_path() {
        let desc = raw(serde_json::json!({
            "type": "video",
            "playlist": "/video/tok-xyz/playlist.m3u8",
        }));
        assert_eq!(desc.derive_token().as_deref(), Some("tok-xyz"));
    }

    #[test]
    fn unusable_paths_yield_nothing() {
        assert_eq!(raw(serde_json::json!({})).derive_token(), None);
        let desc = raw(serde_json::json!({ "pages": "/document//pages" }));
        assert_eq!(desc.derive_token(), None);
        let desc = raw(serde_json::json!({ "pages": "/elsewhere/tok/pages" }));
        assert_eq!(desc.derive_token(), None);
        let desc = raw(serde_json::json!({ "pages": "/document/a/b/pages" }));
        assert_eq!(desc.derive_token(), None);
    }

    #[test]
    fn empty_explicit_token_falls_back_to_path() {
        let desc = raw(serde_json::json!({
            "token": "",
            "pages": "/document/tok-abc/pages",
        }));
        assert_eq!(desc.derive_token().as_deref(), Some("tok-abc"));
    }
}
