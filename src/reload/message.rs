//! Live Reload Message Protocol
//!
//! JSON messages sent over WebSocket from the dev server to browsers.
//!
//! # Message Types
//!
//! - `connected`: Handshake, carries the server version
//! - `reload`: Trigger full page reload
//! - `css`: Re-fetch one stylesheet without reloading the page

use serde::{Deserialize, Serialize};

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload
    Reload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet update, no reload
    Css {
        /// Stylesheet path as served (e.g. `/css/style.min.css`)
        target: String,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(reason: Option<String>) -> Self {
        Self::Reload { reason }
    }

    pub fn css(target: impl Into<String>) -> Self {
        Self::Css {
            target: target.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let json = ReloadMessage::reload(Some("src/index.html changed".into())).to_json();
        assert_eq!(
            json,
            r#"{"type":"reload","reason":"src/index.html changed"}"#
        );
    }

    #[test]
    fn test_reload_without_reason() {
        assert_eq!(ReloadMessage::reload(None).to_json(), r#"{"type":"reload"}"#);
        assert_eq!(
            ReloadMessage::from_json(r#"{"type":"reload"}"#),
            Some(ReloadMessage::Reload { reason: None })
        );
    }

    #[test]
    fn test_css_message() {
        let json = ReloadMessage::css("/css/style.min.css").to_json();
        assert_eq!(json, r#"{"type":"css","target":"/css/style.min.css"}"#);
    }

    #[test]
    fn test_connected_message() {
        let msg = ReloadMessage::connected();
        let json = msg.to_json();
        assert!(json.starts_with(r#"{"type":"connected","version":""#));
        assert_eq!(ReloadMessage::from_json(&json), Some(msg));
    }

    #[test]
    fn test_from_json_rejects_unknown() {
        assert!(ReloadMessage::from_json(r#"{"type":"patch"}"#).is_none());
        assert!(ReloadMessage::from_json("not json").is_none());
    }
}
