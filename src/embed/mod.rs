//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (livereload.js)
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the dev server answers with the live reload client.
    pub const LIVERELOAD_URL: &str = "/__assetflow/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETFLOW_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client (minified at build time) with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

    /// Script tag injected into served HTML pages.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" defer></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_livereload_js_with_port() {
        let rendered = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35730 });
        assert!(rendered.contains("35730"));
        assert!(!rendered.contains("__ASSETFLOW_WS_PORT__"));
        assert!(rendered.contains("WebSocket"));
    }

    #[test]
    fn test_script_tag() {
        let tag = script_tag();
        assert!(tag.contains(LIVERELOAD_URL));
        assert!(tag.starts_with("<script"));
    }
}
