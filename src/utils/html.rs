//! HTML element classification used by the markup minifier.
//!
//! - `is_void_element()` - Elements without a closing tag (br, img, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `is_preformatted_element()` - Whitespace-significant elements (pre, textarea)
//! - `is_block_element()` - Elements whose surrounding whitespace is insignificant

/// Check if an HTML tag is a void element (no closing tag).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content is not HTML).
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if tag content keeps its whitespace as written.
#[inline]
pub fn is_preformatted_element(tag: &str) -> bool {
    matches!(tag, "pre" | "textarea")
}

/// Contents of these elements are copied through untouched.
#[inline]
pub fn is_verbatim_element(tag: &str) -> bool {
    is_raw_text_element(tag) || is_preformatted_element(tag)
}

/// Check if whitespace next to this tag can be dropped.
///
/// Covers block-level flow content plus document and metadata elements,
/// none of which render surrounding whitespace.
#[inline]
pub fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "base"
            | "blockquote"
            | "body"
            | "canvas"
            | "caption"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dialog"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "li"
            | "link"
            | "main"
            | "menu"
            | "meta"
            | "nav"
            | "noscript"
            | "ol"
            | "optgroup"
            | "option"
            | "p"
            | "pre"
            | "script"
            | "section"
            | "style"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "template"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "ul"
            | "video"
    )
}
