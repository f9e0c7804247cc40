//! HTML minification: parse with tl, re-serialize compactly.
//!
//! # Rules
//!
//! - Comments dropped, whitespace runs collapsed to one space
//! - Whitespace next to block-level boundaries removed
//! - Empty `class`/`id`/`style`/`title`/`lang`/`dir`/`on*` attributes removed
//! - Attributes sorted by name, class names sorted alphabetically
//! - `pre`/`textarea`/`script`/`style` contents copied verbatim; raw-text
//!   bodies are lifted out before parsing so `<` inside them is not markup
//! - A leading doctype becomes `<!doctype html>`

use std::borrow::Cow;

use crate::config::MarkupConfig;
use crate::utils::html::{is_block_element, is_verbatim_element, is_void_element};

/// Attributes dropped when their value is empty.
const DROPPABLE_WHEN_EMPTY: &[&str] = &["class", "id", "style", "title", "lang", "dir"];

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Delimits the index of a lifted raw-text body inside the parsed document.
const RAW_MARKER: char = '\u{1a}';

/// Minify an HTML document.
pub fn minify(html: &str, options: &MarkupConfig) -> Result<String, String> {
    let (prepared, raw_bodies) = lift_raw_text(html);
    let dom = tl::parse(&prepared, tl::ParserOptions::default()).map_err(|e| format!("{e:?}"))?;
    let parser = dom.parser();

    let mut out = String::with_capacity(html.len());
    if starts_with_doctype(html) {
        out.push_str("<!doctype html>");
    }

    let serializer = Serializer {
        parser,
        options,
        raw_bodies: &raw_bodies,
    };
    serializer.write_children(&mut out, dom.children().iter(), true);
    Ok(out)
}

/// Replace the content of every raw-text element with an index marker.
///
/// tl tokenizes `<` inside `script`/`style`, which would split a body like
/// `if (a<b)` into bogus tags. The bodies are restored on serialization.
fn lift_raw_text(html: &str) -> (String, Vec<&str>) {
    let lower = html.to_ascii_lowercase();
    let mut prepared = String::with_capacity(html.len());
    let mut bodies = Vec::new();
    let mut copied = 0;
    let mut pos = 0;

    while let Some(rel) = lower[pos..].find('<') {
        let at = pos + rel;
        let rest = &lower[at..];

        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => {
                    pos = at + end + 3;
                    continue;
                }
                None => break,
            }
        }

        let Some(name) = RAW_TEXT_ELEMENTS
            .iter()
            .find(|name| opens_element(rest, name))
        else {
            pos = at + 1;
            continue;
        };
        let Some(open_len) = opening_tag_end(&html[at..]) else {
            break;
        };

        let body_start = at + open_len;
        let close = format!("</{name}");
        let body_end = lower[body_start..]
            .find(&close)
            .map_or(html.len(), |end| body_start + end);

        prepared.push_str(&html[copied..body_start]);
        prepared.push(RAW_MARKER);
        prepared.push_str(&bodies.len().to_string());
        prepared.push(RAW_MARKER);
        bodies.push(&html[body_start..body_end]);

        copied = body_end;
        pos = body_end;
    }

    prepared.push_str(&html[copied..]);
    (prepared, bodies)
}

/// `lower` starts with the opening tag of `name`.
fn opens_element(lower: &str, name: &str) -> bool {
    lower
        .strip_prefix('<')
        .and_then(|s| s.strip_prefix(name))
        .and_then(|s| s.chars().next())
        .is_some_and(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

fn starts_with_doctype(html: &str) -> bool {
    let html = html.trim_start_matches('\u{feff}').trim_start();
    html.get(..9)
        .is_some_and(|s| s.eq_ignore_ascii_case("<!doctype"))
}

/// Children of one element after comment removal and text merging.
enum Item<'p> {
    Text(String),
    Comment(Cow<'p, str>),
    Tag(&'p tl::HTMLTag<'p>),
}

impl Item<'_> {
    fn is_block(&self) -> bool {
        match self {
            Self::Tag(tag) => is_block_element(&tag_name(tag).to_ascii_lowercase()),
            _ => false,
        }
    }
}

struct Serializer<'p, 'o> {
    parser: &'p tl::Parser<'p>,
    options: &'o MarkupConfig,
    raw_bodies: &'o [&'o str],
}

impl<'p, 'o> Serializer<'p, 'o> {
    fn write_children<'h>(
        &self,
        out: &mut String,
        handles: impl Iterator<Item = &'h tl::NodeHandle>,
        block_parent: bool,
    ) {
        let items = self.collect_items(handles);

        for (i, item) in items.iter().enumerate() {
            match item {
                Item::Text(text) => {
                    let text = if self.options.collapse_whitespace {
                        let prev_block = i.checked_sub(1).map_or(block_parent, |p| items[p].is_block());
                        let next_block = items.get(i + 1).map_or(block_parent, Item::is_block);
                        trim_boundaries(text, prev_block, next_block)
                    } else {
                        text.as_str()
                    };
                    out.push_str(text);
                }
                Item::Comment(comment) => {
                    if comment.starts_with("<!--") {
                        out.push_str(comment);
                    } else {
                        out.push_str("<!--");
                        out.push_str(comment);
                        out.push_str("-->");
                    }
                }
                Item::Tag(tag) => self.write_tag(out, tag),
            }
        }
    }

    /// Resolve handles, dropping comments when configured and merging the
    /// text on either side of a dropped comment.
    fn collect_items<'h>(&self, handles: impl Iterator<Item = &'h tl::NodeHandle>) -> Vec<Item<'p>> {
        let mut items: Vec<Item<'p>> = Vec::new();

        for handle in handles {
            let Some(node) = handle.get(self.parser) else {
                continue;
            };
            match node {
                tl::Node::Tag(tag) => {
                    if !tag_name(tag).starts_with('!') {
                        items.push(Item::Tag(tag));
                    }
                }
                tl::Node::Raw(bytes) => {
                    let raw = bytes.as_utf8_str();
                    if starts_with_doctype(&raw) {
                        continue;
                    }
                    let text = if self.options.collapse_whitespace {
                        collapse_whitespace(&raw)
                    } else {
                        raw.into_owned()
                    };
                    match items.last_mut() {
                        Some(Item::Text(prev)) => {
                            if self.options.collapse_whitespace
                                && prev.ends_with(' ')
                                && text.starts_with(' ')
                            {
                                prev.push_str(&text[1..]);
                            } else {
                                prev.push_str(&text);
                            }
                        }
                        _ => items.push(Item::Text(text)),
                    }
                }
                tl::Node::Comment(bytes) => {
                    if !self.options.remove_comments {
                        items.push(Item::Comment(bytes.as_utf8_str()));
                    }
                }
            }
        }

        items
    }

    fn write_tag(&self, out: &mut String, tag: &tl::HTMLTag<'_>) {
        let name = tag.name().as_utf8_str();
        let lower = name.to_ascii_lowercase();

        out.push('<');
        out.push_str(&name);
        for (key, value) in self.attributes(tag) {
            out.push(' ');
            out.push_str(&key);
            if let Some(value) = value {
                push_attribute_value(out, &value);
            }
        }
        out.push('>');

        if is_void_element(&lower) {
            return;
        }

        if is_verbatim_element(&lower) {
            let raw = tag.raw().as_utf8_str();
            out.push_str(self.restore_raw(inner_raw(&raw, &lower)));
        } else {
            self.write_children(out, tag.children().top().iter(), is_block_element(&lower));
        }

        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }

    /// Original body for a lifted marker, anything else unchanged.
    fn restore_raw<'a>(&self, inner: &'a str) -> &'a str
    where
        'o: 'a,
    {
        inner
            .strip_prefix(RAW_MARKER)
            .and_then(|s| s.strip_suffix(RAW_MARKER))
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.raw_bodies.get(index).copied())
            .unwrap_or(inner)
    }

    /// Attributes after empty-value removal and sorting.
    fn attributes(&self, tag: &tl::HTMLTag<'_>) -> Vec<(String, Option<String>)> {
        let mut attrs: Vec<(String, Option<String>)> = Vec::new();

        for (key, value) in tag.attributes().iter() {
            let key = key.to_string();
            let lower = key.to_ascii_lowercase();
            let mut value = value.map(|v| v.to_string());

            if lower == "class"
                && self.options.sort_class_name
                && let Some(class) = value.as_mut()
            {
                let mut names: Vec<&str> = class.split_whitespace().collect();
                names.sort_unstable();
                names.dedup();
                let sorted = names.join(" ");
                *class = sorted;
            }

            if self.options.remove_empty_attributes
                && is_droppable(&lower)
                && value.as_deref().is_none_or(|v| v.trim().is_empty())
            {
                continue;
            }

            attrs.push((key, value));
        }

        if self.options.sort_attributes {
            attrs.sort_by_cached_key(|(key, _)| key.to_ascii_lowercase());
        }
        attrs
    }
}

fn tag_name<'a>(tag: &'a tl::HTMLTag<'_>) -> Cow<'a, str> {
    tag.name().as_utf8_str()
}

fn is_droppable(name: &str) -> bool {
    DROPPABLE_WHEN_EMPTY.contains(&name) || name.starts_with("on")
}

/// Quote with `"`, fall back to `'`, escape `"` when both appear.
fn push_attribute_value(out: &mut String, value: &str) {
    out.push('=');
    if !value.contains('"') {
        out.push('"');
        out.push_str(value);
        out.push('"');
    } else if !value.contains('\'') {
        out.push('\'');
        out.push_str(value);
        out.push('\'');
    } else {
        out.push('"');
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn trim_boundaries(text: &str, prev_block: bool, next_block: bool) -> &str {
    let text = if prev_block { text.trim_start() } else { text };
    if next_block { text.trim_end() } else { text }
}

/// Content between the opening and closing tag of a raw element.
fn inner_raw<'a>(raw: &'a str, name: &str) -> &'a str {
    let Some(start) = opening_tag_end(raw) else {
        return "";
    };
    let inner = &raw[start..];

    let close_len = name.len() + 3;
    if inner.len() >= close_len {
        let split = inner.len() - close_len;
        if inner.is_char_boundary(split) {
            let (body, closing) = inner.split_at(split);
            if closing.starts_with("</") && closing[2..close_len - 1].eq_ignore_ascii_case(name) {
                return body;
            }
        }
    }
    inner
}

/// Byte offset just past the `>` closing the opening tag, honoring quotes.
fn opening_tag_end(raw: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in raw.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min(html: &str) -> String {
        minify(html, &MarkupConfig::default()).unwrap()
    }

    #[test]
    fn test_document() {
        let html = "<!DOCTYPE html>\n<html>\n  <head>\n    <title> Hi </title>\n  </head>\n  <body>\n    <!-- nav -->\n    <p class=\"b a\" id=\"\">Hello   <b>world</b> !</p>\n  </body>\n</html>\n";
        assert_eq!(
            min(html),
            "<!doctype html><html><head><title>Hi</title></head><body><p class=\"a b\">Hello <b>world</b> !</p></body></html>"
        );
    }

    #[test]
    fn test_no_comments_or_whitespace_runs() {
        let html = "<div>\n\n   <span>a</span>  <!-- x -->  <span>b</span>\n\t</div>\n<!-- trailing -->\n";
        let out = min(html);
        assert!(!out.contains("<!--"));
        assert!(!out.contains("  "));
        assert_eq!(out, "<div><span>a</span> <span>b</span></div>");
    }

    #[test]
    fn test_verbatim_elements() {
        let html = "<div><pre>  a\n   b </pre><script>var x = 1;  var y = 2;</script></div>";
        assert_eq!(
            min(html),
            "<div><pre>  a\n   b </pre><script>var x = 1;  var y = 2;</script></div>"
        );
    }

    #[test]
    fn test_attributes_sorted_and_quoted() {
        let html = "<a title='say \"hi\"' href=\"/x\" data-b=\"1\" onclick=\"\">x</a>";
        assert_eq!(min(html), "<a data-b=\"1\" href=\"/x\" title='say \"hi\"'>x</a>");
    }

    #[test]
    fn test_void_elements() {
        assert_eq!(
            min("<p>a<br/>b<img src=\"x.png\"></p>"),
            "<p>a<br>b<img src=\"x.png\"></p>"
        );
    }

    #[test]
    fn test_boolean_attribute_kept() {
        assert_eq!(min("<input disabled type=\"text\">"), "<input disabled type=\"text\">");
    }

    #[test]
    fn test_options_disabled() {
        let options = MarkupConfig {
            remove_comments: false,
            sort_attributes: false,
            sort_class_name: false,
            remove_empty_attributes: false,
            ..MarkupConfig::default()
        };
        let out = minify("<div class=\"b a\"><!-- keep --></div>", &options).unwrap();
        assert_eq!(out, "<div class=\"b a\"><!-- keep --></div>");
    }

    #[test]
    fn test_deterministic() {
        let html = "<ul class=\"z y\">\n  <li id=\"a\" class=\"q p\">1</li>\n  <li>2</li>\n</ul>";
        assert_eq!(min(html), min(html));
        assert_eq!(
            min(html),
            "<ul class=\"y z\"><li class=\"p q\" id=\"a\">1</li><li>2</li></ul>"
        );
    }

    #[test]
    fn test_script_with_less_than() {
        let html = "<div><script>if (a<b) { x(); }</script><p>z</p></div>";
        assert_eq!(min(html), html);
    }

    #[test]
    fn test_script_with_markup_string() {
        let html = "<script>var s = '<div>';</script><p>z</p>";
        assert_eq!(min(html), html);
    }

    #[test]
    fn test_style_and_textarea_bodies() {
        let html = "<head><STYLE media=\"all\">a>b{color:red}</STYLE></head><textarea>1 < 2\n  <b></textarea>";
        assert_eq!(
            min(html),
            "<head><STYLE media=\"all\">a>b{color:red}</STYLE></head><textarea>1 < 2\n  <b></textarea>"
        );
    }

    #[test]
    fn test_lift_raw_text() {
        let (prepared, bodies) = lift_raw_text("<!-- <script>x</script> --><script type=\"a>b\">1<2</script>");
        assert_eq!(bodies, vec!["1<2"]);
        assert_eq!(prepared, "<!-- <script>x</script> --><script type=\"a>b\">\u{1a}0\u{1a}</script>");
    }

    #[test]
    fn test_inner_raw() {
        assert_eq!(inner_raw("<script type=\"a>b\">x<y</script>", "script"), "x<y");
        assert_eq!(inner_raw("<STYLE>a{}</STYLE>", "style"), "a{}");
        assert_eq!(inner_raw("<pre>unclosed", "pre"), "unclosed");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\n\n"), " ");
    }
}
