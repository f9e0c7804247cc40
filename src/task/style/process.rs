//! Stylesheet post-processing with lightningcss: prefix, minify, source map.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::config::section::style::parse_browser_version;

/// Minified stylesheet plus its source map JSON.
pub struct ProcessedCss {
    pub code: String,
    pub map: String,
}

/// One compiled entry: the name recorded in the source map and its CSS.
pub struct EntryCss {
    pub name: String,
    pub css: String,
}

/// Result of bundling entries. `output` is `None` when every entry was rejected.
pub struct Bundle {
    pub output: Option<ProcessedCss>,
    /// Index into the input entries plus the parse error.
    pub rejected: Vec<(usize, anyhow::Error)>,
}

/// Build prefixer targets from `[style.targets]`, ignoring unknown entries.
pub fn browser_targets(targets: &BTreeMap<String, String>) -> Targets {
    let mut browsers = Browsers::default();
    for (name, version) in targets {
        let Some(version) = parse_browser_version(version) else {
            continue;
        };
        let slot = match name.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            _ => continue,
        };
        *slot = Some(version);
    }
    Targets::from(browsers)
}

/// Prefix and minify `entries` into one stylesheet with a source map.
///
/// Each entry is parsed on its own; one that fails is reported in
/// [`Bundle::rejected`] and left out. `@import` rules of the remaining
/// entries are hoisted ahead of every other rule.
pub fn bundle(entries: &[EntryCss], targets: Targets) -> Result<Bundle> {
    let mut imports = Vec::new();
    let mut rules = Vec::new();
    let mut kept: Vec<&EntryCss> = Vec::new();
    let mut rejected = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let options = ParserOptions {
            filename: entry.name.clone(),
            source_index: kept.len() as u32,
            ..ParserOptions::default()
        };
        match StyleSheet::parse(&entry.css, options) {
            Ok(sheet) => {
                kept.push(entry);
                for rule in sheet.rules.0 {
                    match rule {
                        CssRule::Import(_) => imports.push(rule),
                        _ => rules.push(rule),
                    }
                }
            }
            Err(e) => rejected.push((index, anyhow!("{e}"))),
        }
    }

    if kept.is_empty() {
        return Ok(Bundle {
            output: None,
            rejected,
        });
    }

    imports.append(&mut rules);
    let sources = kept.iter().map(|entry| entry.name.clone()).collect();
    let mut sheet = StyleSheet::new(sources, CssRuleList(imports), ParserOptions::default());

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let mut source_map = SourceMap::new("/");
    for (index, entry) in kept.iter().enumerate() {
        source_map.add_source(&entry.name);
        source_map
            .set_source_content(index, &entry.css)
            .map_err(|e| anyhow!("{e:?}"))?;
    }

    let code = sheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(&mut source_map),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?
        .code;

    let map = source_map.to_json(None).map_err(|e| anyhow!("{e:?}"))?;
    Ok(Bundle {
        output: Some(ProcessedCss { code, map }),
        rejected,
    })
}
