//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string and fragment, trim slashes
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>home</p>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/style.min.css"), "a{}").unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "<p>docs</p>").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let dir = site();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            resolve_path("/css/style.min.css?t=123", dir.path()),
            Some(root.join("css/style.min.css"))
        );
    }

    #[test]
    fn test_resolve_directory_index() {
        let dir = site();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(resolve_path("/", dir.path()), Some(root.join("index.html")));
        assert_eq!(resolve_path("/docs/", dir.path()), Some(root.join("docs/index.html")));
        assert_eq!(resolve_path("/empty", dir.path()), None);
    }

    #[test]
    fn test_resolve_missing() {
        let dir = site();
        assert_eq!(resolve_path("/nope.html", dir.path()), None);
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = site();
        let nested = dir.path().join("docs");
        assert_eq!(resolve_path("/../index.html", &nested), None);
        assert_eq!(resolve_path("/%2e%2e/index.html", &nested), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let dir = site();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        assert_eq!(resolve_path("/link/secret.txt", dir.path()), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/a%20b/c.html?x=1#top"), "a b/c.html");
        assert_eq!(normalize_url("/"), "");
    }
}
