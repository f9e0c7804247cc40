//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/site/src/sass/   ← cwd
/// /home/user/site/assetflow.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_start_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("assetflow.toml"), "").unwrap();

        let found = find_config_file(Path::new("assetflow.toml"), dir.path());
        assert_eq!(found, Some(dir.path().join("assetflow.toml")));
    }

    #[test]
    fn test_find_config_walks_upward() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("assetflow.toml"), "").unwrap();
        let nested = dir.path().join("src").join("sass");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(Path::new("assetflow.toml"), &nested);
        assert_eq!(found, Some(dir.path().join("assetflow.toml")));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = TempDir::new().unwrap();
        let found = find_config_file(Path::new("no-such-config-7f3a.toml"), dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_find_config_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());

        std::fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
