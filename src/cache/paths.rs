// Cache path utilities.
// Resolves the cache directory and maps cache keys onto file names inside it.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Platform cache directory (~/.cache/alfred-filters on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "alfred-filters").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Pick the cache directory: the configured one, else the platform cache
/// directory, else the OS temp directory.
pub fn resolve_dir(configured: Option<PathBuf>) -> PathBuf {
    configured
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(default_cache_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Path of the file holding `key` inside `dir`.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(sanitize_name(key))
}

/// Path of the scratch file used while `key` is being written.
pub fn temp_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!(".{}.tmp", sanitize_name(key)))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => format!("_{}", cleaned),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("owner:name"), "owner_name");
        assert_eq!(sanitize_name("dom~18.data"), "dom~18.data");
        assert_eq!(sanitize_name(".."), "_..");
        assert_eq!(sanitize_name(""), "_");
    }

    #[test]
    fn test_entry_paths_stay_inside_dir() {
        let dir = Path::new("/cache");

        assert_eq!(
            entry_path(dir, "octocat-2.json"),
            PathBuf::from("/cache/octocat-2.json")
        );
        assert_eq!(
            entry_path(dir, "../escape"),
            PathBuf::from("/cache/.._escape")
        );
        assert_eq!(
            temp_path(dir, "octocat-2.json"),
            PathBuf::from("/cache/.octocat-2.json.tmp")
        );
    }

    #[test]
    fn test_resolve_dir_prefers_configured() {
        let dir = resolve_dir(Some(PathBuf::from("/tmp/workflow-cache")));
        assert_eq!(dir, PathBuf::from("/tmp/workflow-cache"));
    }

    #[test]
    fn test_resolve_dir_ignores_empty_setting() {
        let dir = resolve_dir(Some(PathBuf::new()));
        assert!(!dir.as_os_str().is_empty());
    }
}
