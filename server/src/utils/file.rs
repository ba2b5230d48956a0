//! File path helpers

use std::path::PathBuf;

/// Resolve a user-supplied config path to an absolute path.
///
/// `~` and `~/...` expand to the home directory; relative paths are joined
/// onto the current working directory. The path is not canonicalized.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        assert_eq!(
            expand_path("/etc/olapscope.json"),
            PathBuf::from("/etc/olapscope.json")
        );
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(
            expand_path("  /srv/olapscope.json "),
            PathBuf::from("/srv/olapscope.json")
        );
    }

    #[test]
    fn test_expand_path_relative() {
        let result = expand_path("conf/olapscope.json");
        assert!(result.is_absolute());
        assert!(result.ends_with("conf/olapscope.json"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.olapscope/olapscope.json");
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".olapscope/olapscope.json"));
        if let Some(home) = dirs::home_dir() {
            assert!(result.starts_with(home));
        }
    }

    #[test]
    fn test_expand_path_tilde_only() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_expand_path_tilde_user_not_expanded() {
        let result = expand_path("~other/x.json");
        assert!(result.ends_with("~other/x.json"));
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        let result = expand_path("   ");
        assert!(result.is_absolute());
    }
}
