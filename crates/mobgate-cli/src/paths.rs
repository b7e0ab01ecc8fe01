use std::path::{Path, PathBuf};

/// Expands a leading `~` to `home`, then makes the path absolute.
///
/// Symlinks and `..` are resolved when the path, or its parent directory,
/// exists.
pub fn resolve_user_path(path: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    };
    let absolute = std::path::absolute(&expanded).unwrap_or(expanded);

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => std::fs::canonicalize(parent)
            .map(|dir| dir.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

/// The current user's home directory, from `HOME`.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilde_expands_to_home() {
        let resolved = resolve_user_path(Path::new("~/builds/app.apk"), Some(Path::new("/home/ci")));
        assert_eq!(resolved, PathBuf::from("/home/ci/builds/app.apk"));
    }

    #[test]
    fn test_tilde_without_home_is_kept() {
        let resolved = resolve_user_path(Path::new("~/app.apk"), None);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("~/app.apk"));
    }

    #[test]
    fn test_relative_becomes_absolute() {
        let resolved = resolve_user_path(Path::new("out/masvs.json"), None);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("out/masvs.json"));
    }

    #[test]
    fn test_parent_segments_and_symlinks_are_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::create_dir(root.join("builds")).unwrap();
        std::fs::write(root.join("app.apk"), b"apk").unwrap();

        let dotted = root.join("builds").join("..").join("app.apk");
        assert_eq!(resolve_user_path(&dotted, None), root.join("app.apk"));

        let missing = root.join("builds").join("..").join("masvs.json");
        assert_eq!(resolve_user_path(&missing, None), root.join("masvs.json"));

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(root.join("builds"), root.join("link")).unwrap();
            let linked = root.join("link").join("report.json");
            assert_eq!(resolve_user_path(&linked, None), root.join("builds").join("report.json"));
        }
    }

    #[test]
    fn test_absolute_is_unchanged() {
        let resolved = resolve_user_path(Path::new("/nonexistent-mobgate/app.ipa"), Some(Path::new("/home/ci")));
        assert_eq!(resolved, PathBuf::from("/nonexistent-mobgate/app.ipa"));
    }
}
