//! Advisory check for env files that git would commit

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};

/// Name fragments of env files meant to be committed
const SHAREABLE_MARKERS: [&str; 3] = ["example", "sample", "template"];

fn is_shareable(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| SHAREABLE_MARKERS.iter().any(|m| name.contains(m)))
}

fn build_matcher(root: &Path) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(root.join(".gitignore")) {
        tracing::debug!(error = %err, "no usable .gitignore at project root");
    }
    match builder.build() {
        Ok(matcher) => Some(matcher),
        Err(err) => {
            tracing::warn!(error = %err, "could not build .gitignore matcher");
            None
        }
    }
}

/// Path relative to `root`, or `None` when it lies outside it
fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    let relative = if path.is_absolute() {
        path.strip_prefix(root).ok()?.to_path_buf()
    } else {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    if relative.components().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }
    Some(relative)
}

/// Existing env files under `root` that its `.gitignore` does not ignore.
/// Example files and files outside `root` are never reported.
pub fn unignored_files<'a>(root: &Path, paths: impl IntoIterator<Item = &'a Path>) -> Vec<PathBuf> {
    let Some(matcher) = build_matcher(root) else {
        return Vec::new();
    };

    paths
        .into_iter()
        .filter(|path| path.is_file() && !is_shareable(path))
        .filter(|path| match relative_to(root, path) {
            Some(relative) => !matcher
                .matched_path_or_any_parents(&relative, false)
                .is_ignore(),
            None => false,
        })
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_only_unignored_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(".gitignore"), ".env.local\nsecrets/\n").unwrap();
        std::fs::create_dir(root.join("secrets")).unwrap();
        for name in [".env", ".env.local", ".env.example", "secrets/.env"] {
            std::fs::write(root.join(name), "A=1\n").unwrap();
        }

        let candidates = [
            root.join(".env"),
            root.join(".env.local"),
            root.join(".env.example"),
            root.join("secrets/.env"),
            root.join(".env.missing"),
        ];
        let flagged = unignored_files(root, candidates.iter().map(PathBuf::as_path));
        assert_eq!(flagged, vec![root.join(".env")]);
    }

    #[test]
    fn test_without_gitignore_everything_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let env = dir.path().join(".env");
        std::fs::write(&env, "A=1\n").unwrap();
        let flagged = unignored_files(dir.path(), [env.as_path()]);
        assert_eq!(flagged, vec![env]);
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/project");
        assert_eq!(relative_to(root, Path::new("/project/.env")), Some(PathBuf::from(".env")));
        assert_eq!(relative_to(root, Path::new("./.env")), Some(PathBuf::from(".env")));
        assert_eq!(relative_to(root, Path::new("/elsewhere/.env")), None);
        assert_eq!(relative_to(root, Path::new("../.env")), None);
    }
}
