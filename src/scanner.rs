use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PublishError;

/// Set of dotted file extensions (".html") that restrict rewriting.
/// An empty filter selects every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter(BTreeSet<String>);

impl ExtensionFilter {
    /// Build a filter from `--replace-in` values, with or without the leading dot
    pub fn from_args<S: AsRef<str>>(values: &[S]) -> Self {
        let extensions = values
            .iter()
            .map(AsRef::as_ref)
            .map(|v| v.strip_prefix('.').unwrap_or(v))
            .filter(|v| !v.is_empty())
            .map(|v| format!(".{v}"))
            .collect();
        Self(extensions)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dotted extension is in the set
    pub fn contains(&self, dotted: &str) -> bool {
        self.0.contains(dotted)
    }

    /// Check if a file is selected; matching is case-sensitive
    pub fn matches(&self, path: &Path) -> bool {
        if self.is_empty() {
            return true;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.0.contains(&format!(".{ext}")),
            None => false,
        }
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", joined.join(" "))
    }
}

/// Collect the regular files under `root` that the filter selects.
///
/// Symlinks are not followed and never selected: renaming a rewritten file over a
/// link would replace the link rather than its target.
#[must_use = "this returns the candidate files which should be rewritten"]
pub fn collect_candidates(
    root: &Path,
    filter: &ExtensionFilter,
) -> Result<Vec<PathBuf>, PublishError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        if filter.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
