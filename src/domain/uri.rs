use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file";

/// Identifier of a resource touched by a bulk edit (`scheme:path`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUri(String);

impl ResourceUri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_file_path(path: &Path) -> Self {
        Self(format!("{}://{}", FILE_SCHEME, path.to_string_lossy()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme part, empty when the value has no `scheme:` prefix.
    pub fn scheme(&self) -> &str {
        match self.0.split_once(':') {
            Some((scheme, _)) if is_scheme(scheme) => scheme,
            _ => "",
        }
    }

    /// Path part with the scheme and any `//authority` removed.
    pub fn path(&self) -> &str {
        let rest = match self.0.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => rest,
            _ => return &self.0,
        };
        match rest.strip_prefix("//") {
            Some(after) => after.find('/').map(|idx| &after[idx..]).unwrap_or(""),
            None => rest,
        }
    }

    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.scheme() == FILE_SCHEME {
            Some(PathBuf::from(self.path()))
        } else {
            None
        }
    }

    /// Human label, relative to `root` when the resource lives below it.
    pub fn label(&self, root: Option<&Path>) -> String {
        let Some(path) = self.to_file_path() else {
            return self.0.clone();
        };
        if let Some(root) = root
            && let Ok(relative) = path.strip_prefix(root)
            && !relative.as_os_str().is_empty()
        {
            return relative.to_string_lossy().into_owned();
        }
        path.to_string_lossy().into_owned()
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_scheme_and_path() {
        let uri = ResourceUri::from("file:///work/src/lib.rs");
        assert_eq!(uri.scheme(), "file");
        assert_eq!(uri.path(), "/work/src/lib.rs");
        assert_eq!(uri.to_file_path(), Some(PathBuf::from("/work/src/lib.rs")));

        let untitled = ResourceUri::from("untitled:Untitled-1");
        assert_eq!(untitled.scheme(), "untitled");
        assert_eq!(untitled.path(), "Untitled-1");
        assert!(untitled.to_file_path().is_none());
    }

    #[test]
    fn plain_string_has_no_scheme() {
        let uri = ResourceUri::from("/tmp/a.txt");
        assert_eq!(uri.scheme(), "");
        assert_eq!(uri.path(), "/tmp/a.txt");
    }

    #[test]
    fn label_is_relative_to_root() {
        let uri = ResourceUri::from_file_path(Path::new("/work/src/lib.rs"));
        assert_eq!(uri.label(Some(Path::new("/work"))), "src/lib.rs");
        assert_eq!(uri.label(Some(Path::new("/other"))), "/work/src/lib.rs");
        assert_eq!(uri.label(None), "/work/src/lib.rs");
    }
}
