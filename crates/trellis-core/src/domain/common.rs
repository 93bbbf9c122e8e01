use super::DomainError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A filesystem path guaranteed to stay inside whatever root it is joined to.
///
/// Invariant: never absolute, never contains `..`. `.` segments are dropped,
/// so `./config/boot.rb` and `config/boot.rb` compare equal. The empty path
/// denotes the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a new relative path.
    ///
    /// # Panics
    /// Panics if the path is absolute or escapes its root (use `try_new` for
    /// fallible construction). Intended for paths written into blueprint code.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_new(&path) {
            Ok(relative) => relative,
            Err(_) => panic!("RelativePath must be relative and inside its root: {:?}", path),
        }
    }

    /// Fallible constructor.
    pub fn try_new(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(segment) => normalized.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }
        Ok(Self(normalized))
    }

    /// The destination root itself.
    pub fn root() -> Self {
        Self(PathBuf::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Join a segment, maintaining the relative invariant.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        let tail = Self::try_new(segment)?;
        Ok(Self(self.0.join(tail.0)))
    }

    /// Resolve against an absolute (or caller-chosen) root.
    pub fn under(&self, root: &Path) -> PathBuf {
        if self.is_root() {
            root.to_path_buf()
        } else {
            root.join(&self.0)
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Forward-slash rendering, stable across platforms.
    pub fn as_str(&self) -> String {
        self.0
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_absolute_paths() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn rejects_parent_segments() {
        assert!(RelativePath::try_new("config/../../outside").is_err());
    }

    #[test]
    fn drops_current_dir_segments() {
        assert_eq!(
            RelativePath::new("./config/./boot.rb"),
            RelativePath::new("config/boot.rb")
        );
    }

    #[test]
    fn root_resolves_to_the_root_itself() {
        let root = Path::new("/tmp/acme");
        assert_eq!(RelativePath::root().under(root), root.to_path_buf());
        assert_eq!(RelativePath::new(".").under(root), root.to_path_buf());
        assert_eq!(RelativePath::root().to_string(), ".");
    }

    #[test]
    fn join_keeps_invariant() {
        let base = RelativePath::new("app/assets");
        assert_eq!(
            base.join("javascripts/cable.js").unwrap().as_str(),
            "app/assets/javascripts/cable.js"
        );
        assert!(base.join("/abs").is_err());
        assert!(base.join("../up").is_err());
    }

    #[test]
    #[should_panic]
    fn new_panics_on_absolute() {
        RelativePath::new("/abs");
    }
}
