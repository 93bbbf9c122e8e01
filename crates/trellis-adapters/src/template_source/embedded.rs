//! Template files compiled into the binary.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use trellis_core::{
    application::{ApplicationError, TemplateFile, TemplateSource},
    domain::RelativePath,
    error::TrellisResult,
};

use crate::builtin_blueprints;

/// Thread-safe in-memory template source.
///
/// Clones share the same file table.
#[derive(Debug, Clone)]
pub struct EmbeddedTemplateSource {
    name: String,
    inner: Arc<RwLock<BTreeMap<RelativePath, TemplateFile>>>,
}

impl EmbeddedTemplateSource {
    /// Create a new empty source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// The Rails template files shipped with the binary.
    pub fn rails() -> Self {
        let source = Self::new("builtin:rails");
        if let Ok(mut inner) = source.inner.write() {
            for (path, contents, executable) in builtin_blueprints::RAILS_FILES {
                let file = TemplateFile::new(*contents);
                let file = if *executable { file.executable() } else { file };
                inner.insert(RelativePath::new(*path), file);
            }
        }
        source
    }

    /// Add or replace a file.
    pub fn insert(&self, path: RelativePath, file: TemplateFile) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;
        inner.insert(path, file);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert) of a non-executable file.
    pub fn with_file(self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.insert(RelativePath::new(path), TemplateFile::new(contents));
        }
        self
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateSource for EmbeddedTemplateSource {
    fn read(&self, path: &RelativePath) -> TrellisResult<Option<TemplateFile>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned)?;
        Ok(inner.get(path).cloned())
    }

    fn list(&self, dir: &RelativePath) -> TrellisResult<Vec<RelativePath>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        let mut files = Vec::new();
        for path in inner.keys() {
            let Ok(rest) = path.as_path().strip_prefix(dir.as_path()) else {
                continue;
            };
            if rest.as_os_str().is_empty() {
                continue;
            }
            files.push(RelativePath::try_new(rest)?);
        }
        files.sort();
        Ok(files)
    }

    fn location(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_none_for_unknown_paths() {
        let source = EmbeddedTemplateSource::new("test").with_file("Gemfile", "source");
        assert_eq!(
            source.read(&RelativePath::new("Gemfile")).unwrap(),
            Some(TemplateFile::new("source"))
        );
        assert_eq!(source.read(&RelativePath::new("Rakefile")).unwrap(), None);
    }

    #[test]
    fn list_is_relative_to_the_directory() {
        let source = EmbeddedTemplateSource::new("test")
            .with_file("base/config/boot.rb", "")
            .with_file("base/Rakefile", "")
            .with_file("basement/ignored", "")
            .with_file("Gemfile.j2", "");

        assert_eq!(
            source.list(&RelativePath::new("base")).unwrap(),
            vec![RelativePath::new("Rakefile"), RelativePath::new("config/boot.rb")]
        );
        assert!(source.list(&RelativePath::new("missing")).unwrap().is_empty());
        assert_eq!(source.list(&RelativePath::root()).unwrap().len(), 4);
    }

    #[test]
    fn rails_files_include_an_executable_setup_script() {
        let source = EmbeddedTemplateSource::rails();
        assert!(!source.is_empty());
        let setup = source
            .read(&RelativePath::new("base/bin/setup"))
            .unwrap()
            .expect("bin/setup is embedded");
        assert!(setup.executable);
        assert_eq!(source.location(), "builtin:rails");
    }
}
