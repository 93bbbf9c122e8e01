//! Template files read from a directory on disk.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use trellis_core::{
    application::{ApplicationError, TemplateFile, TemplateSource},
    domain::RelativePath,
    error::TrellisResult,
};

/// Reads templates from `root`, so a blueprint's files can be edited without
/// rebuilding.
///
/// The directory does not need to exist when the source is created; missing
/// files surface as `Ok(None)` from [`TemplateSource::read`].
#[derive(Debug, Clone)]
pub struct DirectoryTemplateSource {
    root: PathBuf,
}

impl DirectoryTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirectoryTemplateSource {
    fn read(&self, path: &RelativePath) -> TrellisResult<Option<TemplateFile>> {
        let full = path.under(&self.root);
        if !full.is_file() {
            return Ok(None);
        }
        let contents = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ApplicationError::filesystem(&full, e).into()),
        };
        Ok(Some(TemplateFile {
            contents,
            executable: is_executable(&full),
        }))
    }

    #[instrument(skip(self), fields(root = %self.root.display(), dir = %dir))]
    fn list(&self, dir: &RelativePath) -> TrellisResult<Vec<RelativePath>> {
        let base = dir.under(&self.root);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::filesystem(&base, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&base)
                .map_err(|e| ApplicationError::filesystem(entry.path(), e))?;
            files.push(RelativePath::try_new(relative)?);
        }
        files.sort();

        debug!(count = files.len(), "listed template directory");
        Ok(files)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
