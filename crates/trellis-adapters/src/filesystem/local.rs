//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use walkdir::WalkDir;

use trellis_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{TrellisError, TrellisResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn append_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| map_io_error(path, e, "open file for append"))?;
        file.write_all(content)
            .map_err(|e| map_io_error(path, e, "append to file"))
    }

    fn read_file(&self, path: &Path) -> TrellisResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> TrellisResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata =
                std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
            let mut perms = metadata.permissions();
            let mode = perms.mode();
            perms.set_mode(if executable { mode | 0o111 } else { mode & !0o111 });
            std::fs::set_permissions(path, perms)
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(windows)]
        {
            // Windows doesn't have executable bit in the same way
            let _ = (path, executable);
        }
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::metadata(path)
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        }
        #[cfg(windows)]
        {
            let _ = path;
            false
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_file(&self, path: &Path) -> TrellisResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        std::fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        let mut directories = Vec::new();

        for entry in WalkDir::new(from).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::filesystem(from, e))?;
            let Ok(relative) = entry.path().strip_prefix(from) else {
                continue;
            };
            let target = to.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                std::fs::create_dir_all(&target)
                    .map_err(|e| map_io_error(&target, e, "create directory"))?;
                directories.push((entry.path().to_path_buf(), target));
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), &target)
                    .map_err(|e| map_io_error(entry.path(), e, "copy file"))?;
            }
        }

        // Deepest first, so a read-only directory is filled before it is locked.
        for (source, target) in directories.into_iter().rev() {
            let perms = std::fs::metadata(&source)
                .map_err(|e| map_io_error(&source, e, "get metadata"))?
                .permissions();
            std::fs::set_permissions(&target, perms)
                .map_err(|e| map_io_error(&target, e, "set permissions"))?;
        }
        Ok(())
    }
}

/// Recreate `link` at `target` pointing where the original points.
fn copy_symlink(link: &Path, target: &Path) -> TrellisResult<()> {
    let pointee = std::fs::read_link(link).map_err(|e| map_io_error(link, e, "read link"))?;

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(&pointee, target);
    #[cfg(windows)]
    let result = if link.is_dir() {
        std::os::windows::fs::symlink_dir(&pointee, target)
    } else {
        std::os::windows::fs::symlink_file(&pointee, target)
    };

    result.map_err(|e| map_io_error(target, e, "create symlink"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> TrellisError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn write_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = dir.path().join("config/boot.rb");

        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write_file(&path, b"require \"bundler/setup\"\n").unwrap();
        fs.append_file(&path, b"require \"dotenv\"\n").unwrap();

        assert_eq!(
            fs.read_file(&path).unwrap(),
            b"require \"bundler/setup\"\nrequire \"dotenv\"\n"
        );
        assert!(fs.is_file(&path));
        assert!(!fs.is_file(dir.path()));
    }

    #[test]
    fn append_to_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .append_file(&dir.path().join("missing.rb"), b"x")
            .unwrap_err();
        assert!(err.to_string().contains("missing.rb"));
    }

    #[test]
    fn copy_tree_keeps_nested_files_and_empty_directories() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = dir.path().join("acme");
        let to = dir.path().join("copy");
        fs.create_dir_all(&from.join("config/initializers")).unwrap();
        fs.create_dir_all(&from.join("tmp/cache")).unwrap();
        fs.write_file(&from.join("Gemfile"), b"source").unwrap();
        fs.write_file(&from.join("config/initializers/babel.rb"), b"babel")
            .unwrap();
        fs.create_dir_all(&to).unwrap();

        fs.copy_tree(&from, &to).unwrap();

        assert_eq!(fs.read_file(&to.join("Gemfile")).unwrap(), b"source");
        assert_eq!(
            fs.read_file(&to.join("config/initializers/babel.rb")).unwrap(),
            b"babel"
        );
        assert!(to.join("tmp/cache").is_dir());
        assert!(fs.exists(&from.join("Gemfile")));
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_recreates_symlinks_and_modes() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = dir.path().join("acme");
        let to = dir.path().join("copy");
        fs.create_dir_all(&from.join("bin")).unwrap();
        fs.write_file(&from.join("bin/setup"), b"#!/bin/sh\n").unwrap();
        fs.set_permissions(&from.join("bin/setup"), true).unwrap();
        std::os::unix::fs::symlink("bin/setup", from.join("setup")).unwrap();
        std::os::unix::fs::symlink("nowhere", from.join("dangling")).unwrap();
        fs.create_dir_all(&to).unwrap();

        fs.copy_tree(&from, &to).unwrap();

        assert!(fs.is_executable(&to.join("bin/setup")));
        let link = std::fs::symlink_metadata(to.join("setup")).unwrap();
        assert!(link.file_type().is_symlink());
        assert_eq!(
            std::fs::read_link(to.join("setup")).unwrap(),
            PathBuf::from("bin/setup")
        );
        assert!(
            std::fs::symlink_metadata(to.join("dangling"))
                .unwrap()
                .file_type()
                .is_symlink()
        );
    }

    #[test]
    fn rename_moves_directories() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = dir.path().join(".acme.staging");
        let to = dir.path().join("acme");
        fs.create_dir_all(&from).unwrap();
        fs.write_file(&from.join("Gemfile"), b"source").unwrap();

        fs.rename(&from, &to).unwrap();

        assert!(!fs.exists(&from));
        assert_eq!(fs.read_file(&to.join("Gemfile")).unwrap(), b"source");
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_round_trips() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = dir.path().join("setup");
        fs.write_file(&path, b"#!/bin/sh\n").unwrap();

        assert!(!fs.is_executable(&path));
        fs.set_permissions(&path, true).unwrap();
        assert!(fs.is_executable(&path));
        fs.set_permissions(&path, false).unwrap();
        assert!(!fs.is_executable(&path));
    }
}
