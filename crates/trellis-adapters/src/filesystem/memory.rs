//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use trellis_core::{
    application::{ApplicationError, ports::Filesystem},
    error::TrellisResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle while the
/// service owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_ancestors(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parents (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                inner.add_ancestors(parent);
            }
            inner
                .files
                .insert(path.to_path_buf(), content.as_ref().to_vec());
        }
        self
    }

    /// A file's content as UTF-8 (testing helper).
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every file path, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Files under `root`, keyed by their path relative to it.
    pub fn snapshot(&self, root: impl AsRef<Path>) -> BTreeMap<PathBuf, Vec<u8>> {
        let root = root.as_ref();
        self.inner
            .read()
            .map(|inner| {
                inner
                    .files
                    .iter()
                    .filter_map(|(path, bytes)| {
                        path.strip_prefix(root)
                            .ok()
                            .map(|rel| (rel.to_path_buf(), bytes.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
            inner.executables.clear();
        }
    }

    fn read_guard(&self) -> TrellisResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned)?)
    }

    fn write_guard(&self) -> TrellisResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?)
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        if inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem(path, "a file exists at this path").into());
        }
        inner.add_ancestors(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;

        if !inner.parent_exists(path) {
            return Err(ApplicationError::filesystem(path, "Parent directory does not exist").into());
        }
        if inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "a directory exists at this path").into());
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn append_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        match inner.files.get_mut(path) {
            Some(existing) => {
                existing.extend_from_slice(content);
                Ok(())
            }
            None => Err(ApplicationError::filesystem(path, "No such file").into()),
        }
    }

    fn read_file(&self, path: &Path) -> TrellisResult<Vec<u8>> {
        let inner = self.read_guard()?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file").into())
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem(path, "No such file").into());
        }

        if executable {
            inner.executables.insert(path.to_path_buf());
        } else {
            inner.executables.remove(path);
        }

        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.executables.contains(path))
            .unwrap_or(false)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path))
            .unwrap_or(false)
    }

    fn remove_file(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        if inner.files.remove(path).is_none() {
            return Err(ApplicationError::filesystem(path, "No such file").into());
        }
        inner.executables.remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.executables.retain(|p| !p.starts_with(path));

        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.directories.contains(from) && !inner.files.contains_key(from) {
            return Err(ApplicationError::filesystem(from, "No such file or directory").into());
        }

        let moved = |p: &PathBuf| match p.strip_prefix(from) {
            Ok(rest) if rest.as_os_str().is_empty() => Some(to.to_path_buf()),
            Ok(rest) => Some(to.join(rest)),
            Err(_) => None,
        };

        let (old_files, kept_files): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut inner.files)
            .into_iter()
            .partition(|(p, _)| p.starts_with(from));
        inner.files = kept_files;
        for (path, bytes) in old_files {
            if let Some(new) = moved(&path) {
                inner.files.insert(new, bytes);
            }
        }

        let old_dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for dir in old_dirs {
            inner.directories.remove(&dir);
            if let Some(new) = moved(&dir) {
                inner.directories.insert(new);
            }
        }
        if let Some(parent) = to.parent() {
            inner.add_ancestors(parent);
        }

        let old_exec: Vec<PathBuf> = inner
            .executables
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for path in old_exec {
            inner.executables.remove(&path);
            if let Some(new) = moved(&path) {
                inner.executables.insert(new);
            }
        }

        Ok(())
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.directories.contains(from) {
            return Err(ApplicationError::filesystem(from, "No such directory").into());
        }

        let relocated = |p: &PathBuf| p.strip_prefix(from).ok().map(|rest| to.join(rest));

        let files: Vec<(PathBuf, Vec<u8>)> = inner
            .files
            .iter()
            .filter_map(|(p, bytes)| relocated(p).map(|new| (new, bytes.clone())))
            .collect();
        let directories: Vec<PathBuf> = inner.directories.iter().filter_map(relocated).collect();
        let executables: Vec<PathBuf> = inner.executables.iter().filter_map(relocated).collect();

        inner.add_ancestors(to);
        for dir in directories {
            inner.add_ancestors(&dir);
        }
        inner.files.extend(files);
        inner.executables.extend(executables);
        Ok(())
    }
}
