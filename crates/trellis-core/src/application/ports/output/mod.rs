//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `trellis-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{Bindings, CommandLine, RelativePath};
use crate::error::TrellisResult;

/// Port for destination filesystem operations.
///
/// Implemented by:
/// - `trellis_adapters::filesystem::LocalFilesystem` (production)
/// - `trellis_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Every destination mutation the executor performs goes through here.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()>;

    /// Append content to an existing file.
    fn append_file(&self, path: &Path, content: &[u8]) -> TrellisResult<()>;

    fn read_file(&self, path: &Path) -> TrellisResult<Vec<u8>>;

    /// Set or clear the executable bit.
    fn set_permissions(&self, path: &Path, executable: bool) -> TrellisResult<()>;

    fn is_executable(&self, path: &Path) -> bool;

    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn remove_file(&self, path: &Path) -> TrellisResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()>;

    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()>;

    /// Copy everything below `from` into `to`: files with their permission
    /// bits, empty directories, and symlinks as symlinks.
    fn copy_tree(&self, from: &Path, to: &Path) -> TrellisResult<()>;
}

/// One file read from a template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub contents: Vec<u8>,
    pub executable: bool,
}

impl TemplateFile {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
            executable: false,
        }
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

/// Port for reading a blueprint's template files.
///
/// Implemented by:
/// - `trellis_adapters::template_source::EmbeddedTemplateSource` (built into the binary)
/// - `trellis_adapters::template_source::DirectoryTemplateSource` (a directory on disk)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateSource: Send + Sync {
    /// Read one file; `Ok(None)` when it does not exist.
    fn read(&self, path: &RelativePath) -> TrellisResult<Option<TemplateFile>>;

    /// Every file below `dir`, relative to `dir`, sorted. Empty when `dir`
    /// holds no files.
    fn list(&self, dir: &RelativePath) -> TrellisResult<Vec<RelativePath>>;

    /// Human-readable origin, for logs.
    fn location(&self) -> String;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `trellis_adapters::renderer::MiniJinjaRenderer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` (named `name` in diagnostics) with `bindings`.
    ///
    /// Must fail with `UndefinedVariable` when the template references a
    /// name that `bindings` does not define.
    fn render(&self, name: &str, template: &str, bindings: &Bindings) -> TrellisResult<String>;
}

/// Successful command completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub code: i32,
}

impl CommandOutcome {
    pub const fn success() -> Self {
        Self { code: 0 }
    }
}

/// Port for running external commands.
///
/// Implemented by:
/// - `trellis_adapters::command::ProcessCommandRunner` (spawns processes)
/// - `trellis_adapters::command::RecordingCommandRunner` (testing)
/// - `trellis_adapters::command::SkippingCommandRunner` (`--skip-commands`)
///
/// A non-zero exit is an error (`CommandExecution`), never an `Ok`.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandLine, working_dir: &Path) -> TrellisResult<CommandOutcome>;
}
