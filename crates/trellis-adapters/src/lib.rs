//! Infrastructure adapters for Trellis.
//!
//! This crate implements the ports defined in `trellis-core::application::ports`.
//! It contains all external dependencies and I/O operations, plus the
//! built-in blueprints and their template files.

pub mod builtin_blueprints;
pub mod command;
pub mod filesystem;
pub mod renderer;
pub mod template_source;

// Re-export commonly used adapters
pub use command::{
    ProcessCommandRunner, RecordedCommand, RecordingCommandRunner, SkippingCommandRunner,
};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::MiniJinjaRenderer;
pub use template_source::{DirectoryTemplateSource, EmbeddedTemplateSource};
