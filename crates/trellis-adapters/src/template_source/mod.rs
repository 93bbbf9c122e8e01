//! Template source adapters.
//!
//! A blueprint names its files by paths relative to a template root; these
//! adapters decide where that root lives.

mod directory;
mod embedded;

pub use directory::DirectoryTemplateSource;
pub use embedded::EmbeddedTemplateSource;
