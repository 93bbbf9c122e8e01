//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `trellis-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: destination tree mutations
//!   - `TemplateSource`: blueprint template files
//!   - `TemplateRenderer`: variable substitution and conditional blocks
//!   - `CommandRunner`: post-generation commands
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    CommandOutcome, CommandRunner, Filesystem, TemplateFile, TemplateRenderer, TemplateSource,
};

#[cfg(test)]
pub use output::{MockCommandRunner, MockFilesystem, MockTemplateRenderer, MockTemplateSource};
