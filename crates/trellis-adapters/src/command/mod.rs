//! External command runner adapters.

mod process;
mod recording;

pub use process::ProcessCommandRunner;
pub use recording::{RecordedCommand, RecordingCommandRunner, SkippingCommandRunner};
