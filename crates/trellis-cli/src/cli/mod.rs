//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! and help text.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "trellis",
    bin_name = "trellis",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Rails application scaffolding",
    long_about = "Trellis generates a Rails application tree from an ordered, \
                  guarded pipeline of file operations.",
    after_help = "EXAMPLES:\n\
        \x20 trellis new acme --database postgresql\n\
        \x20 trellis new ./apps/shop --database sqlite3 --skip-test-unit --staged\n\
        \x20 trellis steps --database mysql --skip-action-cable\n\
        \x20 trellis completions bash > /usr/share/bash-completion/completions/trellis",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new Rails application.
    #[command(
        visible_alias = "n",
        about = "Create a new Rails application",
        after_help = "EXAMPLES:\n\
            \x20 trellis new acme --database postgresql\n\
            \x20 trellis new acme --skip-active-record --skip-commands\n\
            \x20 trellis new acme --options options.toml --dry-run"
    )]
    New(NewArgs),

    /// Show the pipeline and which steps would run.
    #[command(
        about = "Show pipeline steps",
        after_help = "EXAMPLES:\n\
            \x20 trellis steps\n\
            \x20 trellis steps --database sqlite3 --skip-javascript --skip-action-cable\n\
            \x20 trellis steps --options options.json --output-format json"
    )]
    Steps(StepsArgs),

    /// Initialise a Trellis configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 trellis init           # default location\n\
            \x20 trellis init --local   # .trellis.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 trellis completions bash > ~/.local/share/bash-completion/completions/trellis\n\
            \x20 trellis completions zsh  > ~/.zfunc/_trellis\n\
            \x20 trellis completions fish > ~/.config/fish/completions/trellis.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Trellis configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 trellis config get defaults.database\n\
            \x20 trellis config list"
    )]
    Config(ConfigCommands),
}

// ── Scaffold options ──────────────────────────────────────────────────────────

/// The scaffold options, as flags.  Anything not given here falls back to
/// the `--options` file, then to the `[defaults]` config section.
#[derive(Debug, Default, Args)]
pub struct OptionArgs {
    /// Application name (default: the destination directory's name).
    #[arg(long = "app-name", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Storage backend.
    #[arg(
        short = 'd',
        long = "database",
        value_name = "BACKEND",
        help = "Storage backend: sqlite3, mysql, postgresql (or postgres)"
    )]
    pub database: Option<String>,

    #[arg(long = "skip-active-record", help = "Skip the database layer")]
    pub skip_active_record: bool,

    #[arg(long = "skip-test-unit", help = "Skip the test scaffold")]
    pub skip_test_unit: bool,

    #[arg(long = "skip-javascript", help = "Skip the JavaScript asset setup")]
    pub skip_javascript: bool,

    #[arg(long = "skip-action-cable", help = "Skip the Action Cable client")]
    pub skip_action_cable: bool,

    #[arg(long = "edge", help = "Use Rails from its main branch")]
    pub edge: bool,

    #[arg(long = "dev", help = "Use a local Rails checkout at ../rails")]
    pub dev: bool,

    /// JSON or TOML table of raw options; flags override its values.
    #[arg(long = "options", value_name = "FILE")]
    pub options_file: Option<PathBuf>,
}

impl OptionArgs {
    /// `true` when no option flag and no options file was given.
    pub fn is_empty(&self) -> bool {
        self.app_name.is_none()
            && self.database.is_none()
            && !self.skip_active_record
            && !self.skip_test_unit
            && !self.skip_javascript
            && !self.skip_action_cable
            && !self.edge
            && !self.dev
            && self.options_file.is_none()
    }
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `trellis new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Directory to generate into.  Created if missing; existing files that
    /// the pipeline writes are replaced.
    #[arg(value_name = "DESTINATION", help = "Destination directory")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Print the plan without writing any files.
    #[arg(long = "dry-run", help = "Show which steps would run without running them")]
    pub dry_run: bool,

    /// Build in a staging directory and swap it in only on success.
    #[arg(
        long = "staged",
        help = "Leave the destination untouched if any step fails"
    )]
    pub staged: bool,

    /// Log external commands instead of running them.
    #[arg(long = "skip-commands", help = "Do not run external commands (bundle install)")]
    pub skip_commands: bool,

    /// Read template files from a directory instead of the built-in copy.
    #[arg(long = "template-dir", value_name = "DIR", help = "Template directory to use")]
    pub template_dir: Option<PathBuf>,
}

// ── steps ─────────────────────────────────────────────────────────────────────

/// Arguments for `trellis steps`.
#[derive(Debug, Args)]
pub struct StepsArgs {
    #[command(flatten)]
    pub options: OptionArgs,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `trellis init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.trellis.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `trellis completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `trellis config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.database`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the configuration file locations in use.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "trellis",
            "new",
            "acme",
            "--database",
            "postgresql",
            "--skip-test-unit",
            "--staged",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.destination, PathBuf::from("acme"));
        assert_eq!(args.options.database.as_deref(), Some("postgresql"));
        assert!(args.options.skip_test_unit);
        assert!(args.staged);
        assert!(!args.dry_run);
    }

    #[test]
    fn database_is_free_text() {
        // Backend validation belongs to the resolver, so unknown values parse.
        let cli = Cli::parse_from(["trellis", "new", "acme", "-d", "oracle"]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.options.database.as_deref(), Some("oracle"));
    }

    #[test]
    fn steps_without_options_is_empty() {
        let cli = Cli::parse_from(["trellis", "steps"]);
        let Commands::Steps(args) = cli.command else {
            panic!("expected Steps command");
        };
        assert!(args.options.is_empty());

        let cli = Cli::parse_from(["trellis", "steps", "--edge"]);
        let Commands::Steps(args) = cli.command else {
            panic!("expected Steps command");
        };
        assert!(!args.options.is_empty());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["trellis", "--quiet", "--verbose", "steps"]);
        assert!(result.is_err());
    }
}
