//! Output management and formatting.
//!
//! Every command writes through [`OutputManager`], which knows whether the
//! user asked for colour, quiet mode, or machine-readable JSON.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use trellis_core::application::{ExecutionReport, StepStatus};
use trellis_core::domain::PlannedStep;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.  Written to stderr so it survives
    /// redirected or JSON stdout.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        Term::stderr().write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Pretty-printed JSON on stdout.  Never suppressed: the caller asked
    /// for it explicitly.
    pub fn json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        let text = serde_json::to_string_pretty(value).map_err(|e| CliError::InvalidInput {
            message: format!("failed to serialise output: {e}"),
            source: Some(Box::new(e)),
        })?;
        self.term.write_line(&text)?;
        Ok(())
    }

    // ── Structured views ──────────────────────────────────────────────────

    /// One line per step: marker, name, guard.
    ///
    /// Steps planned without a configuration carry no marker.
    pub fn plan(&self, steps: &[PlannedStep]) -> CliResult<()> {
        if self.is_json() {
            return self.json(&steps);
        }

        for step in steps {
            let marker = match step.will_run {
                Some(true) => "+",
                Some(false) => "-",
                None => " ",
            };
            let line = format!("{marker} {}  [{}]", step.name, step.guard);
            let line = match step.will_run {
                Some(false) if !self.no_color => line.dimmed().to_string(),
                _ => line,
            };
            self.print(&line)?;
        }
        Ok(())
    }

    /// Summary of a finished run.  With `-v`-style detail on, every applied
    /// step is listed.
    pub fn report(&self, report: &ExecutionReport, detailed: bool) -> CliResult<()> {
        if self.is_json() {
            return self.json(report);
        }

        if detailed {
            for outcome in report.outcomes() {
                let marker = match outcome.status {
                    StepStatus::Applied => "applied",
                    StepStatus::Skipped => "skipped",
                };
                self.print(&format!("  {marker:<8} {}", outcome.step))?;
            }
        }

        self.success(&format!(
            "{} steps applied, {} skipped in {}",
            report.applied_count(),
            report.skipped_count(),
            report.destination().display(),
        ))?;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
