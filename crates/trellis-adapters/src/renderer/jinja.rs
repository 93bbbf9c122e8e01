//! MiniJinja-backed renderer.
//!
//! Templates use `{{ name }}` placeholders and `{% if flag %}` blocks.
//! Rendering is strict: every top-level name a template mentions must be
//! bound, even inside branches that are not taken.

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use tracing::{debug, instrument};

use trellis_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::Bindings,
    error::TrellisResult,
};

/// Names provided by the engine itself, never looked up in bindings.
const ENGINE_GLOBALS: &[&str] = &["range", "dict", "namespace", "debug", "loop"];

/// MiniJinja-based template rendering engine.
///
/// Block trimming is on, so `{% if %}` lines leave no blank lines behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaRenderer;

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    #[instrument(skip(self, template, bindings))]
    fn render(&self, name: &str, template: &str, bindings: &Bindings) -> TrellisResult<String> {
        let mut env = self.environment();
        env.add_template(name, template)
            .map_err(|e| map_error(name, template, e))?;
        let tmpl = env
            .get_template(name)
            .map_err(|e| map_error(name, template, e))?;

        let mut missing: Vec<String> = tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|var| !bindings.contains(var) && !ENGINE_GLOBALS.contains(&var.as_str()))
            .collect();
        missing.sort();
        if let Some(first) = missing.into_iter().next() {
            return Err(ApplicationError::UndefinedVariable {
                name: first,
                template: name.to_string(),
            }
            .into());
        }

        let rendered = tmpl
            .render(bindings)
            .map_err(|e| map_error(name, template, e))?;
        debug!(bytes = rendered.len(), "template rendered");
        Ok(rendered)
    }
}

fn map_error(
    name: &str,
    source: &str,
    err: minijinja::Error,
) -> trellis_core::error::TrellisError {
    match err.kind() {
        ErrorKind::UndefinedError => ApplicationError::UndefinedVariable {
            name: undefined_reference(source, &err),
            template: name.to_string(),
        },
        _ => ApplicationError::RenderingFailed {
            template: name.to_string(),
            reason: err.to_string(),
        },
    }
    .into()
}

/// The expression an undefined-value error points at: the source under the
/// error span, else the error's line, else MiniJinja's own detail.
fn undefined_reference(source: &str, err: &minijinja::Error) -> String {
    let snippet = err
        .range()
        .and_then(|range| source.get(range))
        .or_else(|| {
            err.line()
                .and_then(|line| source.lines().nth(line.saturating_sub(1)))
        })
        .map(|text| {
            text.trim()
                .trim_start_matches("{{")
                .trim_end_matches("}}")
                .trim()
        })
        .filter(|text| !text.is_empty());

    match (snippet, err.detail()) {
        (Some(text), _) => text.to_string(),
        (None, Some(detail)) => detail.to_string(),
        (None, None) => err.to_string(),
    }
}
