//! Template engine for prompt rendering using Jinja2 syntax.
//!
//! Built-in templates are compiled into the binary. A template file with the
//! same relative name under `templates/prompts/` on disk takes precedence, so
//! prompts can be tuned without a rebuild.

use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the working directory
const TEMPLATE_DIR: &str = "templates/prompts";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "qa/answer_system.jinja",
        include_str!("../../../templates/prompts/qa/answer_system.jinja"),
    ),
    (
        "qa/summary_system.jinja",
        include_str!("../../../templates/prompts/qa/summary_system.jinja"),
    ),
    (
        "qa/summary_user.jinja",
        include_str!("../../../templates/prompts/qa/summary_user.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for &(name, builtin) in BUILTIN_TEMPLATES {
        let on_disk = Path::new(TEMPLATE_DIR).join(name);
        let source: &'static str = match std::fs::read_to_string(&on_disk) {
            Ok(content) => {
                tracing::debug!("Loaded template override: {}", on_disk.display());
                // Leaked once per template; the environment lives for the whole process
                Box::leak(content.into_boxed_str())
            }
            Err(_) => builtin,
        };

        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
            // Fall back to the compiled-in version if the override is broken
            if let Err(e) = env.add_template(name, builtin) {
                tracing::error!("Built-in template {} is invalid: {}", name, e);
            }
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given serializable context.
///
/// # Example
/// ```ignore
/// let prompt = render_template("qa/answer_system.jinja", &json!({ "chunks": chunks }))?;
/// ```
pub fn render_template<S: Serialize>(template_name: &str, ctx: &S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map(|rendered| rendered.trim().to_string())
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
