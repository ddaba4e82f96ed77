//! Deterministic text rendering for notification templates.
//!
//! Templates are plain text with `#{dotted.path}` placeholders that resolve
//! against a JSON object context. Substitution is purely textual: no
//! conditionals, no loops, no escaping. Rendering the same template against
//! the same context always yields byte-identical output.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("template variable not found: {0}")]
    MissingVariable(String),

    #[error("unterminated '#{{' placeholder at byte {0}")]
    UnterminatedPlaceholder(usize),

    #[error("template variable {0} does not render to text")]
    Unrenderable(String),

    #[error("context value {0} could not be serialized")]
    Context(String, #[source] serde_json::Error),
}

/// Name the built-in mail body template is registered under.
pub const STATUS_CHANGED: &str = "status-changed";

/// The default mail body for a status transition. Context variables:
/// `instance` (the stored instance) and `event` (the transition).
const STATUS_CHANGED_BODY: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />
</head>
<body>
<span>#{instance.registration.name}</span> (<span>#{instance.id}</span>)
status changed from <span>#{instance.statusInfo.status}</span> to <span>#{event.statusInfo.status}</span>
<br />
<span>#{instance.registration.healthUrl}</span>
</body>
</html>
"#;

/// Named values visible to a template.
///
/// Values are serialized to JSON on insertion so placeholders can walk into
/// nested fields (`instance.registration.healthUrl`).
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: Map<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` under `name`.
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<(), TemplateError> {
        let value = serde_json::to_value(value)
            .map_err(|e| TemplateError::Context(name.to_string(), e))?;
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.vars.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

/// Renders named templates and inline template strings.
pub struct TemplateRenderer {
    templates: HashMap<String, String>,
}

impl TemplateRenderer {
    /// Creates a renderer with no templates registered.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Registers (or replaces) a template under `name`.
    pub fn register(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    /// Renders the template registered under `name` against `context`.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))?;
        expand(source, context)
    }

    /// Renders an inline template string (used for configured subject lines).
    pub fn render_str(
        &self,
        source: &str,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        expand(source, context)
    }
}

impl Default for TemplateRenderer {
    /// A renderer with the built-in `status-changed` mail body registered.
    fn default() -> Self {
        let mut renderer = Self::empty();
        renderer.register(STATUS_CHANGED, STATUS_CHANGED_BODY);
        renderer
    }
}

fn expand(source: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            TemplateError::UnterminatedPlaceholder(source.len() - rest.len() + start)
        })?;
        let path = &after[..end];

        let value = context
            .resolve(path)
            .ok_or_else(|| TemplateError::MissingVariable(path.to_string()))?;
        match value {
            Value::String(s) => out.push_str(s),
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            // Null, arrays and objects have no sensible textual form here.
            _ => return Err(TemplateError::Unrenderable(path.to_string())),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
