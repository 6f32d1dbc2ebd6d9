//! tsql-render: a SQL templating and dialect-translation engine.
//!
//! Two collaborating pieces: a templating front-end (`render`) that
//! substitutes parameters, resolves defaults, and evaluates conditional
//! blocks over SQL text; and a pattern-based translator (`translate`)
//! that rewrites rendered SQL from the canonical T-SQL-like dialect
//! into one of a fixed set of target dialects. `render_translate` runs
//! both in sequence, which is the shape most callers want.

pub mod config;
pub mod dialect;
pub mod error;
pub mod rules;
pub mod template;
mod text_scan;
mod translate;
pub mod value;

pub use dialect::Dialect;
pub use error::RenderError;
pub use rules::RuleTable;
pub use value::{Bindings, Scalar, Value};

/// Render a template against a set of parameter bindings.
///
/// Rendering never fails on an unbound parameter — it renders as the
/// empty string. Only malformed template syntax or a malformed
/// conditional-guard expression are fatal.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, RenderError> {
    template::render(template, bindings)
}

/// Translate already-rendered SQL from the canonical dialect into
/// `target_dialect`, using the bundled default pattern table.
///
/// `temp_emulation_schema` overrides the process-wide
/// [`config::set_temp_emulation_schema`] default for this call only; it
/// only matters for dialects that [`Dialect::requires_temp_emulation`].
pub fn translate(
    sql: &str,
    target_dialect: Dialect,
    temp_emulation_schema: Option<&str>,
) -> Result<String, RenderError> {
    let schema = temp_emulation_schema
        .map(str::to_string)
        .or_else(config::temp_emulation_schema);
    translate::translate(sql, target_dialect, schema.as_deref())
}

/// Render `template`, then translate the result into `target_dialect` —
/// the combined operation most external callers use.
pub fn render_translate(
    template: &str,
    target_dialect: Dialect,
    bindings: &Bindings,
    temp_emulation_schema: Option<&str>,
) -> Result<String, RenderError> {
    let rendered = render(template, bindings)?;
    translate(&rendered, target_dialect, temp_emulation_schema)
}
