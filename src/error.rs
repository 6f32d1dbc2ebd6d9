//! Error types for tsql-render

use thiserror::Error;

/// Errors that can occur while rendering a template or translating SQL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("template syntax error at offset {offset}: {message}")]
    TemplateSyntax { message: String, offset: usize },

    #[error("expression error at offset {offset}: {message}")]
    Expression { message: String, offset: usize },

    #[error("unknown target dialect: {name}")]
    Dialect { name: String },

    #[error("failed to load pattern table: {message}")]
    RuleLoad { message: String },

    #[error("identifier '{name}' is too long for {dialect} (limit {limit} characters)")]
    IdentifierTooLong {
        name: String,
        dialect: String,
        limit: usize,
    },
}
