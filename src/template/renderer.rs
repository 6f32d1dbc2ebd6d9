//! Drives the lexer and evaluator to produce fully substituted SQL
//! text.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::template::defaults::extract_defaults;
use crate::template::expr;
use crate::template::lexer::{lex, Token};
use crate::value::{Bindings, Scalar, Value};

/// Render a template against a set of parameter bindings.
///
/// Rendering is total: an unbound parameter with no default renders as
/// the empty string rather than failing. Only malformed template syntax
/// or a malformed expression are fatal.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, RenderError> {
    let (clean, defaults) = extract_defaults(template);
    render_tokens(&clean, bindings, &defaults)
}

fn render_tokens(
    text: &str,
    bindings: &Bindings,
    defaults: &HashMap<String, Scalar>,
) -> Result<String, RenderError> {
    let tokens = lex(text)?;
    let mut out = String::with_capacity(text.len());
    for token in tokens {
        match token {
            Token::Text(s) => out.push_str(s),
            Token::Param(name) => out.push_str(&effective_substitution_string(
                name, bindings, defaults,
            )),
            Token::Cond {
                expr: guard,
                then_body,
                else_body,
            } => {
                let substituted = expr::substitute(guard, bindings, defaults);
                if expr::evaluate(&substituted)? {
                    out.push_str(&render_tokens(then_body, bindings, defaults)?);
                } else if let Some(e) = else_body {
                    out.push_str(&render_tokens(e, bindings, defaults)?);
                }
            }
        }
    }
    Ok(out)
}

fn effective_substitution_string(
    name: &str,
    bindings: &Bindings,
    defaults: &HashMap<String, Scalar>,
) -> String {
    if let Some(v) = bindings.get(name) {
        return v.to_substitution_string();
    }
    if let Some(d) = defaults.get(name) {
        return Value::Scalar(d.clone()).to_substitution_string();
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn bindings(pairs: &[(&str, Value)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn plain_sql_is_unchanged() {
        let sql = "SELECT * FROM t WHERE id = 1";
        assert_eq!(render(sql, &Bindings::new()).unwrap(), sql);
    }

    #[test]
    fn substitutes_scalar_params() {
        let b = bindings(&[("x", Value::str("my_table")), ("a", Value::int(123))]);
        let out = render("SELECT * FROM @x WHERE id=@a", &b).unwrap();
        assert_eq!(out, "SELECT * FROM my_table WHERE id=123");
    }

    #[test]
    fn substitutes_sequence_params() {
        let b = bindings(&[(
            "a",
            Value::seq(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]),
        )]);
        let out = render("SELECT * FROM table WHERE id IN (@a)", &b).unwrap();
        assert_eq!(out, "SELECT * FROM table WHERE id IN (1,2,3)");
    }

    #[test]
    fn default_declarations_apply_and_are_overridable() {
        let out = render("{DEFAULT @a=1} SELECT @a", &Bindings::new()).unwrap();
        assert_eq!(out, " SELECT 1");

        let b = bindings(&[("a", Value::int(42))]);
        let out = render("{DEFAULT @a=1} SELECT @a", &b).unwrap();
        assert_eq!(out, " SELECT 42");
    }

    #[test]
    fn conditional_block_selects_then_branch() {
        let b = bindings(&[("x", Value::int(2))]);
        let out = render("SELECT * FROM t {@x IN (1,2,3)} ? {WHERE id=@x}", &b).unwrap();
        assert_eq!(out, "SELECT * FROM t WHERE id=2");
    }

    #[test]
    fn conditional_block_falls_back_to_else() {
        let b = bindings(&[("x", Value::int(9))]);
        let out = render(
            "SELECT * FROM t {@x IN (1,2,3)} ? {WHERE id=@x} : {WHERE 1=0}",
            &b,
        )
        .unwrap();
        assert_eq!(out, "SELECT * FROM t WHERE 1=0");
    }

    #[test]
    fn nested_conditionals_render() {
        let b = bindings(&[("a", Value::bool(true)), ("b", Value::bool(false))]);
        let tmpl = "{@a} ? { outer {@b} ? {inner-then} : {inner-else} }";
        let out = render(tmpl, &b).unwrap();
        assert_eq!(out, " outer inner-else ");
    }

    #[test]
    fn unbound_parameter_renders_empty_without_erroring() {
        let out = render("SELECT @missing", &Bindings::new()).unwrap();
        assert_eq!(out, "SELECT ");
    }

    #[test]
    fn malformed_conditional_is_a_syntax_error() {
        let err = render("{@x} ? {unterminated", &Bindings::new()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax { .. }));
    }
}
