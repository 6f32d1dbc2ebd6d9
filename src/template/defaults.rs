//! Default-declaration collection: a pre-pass over the raw template
//! text that happens before the lexer ever runs.
//!
//! `{DEFAULT @name = literal}` may occur anywhere in the template,
//! including inside a conditional body. Since bodies are just substrings
//! of the original text, a single linear scan over the whole template
//! finds every declaration regardless of nesting; declarations are
//! stripped from the text before the lexer ever sees it.

use std::collections::HashMap;

use crate::text_scan::{find_balanced_brace, string_literal_end};
use crate::value::Scalar;

/// Strip every `{DEFAULT @name = literal}` from `template`, returning the
/// cleaned text and a name -> literal map (last declaration wins).
pub fn extract_defaults(template: &str) -> (String, HashMap<String, Scalar>) {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut defaults = HashMap::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if let Some(end) = string_literal_end(bytes, i) {
            out.push_str(&template[i..end]);
            i = end;
            continue;
        }

        if bytes[i] == b'{' {
            if let Some(content_end) = find_balanced_brace(template, i + 1) {
                let content = &template[i + 1..content_end];
                if let Some((name, literal)) = parse_default_decl(content) {
                    defaults.insert(name, literal);
                    i = content_end + 1;
                    i = consume_trailing_blank(template, i);
                    continue;
                }
            }
        }

        // Not a recognized default: copy this one character and keep
        // scanning, so declarations nested inside what will later parse
        // as a conditional body are still found.
        let ch = template[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }

    (out, defaults)
}

/// Consume one trailing newline (`\r\n` or `\n`) immediately after a
/// removed default, so stripping a declaration on its own line doesn't
/// leave a blank line behind. A single trailing space is left alone;
/// the resulting leading space before the next token is an acceptable,
/// implementation-defined artifact of token removal.
fn consume_trailing_blank(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    if bytes.get(pos) == Some(&b'\r') && bytes.get(pos + 1) == Some(&b'\n') {
        pos + 2
    } else if bytes.get(pos) == Some(&b'\n') {
        pos + 1
    } else {
        pos
    }
}

/// Parse `DEFAULT @name = literal`, tolerating surrounding whitespace.
/// Returns `None` if `content` isn't a default declaration at all.
fn parse_default_decl(content: &str) -> Option<(String, Scalar)> {
    let trimmed = content.trim_start();
    let rest = strip_ci_prefix(trimmed, "DEFAULT")?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('@')?;

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = rest[..name_len].to_string();

    let rest = rest[name_len..].trim_start();
    let rest = rest.strip_prefix('=')?;
    let literal_text = rest.trim();
    if literal_text.is_empty() {
        return None;
    }

    Some((name, parse_literal(literal_text)))
}

fn strip_ci_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn parse_literal(text: &str) -> Scalar {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        let inner = &text[1..text.len() - 1];
        return Scalar::Str(inner.replace("''", "'"));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Scalar::Int(n);
    }
    if let Ok(r) = text.parse::<f64>() {
        return Scalar::Real(r);
    }
    Scalar::Str(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_default_and_collects_value() {
        let (clean, defaults) = extract_defaults("{DEFAULT @a=1} SELECT @a");
        assert_eq!(clean, " SELECT @a");
        assert_eq!(defaults.get("a"), Some(&Scalar::Int(1)));
    }

    #[test]
    fn last_declaration_wins() {
        let (_, defaults) = extract_defaults("{DEFAULT @a=1}{DEFAULT @a=2} @a");
        assert_eq!(defaults.get("a"), Some(&Scalar::Int(2)));
    }

    #[test]
    fn string_and_bare_identifier_literals() {
        let (_, defaults) = extract_defaults("{DEFAULT @s='hi'} {DEFAULT @b=dbo}");
        assert_eq!(defaults.get("s"), Some(&Scalar::Str("hi".to_string())));
        assert_eq!(defaults.get("b"), Some(&Scalar::Str("dbo".to_string())));
    }

    #[test]
    fn default_inside_conditional_body_is_still_found() {
        let (clean, defaults) = extract_defaults("{@x} ? {{DEFAULT @y=5} @y}");
        assert_eq!(defaults.get("y"), Some(&Scalar::Int(5)));
        assert_eq!(clean, "{@x} ? { @y}");
    }

    #[test]
    fn non_default_braces_pass_through() {
        let (clean, defaults) = extract_defaults("SELECT {not_default} FROM t");
        assert!(defaults.is_empty());
        assert_eq!(clean, "SELECT {not_default} FROM t");
    }
}
