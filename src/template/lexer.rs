//! Single-pass template scanner.
//!
//! Produces a flat token stream for one "level" of template text.
//! Conditional bodies are kept as raw slices of the input and are
//! re-lexed recursively by the renderer, since they may themselves
//! contain nested conditionals and parameter references.

use crate::error::RenderError;
use crate::text_scan::{find_balanced_brace, skip_ws, string_literal_end};

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    Param(&'a str),
    Cond {
        expr: &'a str,
        then_body: &'a str,
        else_body: Option<&'a str>,
    },
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Scan `text` into a flat token stream.
pub fn lex(text: &str) -> Result<Vec<Token<'_>>, RenderError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut text_start = 0usize;

    macro_rules! flush_text {
        ($end:expr) => {
            if $end > text_start {
                tokens.push(Token::Text(&text[text_start..$end]));
            }
        };
    }

    while i < bytes.len() {
        if let Some(end) = string_literal_end(bytes, i) {
            i = end;
            continue;
        }

        match bytes[i] {
            b'@' if i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) => {
                flush_text!(i);
                let name_start = i + 1;
                let mut j = name_start + 1;
                while j < bytes.len() && is_ident_part(bytes[j]) {
                    j += 1;
                }
                tokens.push(Token::Param(&text[name_start..j]));
                i = j;
                text_start = i;
            }
            b'{' => match try_lex_cond(text, i)? {
                Some((cond, next)) => {
                    flush_text!(i);
                    tokens.push(cond);
                    i = next;
                    text_start = i;
                }
                None => {
                    // Edge policy: ambiguous `{` resolves to literal text.
                    i += 1;
                }
            },
            _ => i += 1,
        }
    }
    flush_text!(bytes.len());
    Ok(tokens)
}

/// Attempt to lex a conditional starting at a `{` byte offset.
///
/// `Ok(None)` means the brace never resolves to a `{expr}?{then}`
/// structure, so the caller treats the `{` itself as literal text. Once
/// a `?{` has been seen the author has committed to conditional syntax,
/// so an unmatched body brace from that point on is a genuine
/// `TemplateSyntaxError` rather than a fallback.
fn try_lex_cond(text: &str, open: usize) -> Result<Option<(Token<'_>, usize)>, RenderError> {
    let expr_close = match find_balanced_brace(text, open + 1) {
        Some(idx) => idx,
        None => return Ok(None),
    };
    let expr = &text[open + 1..expr_close];

    let after_expr = skip_ws(text, expr_close + 1);
    if text.as_bytes().get(after_expr) != Some(&b'?') {
        return Ok(None);
    }
    let after_q = skip_ws(text, after_expr + 1);
    if text.as_bytes().get(after_q) != Some(&b'{') {
        return Ok(None);
    }

    let then_close = find_balanced_brace(text, after_q + 1).ok_or_else(|| {
        RenderError::TemplateSyntax {
            message: "unterminated conditional 'then' body".to_string(),
            offset: after_q,
        }
    })?;
    let then_body = &text[after_q + 1..then_close];

    let after_then = skip_ws(text, then_close + 1);
    if text.as_bytes().get(after_then) == Some(&b':') {
        let after_colon = skip_ws(text, after_then + 1);
        if text.as_bytes().get(after_colon) == Some(&b'{') {
            let else_close = find_balanced_brace(text, after_colon + 1).ok_or_else(|| {
                RenderError::TemplateSyntax {
                    message: "unterminated conditional 'else' body".to_string(),
                    offset: after_colon,
                }
            })?;
            let else_body = &text[after_colon + 1..else_close];
            return Ok(Some((
                Token::Cond {
                    expr,
                    then_body,
                    else_body: Some(else_body),
                },
                else_close + 1,
            )));
        }
    }

    Ok(Some((
        Token::Cond {
            expr,
            then_body,
            else_body: None,
        },
        then_close + 1,
    )))
}
