//! Expression evaluator for conditional-block guards.
//!
//! ```text
//! expr    := or
//! or      := and ( '|' and )*
//! and     := cmp ( '&' cmp )*
//! cmp     := atom ( ('=='|'!='|'<'|'<='|'>'|'>=') atom | 'IN' '(' atomList ')' )?
//! atom    := '!' atom | '(' expr ')' | literal
//! literal := integer | real | single-quoted string | TRUE | FALSE
//! ```
//!
//! Parameter references are substituted with their effective binding
//! before this grammar ever runs: evaluation first resolves every
//! `@name` reference, then evaluates the resulting expression text.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::text_scan::string_literal_end;
use crate::value::{Bindings, Scalar, Value};

/// Substitute `@name` references in an expression with their effective
/// binding, rendered as a re-parseable literal. `@` inside string
/// literals already present in the expression is left untouched.
pub fn substitute(expr: &str, bindings: &Bindings, defaults: &HashMap<String, Scalar>) -> String {
    let bytes = expr.as_bytes();
    let mut out = String::with_capacity(expr.len());
    let mut i = 0usize;

    while i < bytes.len() {
        if let Some(end) = string_literal_end(bytes, i) {
            out.push_str(&expr[i..end]);
            i = end;
            continue;
        }
        if bytes[i] == b'@' && bytes.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
            let name_start = i + 1;
            let mut j = name_start + 1;
            while j < bytes.len() && is_ident_part(bytes[j]) {
                j += 1;
            }
            let name = &expr[name_start..j];
            out.push_str(&effective_expression_string(name, bindings, defaults));
            i = j;
            continue;
        }
        let ch = expr[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn effective_expression_string(
    name: &str,
    bindings: &Bindings,
    defaults: &HashMap<String, Scalar>,
) -> String {
    if let Some(v) = bindings.get(name) {
        return v.to_expression_string();
    }
    if let Some(d) = defaults.get(name) {
        return Value::Scalar(d.clone()).to_expression_string();
    }
    // Unbound with no default: an empty string literal, not raw empty
    // text, so the grammar still parses.
    "''".to_string()
}

/// Evaluate a boolean expression (after substitution has already run).
pub fn evaluate(expr: &str) -> Result<bool, RenderError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        expr,
    };
    let result = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(RenderError::Expression {
            message: format!("unexpected trailing input near '{}'", parser.current_text()),
            offset: parser.current_offset(),
        });
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Real(f64),
    Str(String),
    True,
    False,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Comma,
}

struct PosTok {
    tok: Tok,
    offset: usize,
}

fn tokenize(expr: &str) -> Result<Vec<PosTok>, RenderError> {
    let bytes = expr.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let tok = match c {
            b'\'' => {
                let end = string_literal_end(bytes, i).ok_or_else(|| RenderError::Expression {
                    message: "unterminated string literal".to_string(),
                    offset: i,
                })?;
                let inner = &expr[i + 1..end - 1];
                i = end;
                Tok::Str(inner.replace("''", "'"))
            }
            b'(' => {
                i += 1;
                Tok::LParen
            }
            b')' => {
                i += 1;
                Tok::RParen
            }
            b',' => {
                i += 1;
                Tok::Comma
            }
            b'&' => {
                i += 1;
                Tok::And
            }
            b'|' => {
                i += 1;
                Tok::Or
            }
            b'!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    Tok::Ne
                } else {
                    i += 1;
                    Tok::Not
                }
            }
            b'=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    Tok::Eq
                } else {
                    return Err(RenderError::Expression {
                        message: "expected '==' (single '=' is not an operator)".to_string(),
                        offset: i,
                    });
                }
            }
            b'<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    Tok::Le
                } else {
                    i += 1;
                    Tok::Lt
                }
            }
            b'>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    Tok::Ge
                } else {
                    i += 1;
                    Tok::Gt
                }
            }
            _ if c.is_ascii_digit() => {
                let mut j = i + 1;
                let mut is_real = false;
                while j < bytes.len()
                    && (bytes[j].is_ascii_digit() || (bytes[j] == b'.' && !is_real))
                {
                    if bytes[j] == b'.' {
                        is_real = true;
                    }
                    j += 1;
                }
                let text = &expr[i..j];
                i = j;
                if is_real {
                    Tok::Real(text.parse().map_err(|_| RenderError::Expression {
                        message: format!("invalid number literal '{}'", text),
                        offset: start,
                    })?)
                } else {
                    Tok::Int(text.parse().map_err(|_| RenderError::Expression {
                        message: format!("invalid integer literal '{}'", text),
                        offset: start,
                    })?)
                }
            }
            _ if c.is_ascii_alphabetic() || c == b'_' => {
                let mut j = i + 1;
                while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                    j += 1;
                }
                let word = &expr[i..j];
                i = j;
                if word.eq_ignore_ascii_case("TRUE") {
                    Tok::True
                } else if word.eq_ignore_ascii_case("FALSE") {
                    Tok::False
                } else if word.eq_ignore_ascii_case("IN") {
                    Tok::In
                } else {
                    return Err(RenderError::Expression {
                        message: format!("unexpected identifier '{}'", word),
                        offset: start,
                    });
                }
            }
            other => {
                return Err(RenderError::Expression {
                    message: format!("unexpected character '{}'", other as char),
                    offset: i,
                })
            }
        };
        out.push(PosTok { tok, offset: start });
    }
    Ok(out)
}

struct Parser<'a> {
    tokens: &'a [PosTok],
    pos: usize,
    expr: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|p| &p.tok)
    }

    fn current_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|p| p.offset)
            .unwrap_or(self.expr.len())
    }

    fn current_text(&self) -> &str {
        &self.expr[self.current_offset()..]
    }

    fn advance(&mut self) -> Option<&Tok> {
        let t = self.tokens.get(self.pos).map(|p| &p.tok);
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: &Tok) -> Result<(), RenderError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(RenderError::Expression {
                message: format!("expected {:?} near '{}'", want, self.current_text()),
                offset: self.current_offset(),
            })
        }
    }

    fn parse_or(&mut self) -> Result<bool, RenderError> {
        let mut acc = self.parse_and()?;
        while self.peek() == Some(&Tok::Or) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            acc = acc || rhs;
        }
        Ok(acc)
    }

    fn parse_and(&mut self) -> Result<bool, RenderError> {
        let mut acc = self.parse_cmp()?;
        while self.peek() == Some(&Tok::And) {
            self.pos += 1;
            let rhs = self.parse_cmp()?;
            acc = acc && rhs;
        }
        Ok(acc)
    }

    fn parse_cmp(&mut self) -> Result<bool, RenderError> {
        let left = self.parse_atom()?;
        match self.peek() {
            Some(Tok::Eq) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) == std::cmp::Ordering::Equal)
            }
            Some(Tok::Ne) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) != std::cmp::Ordering::Equal)
            }
            Some(Tok::Lt) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) == std::cmp::Ordering::Less)
            }
            Some(Tok::Le) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) != std::cmp::Ordering::Greater)
            }
            Some(Tok::Gt) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) == std::cmp::Ordering::Greater)
            }
            Some(Tok::Ge) => {
                self.pos += 1;
                let right = self.parse_atom()?;
                Ok(compare(&left, &right) != std::cmp::Ordering::Less)
            }
            Some(Tok::In) => {
                self.pos += 1;
                self.expect(&Tok::LParen)?;
                if self.peek() == Some(&Tok::RParen) {
                    self.pos += 1;
                    return Ok(false);
                }
                let mut list = vec![self.parse_atom()?];
                while self.peek() == Some(&Tok::Comma) {
                    self.pos += 1;
                    list.push(self.parse_atom()?);
                }
                self.expect(&Tok::RParen)?;
                Ok(list
                    .iter()
                    .any(|item| compare(&left, item) == std::cmp::Ordering::Equal))
            }
            _ => Ok(left.truthy()),
        }
    }

    /// `atom := '!' atom | '(' expr ')' | literal`. Negation and
    /// parenthesized sub-expressions collapse to a `Literal::Bool` so
    /// callers can treat every atom uniformly.
    fn parse_atom(&mut self) -> Result<Literal, RenderError> {
        match self.peek() {
            Some(Tok::Not) => {
                self.pos += 1;
                let inner = self.parse_atom()?;
                Ok(Literal::Bool(!inner.truthy()))
            }
            Some(Tok::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(&Tok::RParen)?;
                Ok(Literal::Bool(inner))
            }
            _ => match self.advance() {
                Some(Tok::Int(n)) => Ok(Literal::Int(*n)),
                Some(Tok::Real(r)) => Ok(Literal::Real(*r)),
                Some(Tok::Str(s)) => Ok(Literal::Str(s.clone())),
                Some(Tok::True) => Ok(Literal::Bool(true)),
                Some(Tok::False) => Ok(Literal::Bool(false)),
                other => Err(RenderError::Expression {
                    message: format!("expected a literal, found {:?}", other),
                    offset: self.current_offset().min(self.expr.len()),
                }),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Int(i64),
    Real(f64),
    Str(String),
    Bool(bool),
}

impl Literal {
    fn truthy(&self) -> bool {
        match self {
            Literal::Bool(b) => *b,
            Literal::Int(n) => *n != 0,
            Literal::Real(r) => *r != 0.0,
            Literal::Str(s) => !(s.is_empty() || s.eq_ignore_ascii_case("FALSE") || s == "0"),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Int(n) => Some(*n as f64),
            Literal::Real(r) => Some(*r),
            Literal::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Literal::Str(s) => s.parse::<f64>().ok(),
        }
    }

    fn as_string(&self) -> String {
        match self {
            Literal::Int(n) => n.to_string(),
            Literal::Real(r) => r.to_string(),
            Literal::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Literal::Str(s) => s.clone(),
        }
    }
}

/// Numeric comparison when both sides parse as numbers, otherwise
/// case-sensitive string comparison.
fn compare(left: &Literal, right: &Literal) -> std::cmp::Ordering {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
        _ => left.as_string().cmp(&right.as_string()),
    }
}
