//! The capture/backreference matcher.
//!
//! A compiled pattern is a short sequence of literal runs, whitespace
//! runs, and named captures. Matching is leftmost-first, one rule at a
//! time, with the scan position always advanced past a successful
//! substitution so a replacement can never be rescanned by its own
//! rule, which would otherwise loop forever.

use std::collections::HashMap;

use crate::dialect::Dialect;
use crate::text_scan::string_literal_end as scan_string_literal_end;

#[derive(Debug, Clone, PartialEq)]
pub enum PatternElem {
    Literal(String),
    Whitespace,
    /// Capture name; empty for an anonymous `@@@`.
    Capture(String),
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub source: Dialect,
    pub target: Dialect,
    pub pattern: Vec<PatternElem>,
    pub replace: String,
}

/// Compile a `pattern_search` string into its element sequence.
pub fn compile_pattern(search: &str) -> Vec<PatternElem> {
    let bytes = search.as_bytes();
    let mut elems = Vec::new();
    let mut literal = String::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            flush_literal(&mut elems, &mut literal);
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            elems.push(PatternElem::Whitespace);
            continue;
        }
        if bytes[i] == b'@' && bytes.get(i + 1) == Some(&b'@') && bytes.get(i + 2) == Some(&b'@') {
            flush_literal(&mut elems, &mut literal);
            let mut j = i + 3;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            elems.push(PatternElem::Capture(search[i + 3..j].to_string()));
            i = j;
            continue;
        }
        let ch = search[i..].chars().next().expect("i is a char boundary");
        literal.push(ch);
        i += ch.len_utf8();
    }
    flush_literal(&mut elems, &mut literal);
    elems
}

fn flush_literal(elems: &mut Vec<PatternElem>, literal: &mut String) {
    if !literal.is_empty() {
        elems.push(PatternElem::Literal(std::mem::take(literal)));
    }
}

/// Compute the set of byte offsets that fall inside a single-quoted
/// string literal, as a bitset of positions computed once per input.
pub fn string_protect(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut protect = vec![false; bytes.len()];
    let mut i = 0usize;
    while i < bytes.len() {
        if let Some(end) = scan_string_literal_end(bytes, i) {
            for slot in protect.iter_mut().take(end.min(bytes.len())).skip(i) {
                *slot = true;
            }
            i = end;
        } else {
            i += 1;
        }
    }
    protect
}

/// Apply one rule, once, across the whole text, returning the result.
/// This is a single left-to-right pass: every non-overlapping match is
/// rewritten, but the rule never re-examines its own output.
pub fn apply_rule_single_pass(text: &str, rule: &CompiledRule) -> String {
    let protect = string_protect(text);
    let starts_with_quote =
        matches!(rule.pattern.first(), Some(PatternElem::Literal(l)) if l.starts_with('\''));

    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;
    loop {
        match find_next_match(text, pos, &rule.pattern, &protect, starts_with_quote) {
            Some((start, end, captures)) => {
                out.push_str(&text[pos..start]);
                out.push_str(&build_replacement(&rule.replace, &captures));
                pos = end;
            }
            None => {
                out.push_str(&text[pos..]);
                break;
            }
        }
    }
    out
}

/// Apply every rule in `rules`, in order, one pass each. A single pass
/// over the text applies every rule in order; once every rule has had
/// its one pass, translation is complete. There is no outer fixpoint
/// across rules.
pub fn apply_rules(text: &str, rules: &[CompiledRule]) -> String {
    let mut current = text.to_string();
    for rule in rules {
        current = apply_rule_single_pass(&current, rule);
    }
    current
}

fn find_next_match(
    text: &str,
    from: usize,
    pattern: &[PatternElem],
    protect: &[bool],
    starts_with_quote: bool,
) -> Option<(usize, usize, HashMap<String, String>)> {
    if pattern.is_empty() {
        return None;
    }
    let candidates = text
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i >= from)
        .collect::<Vec<_>>();

    for start in candidates {
        if protect.get(start).copied().unwrap_or(false) && !starts_with_quote {
            continue;
        }
        if let Some((end, captures)) = match_seq(pattern, text, start) {
            if end > start {
                return Some((start, end, captures));
            }
        }
    }
    None
}

fn match_seq(
    elems: &[PatternElem],
    text: &str,
    idx: usize,
) -> Option<(usize, HashMap<String, String>)> {
    let Some((first, rest)) = elems.split_first() else {
        return Some((idx, HashMap::new()));
    };

    match first {
        PatternElem::Literal(lit) => {
            let end = idx + lit.len();
            if end > text.len() || !text.is_char_boundary(end) {
                return None;
            }
            if !text[idx..end].eq_ignore_ascii_case(lit) {
                return None;
            }
            match_seq(rest, text, end)
        }
        PatternElem::Whitespace => {
            let bytes = text.as_bytes();
            let mut max_len = 0usize;
            while idx + max_len < bytes.len() && bytes[idx + max_len].is_ascii_whitespace() {
                max_len += 1;
            }
            if max_len == 0 {
                return None;
            }
            for len in (1..=max_len).rev() {
                if let Some(result) = match_seq(rest, text, idx + len) {
                    return Some(result);
                }
            }
            None
        }
        PatternElem::Capture(name) => {
            let max_extent = capture_max_extent(text, idx, rest);
            for end in capture_candidate_ends(text, idx, max_extent).into_iter().rev() {
                if let Some((final_end, mut captures)) = match_seq(rest, text, end) {
                    if !name.is_empty() {
                        captures.insert(name.clone(), text[idx..end].to_string());
                    }
                    return Some((final_end, captures));
                }
            }
            None
        }
    }
}

/// Positions between `idx` and `max_extent` (inclusive) a capture may
/// end at, in increasing order. String literals are treated as atomic:
/// a candidate end never falls inside one, so the backtracking shrink
/// in `match_seq` can never hand a following literal anchor a quoted
/// comma or paren to match against.
fn capture_candidate_ends(text: &str, idx: usize, max_extent: usize) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut ends = vec![idx];
    let mut i = idx;
    while i < max_extent {
        if let Some(end) = scan_string_literal_end(bytes, i) {
            i = end.min(max_extent);
        } else {
            let ch = text[i..].chars().next().expect("i is a char boundary");
            i = (i + ch.len_utf8()).min(max_extent);
        }
        ends.push(i);
    }
    ends
}

/// The furthest a capture starting at `idx` may extend: bounded by an
/// unbalanced closing paren, or a depth-zero comma unless the pattern's
/// next anchor is itself a comma literal. String literals are skipped
/// as atomic units so punctuation inside them never truncates the
/// capture early.
fn capture_max_extent(text: &str, idx: usize, rest: &[PatternElem]) -> usize {
    let next_is_comma_literal =
        matches!(rest.first(), Some(PatternElem::Literal(l)) if l.as_str() == ",");
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = idx;
    while i < bytes.len() {
        if let Some(end) = scan_string_literal_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                i += 1;
            }
            b',' if depth == 0 && !next_is_comma_literal => break,
            _ => {
                let ch = text[i..].chars().next().expect("i is a char boundary");
                i += ch.len_utf8();
            }
        }
    }
    i
}

/// Substitute `@@@name` references in a replacement template with their
/// captured text, preserving original casing verbatim (never
/// case-folded).
fn build_replacement(replace: &str, captures: &HashMap<String, String>) -> String {
    let bytes = replace.as_bytes();
    let mut out = String::with_capacity(replace.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'@' && bytes.get(i + 1) == Some(&b'@') && bytes.get(i + 2) == Some(&b'@') {
            let mut j = i + 3;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            let name = &replace[i + 3..j];
            if let Some(value) = captures.get(name) {
                out.push_str(value);
            }
            i = j;
            continue;
        }
        let ch = replace[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(search: &str, replace: &str) -> CompiledRule {
        CompiledRule {
            source: Dialect::SqlServer,
            target: Dialect::Oracle,
            pattern: compile_pattern(search),
            replace: replace.to_string(),
        }
    }

    #[test]
    fn compiles_literal_whitespace_and_captures() {
        let elems = compile_pattern("DATEDIFF(dd,@@@a,@@@b)");
        assert_eq!(
            elems,
            vec![
                PatternElem::Literal("DATEDIFF(dd,".to_string()),
                PatternElem::Capture("a".to_string()),
                PatternElem::Literal(",".to_string()),
                PatternElem::Capture("b".to_string()),
                PatternElem::Literal(")".to_string()),
            ]
        );
    }

    #[test]
    fn literal_match_is_case_insensitive() {
        let r = rule("select", "SELECT");
        let out = apply_rule_single_pass("SeLeCt 1", &r);
        assert_eq!(out, "SELECT 1");
    }

    #[test]
    fn capture_replacement_preserves_casing() {
        let r = rule("GETDATE(@@@)", "SYSDATE");
        let out = apply_rule_single_pass("x = GETDATE()", &r);
        assert_eq!(out, "x = SYSDATE");
    }

    #[test]
    fn capture_stops_at_depth_zero_comma() {
        let r = rule("DATEDIFF(dd,@@@a,@@@b)", "(@@@b - @@@a)");
        let out = apply_rule_single_pass("SELECT DATEDIFF(dd,start_date,end_date) FROM t", &r);
        assert_eq!(out, "SELECT (end_date - start_date) FROM t");
    }

    #[test]
    fn capture_respects_nested_parens() {
        let r = rule("ISNULL(@@@a,@@@b)", "COALESCE(@@@a,@@@b)");
        let out = apply_rule_single_pass("SELECT ISNULL(f(x),0)", &r);
        assert_eq!(out, "SELECT COALESCE(f(x),0)");
    }

    #[test]
    fn does_not_match_inside_string_literal() {
        let r = rule("select", "SELECT");
        let out = apply_rule_single_pass("x = 'select me'", &r);
        assert_eq!(out, "x = 'select me'");
    }

    #[test]
    fn scan_advances_past_substitution_to_avoid_self_match() {
        let r = rule("foo", "foofoo");
        let out = apply_rule_single_pass("foo bar", &r);
        assert_eq!(out, "foofoo bar");
    }

    #[test]
    fn capture_backtrack_never_anchors_inside_a_string_literal() {
        let r = rule("ISNULL(@@@a,@@@b)", "COALESCE(@@@a,@@@b)");
        let out = apply_rule_single_pass("ISNULL(x, 'ISNULL(a,b)')", &r);
        assert_eq!(out, "COALESCE(x, 'ISNULL(a,b)')");
    }

    #[test]
    fn rules_apply_in_order_single_pass_each() {
        let rules = vec![rule("a", "b"), rule("b", "c")];
        // Rule 1 turns "a" into "b"; rule 2 then turns that "b" (and any
        // original "b") into "c" in its own separate pass.
        assert_eq!(apply_rules("a b", &rules), "c c");
    }
}
