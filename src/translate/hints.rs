//! MPP hint expansion: `--HINT DISTRIBUTE_ON_KEY(col)` and
//! `--HINT SORT_ON_KEY(INTERLEAVED:col)` comment lines rewrite the
//! statement that immediately follows them.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

static HINT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*--HINT[ \t]+(DISTRIBUTE_ON_KEY|SORT_ON_KEY)\(([^)]*)\)[ \t]*\r?\n")
        .expect("hint line regex is valid")
});

static STATEMENT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(CREATE[ \t]+TABLE|SELECT[\s\S]*?\bINTO\b)").expect("statement keyword regex is valid")
});

/// Expand every hint comment in `text`, inserting the matching clause
/// into the statement that immediately follows it. "Immediately
/// preceding" means no non-whitespace, non-comment content between the
/// hint line and the statement. The hint line itself is left in the
/// output.
pub fn expand_hints(text: &str, target: Dialect) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;

    while let Some(m) = HINT_LINE.find(&text[pos..]) {
        let hint_start = pos + m.start();
        let hint_end = pos + m.end();
        out.push_str(&text[pos..hint_end]);

        let caps = HINT_LINE
            .captures(&text[hint_start..hint_end])
            .expect("already matched");
        let kind = caps.get(1).unwrap().as_str().to_ascii_uppercase();
        let arg = caps.get(2).unwrap().as_str().trim();

        let rest = &text[hint_end..];
        let insertion_point = statement_insertion_point(rest);
        match insertion_point {
            Some(point) if rest[..point].trim().is_empty() => {
                let clause = hint_clause(&kind, arg, target);
                if let Some(clause) = clause {
                    let stmt_end = statement_end(rest, point);
                    out.push_str(&rest[..stmt_end]);
                    out.push(' ');
                    out.push_str(&clause);
                    pos = hint_end + stmt_end;
                    continue;
                }
            }
            _ => {}
        }
        pos = hint_end;
    }

    out.push_str(&text[pos..]);
    out
}

/// Byte offset into `rest` of the start of the next `CREATE TABLE` or
/// `SELECT ... INTO` keyword, if the hint immediately precedes one.
fn statement_insertion_point(rest: &str) -> Option<usize> {
    STATEMENT_KEYWORD.find(rest).map(|m| m.start())
}

/// The end of the single statement starting at `from` (up to the first
/// top-level `;`, or end of text).
fn statement_end(rest: &str, from: usize) -> usize {
    rest[from..]
        .find(';')
        .map(|i| from + i)
        .unwrap_or(rest.len())
}

fn hint_clause(kind: &str, arg: &str, target: Dialect) -> Option<String> {
    match kind {
        "DISTRIBUTE_ON_KEY" => Some(format!("WITH (DISTRIBUTION = HASH({arg}))")),
        "SORT_ON_KEY" => {
            let column = arg.strip_prefix("INTERLEAVED:").unwrap_or(arg);
            if target == Dialect::Redshift {
                Some(format!("INTERLEAVED SORTKEY({column})"))
            } else {
                Some(format!("SORTKEY({column})"))
            }
        }
        _ => None,
    }
}
