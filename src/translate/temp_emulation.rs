//! Temp-table emulation: rewrite `#name` references for dialects that
//! lack true session-local temp tables.

use crate::dialect::Dialect;
use crate::error::RenderError;
use crate::rules::string_protect;

/// Oracle's harder limit: the *input* name is capped at 21 characters
/// so that `name_<8-char salt>` (21 + 1 '_' + 8 = 30) still fits inside
/// Oracle's 30-character identifier limit.
const ORACLE_MAX_INPUT_NAME_LEN: usize = 21;

/// Rewrite every `#name` reference in `text` into a schema-qualified
/// (or bare) salted identifier, consistently per name: every occurrence
/// of a given `#name` within one translated statement renames to the
/// same output identifier.
pub fn rewrite_temp_tables(
    text: &str,
    target: Dialect,
    schema: Option<&str>,
) -> Result<String, RenderError> {
    let protect = string_protect(text);
    let salt = crate::config::session_salt();
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;

    while i < bytes.len() {
        if protect.get(i).copied().unwrap_or(false) {
            let ch = text[i..].chars().next().expect("i is a char boundary");
            out.push(ch);
            i += ch.len_utf8();
            continue;
        }
        if bytes[i] == b'#' && bytes.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
            let name_start = i + 1;
            let mut j = name_start + 1;
            while j < bytes.len() && is_ident_part(bytes[j]) {
                j += 1;
            }
            let name = &text[name_start..j];
            out.push_str(&emulated_name(name, target, schema, salt)?);
            i = j;
            continue;
        }
        let ch = text[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }

    Ok(out)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn emulated_name(
    name: &str,
    target: Dialect,
    schema: Option<&str>,
    salt: &str,
) -> Result<String, RenderError> {
    if target == Dialect::Oracle && name.chars().count() > ORACLE_MAX_INPUT_NAME_LEN {
        return Err(RenderError::IdentifierTooLong {
            name: name.to_string(),
            dialect: target.to_string(),
            limit: ORACLE_MAX_INPUT_NAME_LEN,
        });
    }

    let bare = format!("{name}_{salt}");
    let limit = target.max_identifier_length();
    if bare.chars().count() > limit {
        return Err(RenderError::IdentifierTooLong {
            name: name.to_string(),
            dialect: target.to_string(),
            limit,
        });
    }

    Ok(match schema {
        Some(s) => format!("{s}.{bare}"),
        None => bare,
    })
}
