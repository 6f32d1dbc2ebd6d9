//! The translator orchestrator and its post-transforms.

mod hints;
mod temp_emulation;

use crate::dialect::Dialect;
use crate::error::RenderError;
use crate::rules::{apply_rules, default_rule_table, RuleTable};

/// Translate already-rendered SQL from the canonical dialect into
/// `target`, using the bundled default pattern table.
///
/// Pipeline stages: `INIT -> STRING_PROTECT -> RULE_LOOP -> TEMP_EMUL ->
/// HINT_EXPAND -> DONE`. String protection itself lives inside the rule
/// engine (it is recomputed once per rule pass), so this function's job
/// is only to sequence the remaining stages in order.
pub fn translate(
    sql: &str,
    target: Dialect,
    temp_emulation_schema: Option<&str>,
) -> Result<String, RenderError> {
    translate_with_table(sql, target, temp_emulation_schema, default_rule_table())
}

/// Same as [`translate`], but against a caller-supplied rule table
/// rather than the bundled default (used by tests and by callers that
/// load their own pattern table for local testing).
pub fn translate_with_table(
    sql: &str,
    target: Dialect,
    temp_emulation_schema: Option<&str>,
    table: &RuleTable,
) -> Result<String, RenderError> {
    let rules = table.rules_for(target);
    let after_rules = apply_rules(sql, rules);

    let after_temp = if target.requires_temp_emulation() {
        temp_emulation::rewrite_temp_tables(&after_rules, target, temp_emulation_schema)?
    } else {
        after_rules
    };

    let after_hints = if target.supports_mpp_hints() {
        hints::expand_hints(&after_temp, target)
    } else {
        after_temp
    };

    Ok(after_hints)
}
