//! Pattern table loader and capture/backreference rule engine.

mod matcher;
mod pattern_table;

pub use matcher::{apply_rules, compile_pattern, string_protect, CompiledRule, PatternElem};
pub use pattern_table::{default_rule_table, RuleTable};
