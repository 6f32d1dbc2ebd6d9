//! CSV pattern table loader: the rule table is data, not code.
//!
//! The wire format is deliberately boring: one row per rule, standard
//! CSV quoting, a required header naming `source_dialect`,
//! `target_dialect`, `pattern_search`, `pattern_replace` in that order.
//! File I/O is an external collaborator's job; this module only ever
//! sees already-loaded text.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::dialect::Dialect;
use crate::error::RenderError;
use crate::rules::matcher::{compile_pattern, CompiledRule};

const DEFAULT_PATTERNS_CSV: &str = include_str!("default_patterns.csv");

/// An ordered rule list per target dialect, compiled once at load time.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    by_target: HashMap<Dialect, Vec<CompiledRule>>,
}

impl RuleTable {
    /// Parse a pattern table from CSV text.
    ///
    /// Rows whose `target_dialect` is not one of the known dialects are
    /// silently ignored (the table may carry rules for dialects this
    /// build doesn't ship); rows whose `source_dialect` is unknown are
    /// a load-time error, since every rule is defined to originate from
    /// the canonical dialect and a typo there signals a corrupt table.
    pub fn parse(csv_text: &str) -> Result<RuleTable, RenderError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| RenderError::RuleLoad {
                message: format!("failed to read header row: {e}"),
            })?
            .clone();
        for expected in ["source_dialect", "target_dialect", "pattern_search", "pattern_replace"] {
            if !headers.iter().any(|h| h == expected) {
                return Err(RenderError::RuleLoad {
                    message: format!("missing required column '{expected}'"),
                });
            }
        }

        let mut table = RuleTable::default();
        for (row_num, record) in reader.records().enumerate() {
            let record = record.map_err(|e| RenderError::RuleLoad {
                message: format!("malformed row {}: {e}", row_num + 2),
            })?;
            let row: HashMap<&str, &str> = headers.iter().zip(record.iter()).collect();

            let source_text = row.get("source_dialect").copied().unwrap_or("");
            let source = Dialect::from_str(source_text).map_err(|_| RenderError::RuleLoad {
                message: format!(
                    "row {}: unknown source_dialect '{}'",
                    row_num + 2,
                    source_text
                ),
            })?;

            let target_text = row.get("target_dialect").copied().unwrap_or("");
            let target = match Dialect::from_str(target_text) {
                Ok(d) => d,
                Err(_) => continue, // unknown target dialect: ignore the row
            };

            let search = row.get("pattern_search").copied().unwrap_or("");
            let replace = row.get("pattern_replace").copied().unwrap_or("");

            table.by_target.entry(target).or_default().push(CompiledRule {
                source,
                target,
                pattern: compile_pattern(search),
                replace: replace.to_string(),
            });
        }

        Ok(table)
    }

    /// The ordered rule list for `target`, in load order. Empty if no
    /// rule in the table targets that dialect.
    pub fn rules_for(&self, target: Dialect) -> &[CompiledRule] {
        self.by_target.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }
}

static DEFAULT_TABLE: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::parse(DEFAULT_PATTERNS_CSV).expect("bundled default pattern table must parse")
});

/// The bundled default pattern table, parsed once and shared read-only
/// thereafter under a one-time initialization discipline.
pub fn default_rule_table() -> &'static RuleTable {
    &DEFAULT_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_table() {
        let csv = "source_dialect,target_dialect,pattern_search,pattern_replace\n\
                   sql server,oracle,TOP(@@@n),ROWNUM <= @@@n\n";
        let table = RuleTable::parse(csv).unwrap();
        assert_eq!(table.rules_for(Dialect::Oracle).len(), 1);
        assert_eq!(table.rules_for(Dialect::PostgreSql).len(), 0);
    }

    #[test]
    fn unknown_target_dialect_is_ignored() {
        let csv = "source_dialect,target_dialect,pattern_search,pattern_replace\n\
                   sql server,mysql,FOO,BAR\n";
        let table = RuleTable::parse(csv).unwrap();
        assert_eq!(table.rules_for(Dialect::Oracle).len(), 0);
    }

    #[test]
    fn unknown_source_dialect_is_a_load_error() {
        let csv = "source_dialect,target_dialect,pattern_search,pattern_replace\n\
                   mysql,oracle,FOO,BAR\n";
        assert!(RuleTable::parse(csv).is_err());
    }

    #[test]
    fn missing_header_column_is_a_load_error() {
        let csv = "source_dialect,target_dialect,pattern_search\nsql server,oracle,FOO\n";
        assert!(RuleTable::parse(csv).is_err());
    }

    #[test]
    fn default_table_loads_and_covers_oracle() {
        let table = default_rule_table();
        assert!(!table.rules_for(Dialect::Oracle).is_empty());
    }
}
