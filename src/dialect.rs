//! The fixed set of SQL dialects this engine translates to, and the
//! canonical source dialect translation always starts from.

use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    SqlServer,
    Oracle,
    PostgreSql,
    Redshift,
    Pdw,
    Impala,
    Netezza,
    BigQuery,
    Snowflake,
    Synapse,
    Spark,
    Sqlite,
    SqliteExtended,
    Iris,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::SqlServer => "sql server",
            Dialect::Oracle => "oracle",
            Dialect::PostgreSql => "postgresql",
            Dialect::Redshift => "redshift",
            Dialect::Pdw => "pdw",
            Dialect::Impala => "impala",
            Dialect::Netezza => "netezza",
            Dialect::BigQuery => "bigquery",
            Dialect::Snowflake => "snowflake",
            Dialect::Synapse => "synapse",
            Dialect::Spark => "spark",
            Dialect::Sqlite => "sqlite",
            Dialect::SqliteExtended => "sqlite extended",
            Dialect::Iris => "iris",
        }
    }

    /// Dialects that lack true session-local temp tables and therefore
    /// need `#name` references rewritten.
    pub fn requires_temp_emulation(&self) -> bool {
        matches!(
            self,
            Dialect::Oracle
                | Dialect::BigQuery
                | Dialect::Impala
                | Dialect::Spark
                | Dialect::Snowflake
                | Dialect::Redshift
        )
    }

    /// Dialects that understand the MPP hint expansions.
    pub fn supports_mpp_hints(&self) -> bool {
        matches!(self, Dialect::Pdw | Dialect::Redshift | Dialect::Synapse)
    }

    /// Maximum length, in characters, of an identifier emitted for this
    /// dialect's temp-table emulation, including schema-free name and
    /// salt suffix. Measured as the ASCII length of the unquoted
    /// identifier.
    pub fn max_identifier_length(&self) -> usize {
        match self {
            Dialect::Oracle => 30,
            Dialect::Redshift => 127,
            Dialect::Impala => 128,
            Dialect::Spark => 128,
            Dialect::Snowflake => 255,
            Dialect::BigQuery => 300,
            _ => 128,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "sql server" | "sqlserver" => Dialect::SqlServer,
            "oracle" => Dialect::Oracle,
            "postgresql" | "postgres" => Dialect::PostgreSql,
            "redshift" => Dialect::Redshift,
            "pdw" => Dialect::Pdw,
            "impala" => Dialect::Impala,
            "netezza" => Dialect::Netezza,
            "bigquery" => Dialect::BigQuery,
            "snowflake" => Dialect::Snowflake,
            "synapse" | "azure synapse" => Dialect::Synapse,
            "spark" | "apache spark" => Dialect::Spark,
            "sqlite" => Dialect::Sqlite,
            "sqlite extended" | "sqlite-extended" => Dialect::SqliteExtended,
            "iris" => Dialect::Iris,
            other => {
                return Err(RenderError::Dialect {
                    name: other.to_string(),
                })
            }
        })
    }
}
