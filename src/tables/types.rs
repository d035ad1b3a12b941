use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Name of the percolate table every cluster member carries.
pub const PQ_TABLE: &str = "pq";
/// Name of the real-time table every cluster member carries.
pub const TESTS_TABLE: &str = "tests";

/// The tables the create-or-join protocol provisions, in creation order.
pub const REQUIRED_TABLES: [(&str, TableKind); 2] = [
    (PQ_TABLE, TableKind::Percolate),
    (TESTS_TABLE, TableKind::RealTime),
];

/// Storage engine of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Percolate,
    RealTime,
}

impl TableKind {
    /// The token the engine expects in `type='...'` and in the persisted record.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Percolate => "percolate",
            TableKind::RealTime => "rt",
        }
    }
}

impl FromStr for TableKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percolate" => Ok(TableKind::Percolate),
            "rt" => Ok(TableKind::RealTime),
            other => Err(ConfigError::UnknownTableKind(other.to_string())),
        }
    }
}

impl Serialize for TableKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TableKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Column type as written in DDL, e.g. `text indexed` or `int`.
    pub column_type: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }

    pub fn text_indexed(name: impl Into<String>) -> Self {
        Self::new(name, "text indexed")
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.name, self.column_type)
    }
}

/// A fully resolved table: name, engine, columns and the trailing options clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub kind: TableKind,
    pub fields: Vec<FieldSpec>,
    pub engine_options: String,
}

impl TableSpec {
    pub fn create_statement(&self) -> String {
        let columns = self
            .fields
            .iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({}) type='{}' {}",
            self.name, columns, self.kind, self.engine_options
        )
        .trim_end()
        .to_string()
    }
}
