use super::types::{FieldSpec, REQUIRED_TABLES, TableKind, TableSpec};
use std::path::Path;

/// Engine options used when no include file is mounted.
pub const DEFAULT_ENGINE_OPTIONS: &str = "charset_table = 'cjk, non_cjk'";

/// Column prepended to every table.
pub const INVALID_JSON_FIELD: &str = "invalidjson";

/// Parses a `type=name|type=name|...` rule string into columns.
///
/// `text` becomes an indexed text column, `url` expands to three indexed text
/// columns (`_host_path`, `_query`, `_anchor`), anything else is passed through
/// as the column's storage type. `invalidjson` always comes first. Fragments
/// without both a type and a name are skipped.
pub fn parse_field_rules(rules: &str) -> Vec<FieldSpec> {
    let mut fields = vec![FieldSpec::text_indexed(INVALID_JSON_FIELD)];

    for fragment in rules.split('|') {
        let mut parts = fragment.split('=');
        let field_type = parts.next().unwrap_or_default().trim();
        let name = parts.next().unwrap_or_default().trim();

        if field_type.is_empty() || name.is_empty() {
            if !fragment.trim().is_empty() {
                tracing::debug!("Skipping malformed field rule '{}'", fragment);
            }
            continue;
        }

        match field_type {
            "text" => fields.push(FieldSpec::text_indexed(name)),
            "url" => {
                fields.push(FieldSpec::text_indexed(format!("{}_host_path", name)));
                fields.push(FieldSpec::text_indexed(format!("{}_query", name)));
                fields.push(FieldSpec::text_indexed(format!("{}_anchor", name)));
            }
            other => fields.push(FieldSpec::new(name, other)),
        }
    }

    fields
}

/// Column layout shared by all provisioned tables.
///
/// Built once at start-up from the field rules and is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    fields: Vec<FieldSpec>,
    engine_options: String,
}

impl TableLayout {
    pub fn new(rules: &str, engine_options: impl Into<String>) -> Self {
        Self {
            fields: parse_field_rules(rules),
            engine_options: engine_options.into(),
        }
    }

    /// Reads the engine options clause from `path`, falling back to the default clause.
    pub fn load_engine_options(path: &Path) -> String {
        match std::fs::read_to_string(path) {
            Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
            Ok(_) => DEFAULT_ENGINE_OPTIONS.to_string(),
            Err(e) => {
                tracing::debug!(
                    "No engine options at {} ({}), using defaults",
                    path.display(),
                    e
                );
                DEFAULT_ENGINE_OPTIONS.to_string()
            }
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn engine_options(&self) -> &str {
        &self.engine_options
    }

    pub fn table(&self, name: &str, kind: TableKind) -> TableSpec {
        TableSpec {
            name: name.to_string(),
            kind,
            fields: self.fields.clone(),
            engine_options: self.engine_options.clone(),
        }
    }

    /// The percolate and real-time tables, in the order they must be created.
    pub fn required_tables(&self) -> Vec<TableSpec> {
        REQUIRED_TABLES
            .iter()
            .map(|(name, kind)| self.table(name, *kind))
            .collect()
    }
}
