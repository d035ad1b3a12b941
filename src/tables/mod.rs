//! Table Definitions
//!
//! Describes the tables every cluster member must carry and how their DDL is built.
//!
//! ## Core Concepts
//! - **Table kinds**: a closed set (`percolate`, `rt`). Unknown kinds are rejected when
//!   parsed, never deferred to the engine.
//! - **Field rules**: the column list comes from a `type=name|...` rule string supplied by
//!   the deployment. It is parsed once at start-up into a `TableLayout`.
//! - **Engine options**: a free-form trailing clause appended to every `CREATE TABLE`,
//!   optionally loaded from a mounted include file.

pub mod layout;
pub mod types;

pub use layout::{TableLayout, parse_field_rules};
pub use types::{FieldSpec, PQ_TABLE, REQUIRED_TABLES, TESTS_TABLE, TableKind, TableSpec};
