//! Membership Persistence Module
//!
//! Keeps the last-known list of cluster members and table definitions on local disk.
//!
//! ## Core Mechanisms
//! - **Recoverable reads**: a missing or malformed file is treated as "no cluster yet";
//!   the next successful reconciliation repopulates it.
//! - **Set semantics**: the member list is only rewritten when the address *set* changes.
//!   Order and duplicates in the input never cause a write.
//! - **Atomic rewrite**: the whole record is written to a temporary file and renamed over
//!   the old one, so readers in other pods never see a partial file.

pub mod store;
pub mod types;

pub use store::MembershipStore;
pub use types::{ClusterEntry, MembershipRecord, TableDefinition};

#[cfg(test)]
mod tests;
