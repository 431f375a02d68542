//! Domain model for recorded cycle dates.
//!
//! # Responsibility
//! - Define the record shape persisted in the key-value store.
//!
//! # Invariants
//! - A record is identified by its calendar date; no two records share one.

pub mod record;
