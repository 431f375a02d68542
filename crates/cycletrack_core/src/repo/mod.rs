//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Define the load/save contract the tracker persists through.
//! - Keep serialization details out of the tracker service.
//!
//! # Invariants
//! - Repository APIs distinguish corrupt data (`InvalidData`) from store
//!   transport errors.

pub mod record_repo;
