//! Cycle statistics and display derivations.
//!
//! # Responsibility
//! - Compute averages, day counts and predictions from record slices.
//! - Shape results for the presentation layer.

pub mod cycle;
pub mod summary;
