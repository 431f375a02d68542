//! Flutter bridge for CycleTrack core.

pub mod api;
