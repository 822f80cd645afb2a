//! Coordinator artifacts and phase sequencing.

pub mod artifacts;
pub mod phase;
pub mod record;
