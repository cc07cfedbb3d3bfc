//! Report orchestration.
//!
//! Components:
//! - `facade`: picks the backend, runs the scan and the log read, and
//!   carries per-section outcomes so "nothing found" and "substrate failed"
//!   stay distinguishable.
//! - `visibility`: the viewer input and the self-view filter.

pub mod facade;
pub mod visibility;

pub use facade::{Aggregator, Report, SectionStatus};
pub use visibility::Viewer;
