//! Variations
//!
//! Every legal execution of a section, then of a whole thread.
//!
//! ```text
//! ScheduleThreadVariations ── Pathway* ── SnapshotSectionPath* ── SectionStep*
//! ```

mod section;
mod thread;

pub use section::{SectionStep, SnapshotSectionPath, SnapshotSectionVariations};
pub use thread::{Pathway, ScheduleThreadVariations};
