//! Schedule Model
//!
//! ```text
//! Schedule ── ScheduleThread* ── SnapshotSection* ── Timeslot*
//! ```
//!
//! Threads run concurrently with each other; everything inside a thread
//! runs sequentially.

mod schedule;
mod section;
mod thread;
mod timeslot;

pub use schedule::Schedule;
pub use section::SnapshotSection;
pub use thread::ScheduleThread;
pub use timeslot::Timeslot;
