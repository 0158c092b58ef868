//! [`View`](crate::domain::kripke::View) implementations

pub mod json_lines;
pub mod recording;

pub use json_lines::JsonLinesView;
pub use recording::RecordingView;
