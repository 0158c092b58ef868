//! JSON Lines View
//!
//! Streams every committed state as one JSON object per line:
//!
//! ```text
//! {"id":0,"properties":{...},"is_initial":true,"edges":[...]}
//! {"id":1,...}
//! ```
//!
//! Output is buffered by the writer and flushed on `finish`.

use crate::domain::kripke::{KripkeState, View};
use crate::error::ViewError;
use std::io::Write;
use tracing::debug;

/// Newline-delimited JSON sink
#[derive(Debug)]
pub struct JsonLinesView<W: Write> {
    writer: W,
    using_clocks: bool,
    written: usize,
}

impl<W: Write> JsonLinesView<W> {
    /// Sink writing to `writer`
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            using_clocks: true,
            written: 0,
        }
    }

    /// Whether the last reset asked for clocks
    #[must_use]
    pub const fn using_clocks(&self) -> bool {
        self.using_clocks
    }

    /// Lines written since the last reset
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Returns the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> View for JsonLinesView<W> {
    fn reset(&mut self, using_clocks: bool) -> Result<(), ViewError> {
        self.using_clocks = using_clocks;
        self.written = 0;
        Ok(())
    }

    fn commit(&mut self, state: &KripkeState) -> Result<(), ViewError> {
        if self.using_clocks {
            serde_json::to_writer(&mut self.writer, state)?;
        } else {
            let mut untimed = state.clone();
            for edge in &mut untimed.edges {
                edge.clock_name = None;
                edge.constraint = None;
                edge.reset_clock = false;
            }
            serde_json::to_writer(&mut self.writer, &untimed)?;
        }
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ViewError> {
        self.writer.flush()?;
        debug!(states = self.written, "JSON lines view finished");
        Ok(())
    }
}
