//! Destination writer for one response body.
//!
//! The keep-or-discard decision is taken once, on the first body chunk, when
//! the headers (and so the cookies) are complete. The file is only created
//! when the body is kept.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

enum SinkState {
    Undecided,
    Discard,
    Write(BufWriter<File>),
    Failed,
}

pub(crate) struct BodySink<'a> {
    destination: &'a Path,
    capacity: usize,
    state: SinkState,
    written: u64,
    error: Option<io::Error>,
}

impl<'a> BodySink<'a> {
    pub(crate) fn new(destination: &'a Path, capacity: usize) -> Self {
        Self {
            destination,
            capacity,
            state: SinkState::Undecided,
            written: 0,
            error: None,
        }
    }

    pub(crate) fn destination(&self) -> &'a Path {
        self.destination
    }

    pub(crate) fn is_undecided(&self) -> bool {
        matches!(self.state, SinkState::Undecided)
    }

    /// Truncates/creates the destination when `keep` is true.
    pub(crate) fn decide(&mut self, keep: bool) {
        if !keep {
            self.state = SinkState::Discard;
            return;
        }
        self.state = match File::create(self.destination) {
            Ok(f) => SinkState::Write(BufWriter::with_capacity(self.capacity, f)),
            Err(e) => {
                self.error = Some(e);
                SinkState::Failed
            }
        };
    }

    /// Returns false when the transfer must be aborted.
    pub(crate) fn write(&mut self, data: &[u8]) -> bool {
        let result = match &mut self.state {
            SinkState::Undecided | SinkState::Discard => return true,
            SinkState::Failed => return false,
            SinkState::Write(w) => w.write_all(data),
        };
        match result {
            Ok(()) => {
                self.written += data.len() as u64;
                true
            }
            Err(e) => {
                tracing::warn!("write to {} failed: {}", self.destination.display(), e);
                self.error = Some(e);
                self.state = SinkState::Failed;
                false
            }
        }
    }

    pub(crate) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush and return the byte count. An undecided sink (empty body) still
    /// creates an empty destination file.
    pub(crate) fn finish(mut self) -> io::Result<u64> {
        if self.is_undecided() {
            self.decide(true);
        }
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        if let SinkState::Write(mut w) = self.state {
            w.flush()?;
        }
        Ok(self.written)
    }
}
