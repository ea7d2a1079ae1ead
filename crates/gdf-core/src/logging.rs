//! tracing setup for the `gdf` binary.
//!
//! Logs go to `$XDG_STATE_HOME/gdf/gdf.log`, or to stderr when that file
//! cannot be opened. stdout is left to the CLI's progress lines.

use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,gdf=debug,gdf_core=debug,gdf_cli=debug";

/// Where log events ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Per-event writer: a clone of the log file handle, or stderr if cloning fails.
enum EventWriter {
    File(File),
    Stderr,
}

impl io::Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EventWriter::File(f) => f.write(buf),
            EventWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EventWriter::File(f) => f.flush(),
            EventWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFile(File);

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(EventWriter::File)
            .unwrap_or(EventWriter::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file() -> Result<(PathBuf, File)> {
    let path = xdg::BaseDirectories::with_prefix("gdf")?.place_state_file("gdf.log")?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global subscriber. Never fails: an unusable state dir means stderr.
pub fn init() -> LogTarget {
    let (target, writer) = match open_log_file() {
        Ok((path, file)) => (LogTarget::File(path), BoxMakeWriter::new(LogFile(file))),
        Err(_) => (LogTarget::Stderr, BoxMakeWriter::new(io::stderr)),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    if installed.is_ok() {
        tracing::info!("gdf logging to {:?}", target);
    }
    target
}
