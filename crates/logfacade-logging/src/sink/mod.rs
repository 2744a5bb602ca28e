//! Sink writers
//!
//! Every fmt layer renders a whole record into one buffer and hands it to
//! [`SinkWriter::write_all`] while holding the sink's lock, so concurrent
//! records never interleave within a line.

mod capture;
mod rotating;

pub use capture::CaptureBuffer;
pub use rotating::RotatingFile;

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// A live destination owned by a logger
#[derive(Debug, Clone)]
pub(crate) enum Sink {
    Stdout,
    Stderr,
    File(Arc<Mutex<RotatingFile>>),
    Capture(CaptureBuffer),
}

impl Sink {
    pub(crate) fn is_terminal(&self) -> bool {
        match self {
            Sink::Stdout => io::stdout().is_terminal(),
            Sink::Stderr => io::stderr().is_terminal(),
            Sink::File(_) | Sink::Capture(_) => false,
        }
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        self.make_writer().flush()
    }
}

/// Locked handle for a single record write
pub(crate) enum SinkWriter<'a> {
    Stdout(io::StdoutLock<'static>),
    Stderr(io::StderrLock<'static>),
    File(MutexGuard<'a, RotatingFile>),
    Capture(MutexGuard<'a, Vec<u8>>),
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Sink::Stdout => SinkWriter::Stdout(io::stdout().lock()),
            Sink::Stderr => SinkWriter::Stderr(io::stderr().lock()),
            Sink::File(file) => {
                SinkWriter::File(file.lock().unwrap_or_else(PoisonError::into_inner))
            }
            Sink::Capture(buffer) => SinkWriter::Capture(buffer.lock()),
        }
    }
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Stdout(w) => w.write(buf),
            SinkWriter::Stderr(w) => w.write(buf),
            SinkWriter::File(w) => w.write(buf),
            SinkWriter::Capture(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(w) => w.write_all(buf),
            SinkWriter::Stderr(w) => w.write_all(buf),
            SinkWriter::File(w) => w.write_all(buf),
            SinkWriter::Capture(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(w) => w.flush(),
            SinkWriter::Stderr(w) => w.flush(),
            SinkWriter::File(w) => w.flush(),
            SinkWriter::Capture(w) => w.flush(),
        }
    }
}
