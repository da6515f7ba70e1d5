//! Writable sinks shared between backend instances

// Standard library
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

// External dependencies
use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// A cloneable, thread-safe sink for encoded records
///
/// Clones share the same underlying writer; each record is written
/// under the lock so lines from concurrent handles never interleave.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
    kind: SinkKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkKind {
    Stderr,
    Stdout,
    Custom,
}

impl SharedWriter {
    /// Wrap an arbitrary writer
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
            kind: SinkKind::Custom,
        }
    }

    /// Standard error, the default sink
    pub fn stderr() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(io::stderr()))),
            kind: SinkKind::Stderr,
        }
    }

    /// Standard output
    pub fn stdout() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(io::stdout()))),
            kind: SinkKind::Stdout,
        }
    }

    /// Whether this is the process standard error stream
    pub fn is_stderr(&self) -> bool {
        self.kind == SinkKind::Stderr
    }

    /// Whether two handles point at the same underlying sink
    pub fn same_sink(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SinkGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkGuard(self.inner.lock())
    }
}

/// Exclusive access to a sink for the duration of one record
///
/// The sink is flushed when the guard is dropped.
pub struct SinkGuard<'a>(MutexGuard<'a, Box<dyn Write + Send>>);

impl Write for SinkGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        let _ = self.0.flush();
    }
}

impl fmt::Debug for SinkGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SinkGuard")
    }
}

impl Default for SharedWriter {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWriter")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// In-memory sink, handy for capturing output
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Captured output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<MemoryWriter> for SharedWriter {
    fn from(writer: MemoryWriter) -> Self {
        Self::new(writer)
    }
}

impl From<std::fs::File> for SharedWriter {
    fn from(file: std::fs::File) -> Self {
        Self::new(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_writer_shared_between_clones() {
        let mem = MemoryWriter::new();
        let sink = SharedWriter::from(mem.clone());
        sink.make_writer().write_all(b"first\n").unwrap();
        sink.clone().make_writer().write_all(b"second\n").unwrap();
        assert_eq!(mem.lines(), vec!["first", "second"]);
        mem.clear();
        assert!(mem.contents().is_empty());
    }

    #[test]
    fn test_sink_identity() {
        let a = SharedWriter::stderr();
        let b = a.clone();
        assert!(a.is_stderr());
        assert!(a.same_sink(&b));
        assert!(!a.same_sink(&SharedWriter::stderr()));
        assert!(!SharedWriter::stdout().is_stderr());
    }
}
