//! Shared write sinks handed to runs and to the operator prompt.
//!
//! An [`OutputStream`] is a cheap cloneable handle; every clone writes into the same sink.
//! Writes are short and synchronous, so a plain mutex guards the sink.
use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, Mutex},
};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cloneable handle to a write sink with explicit flush.
#[derive(Clone)]
pub struct OutputStream {
    name: &'static str,
    sink: Sink,
}

impl OutputStream {
    /// Wrap any writer.
    pub fn new<W>(name: &'static str, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            name,
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Process standard output.
    pub fn stdout() -> Self {
        Self::new("stdout", io::stdout())
    }

    /// Process standard error.
    pub fn stderr() -> Self {
        Self::new("stderr", io::stderr())
    }

    /// In-memory stream plus a reader for everything written to it.
    pub fn capture(name: &'static str) -> (Self, Captured) {
        let buf = Captured::default();
        (Self::new(name, buf.clone()), buf)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.with_sink(|w| w.write_all(bytes))
    }

    /// Write `line` followed by a newline.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        self.with_sink(|w| {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")
        })
    }

    pub fn flush(&self) -> io::Result<()> {
        self.with_sink(|w| w.flush())
    }

    fn with_sink<T>(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .sink
            .lock()
            .map_err(|_| io::Error::other(format!("{} stream lock poisoned", self.name)))?;
        f(&mut **guard)
    }
}

impl fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream")
            .field("name", &self.name)
            .field("sink", &"<writer>")
            .finish()
    }
}

/// Reader side of [`OutputStream::capture`].
#[derive(Clone, Default)]
pub struct Captured {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        match self.buf.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }
}

impl Write for Captured {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::other("capture buffer lock poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
