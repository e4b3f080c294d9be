//! Secret scrubbing for log output.
//!
//! A [`Redactor`] is an append-only registry of sensitive values. It is handed to
//! the log subscriber through [`RedactingMakeWriter`], which buffers every formatted
//! event and masks registered values before the bytes reach the real writer.

use std::{borrow::Cow, io, sync::Arc};

use arc_swap::ArcSwap;
use tracing_subscriber::fmt::MakeWriter;

pub const MASK: &str = "***";

#[derive(Clone)]
pub struct Redactor {
    secrets: Arc<ArcSwap<Vec<String>>>,
}

impl Redactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value to be masked in all subsequent output. Empty values are ignored.
    pub fn register(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }

        self.secrets.rcu(|current| {
            if current.iter().any(|s| s == secret) {
                return Arc::clone(current);
            }

            let mut next: Vec<String> = (**current).clone();
            next.push(secret.to_string());
            // longest first, a secret containing another one must be masked whole
            next.sort_by(|a, b| b.len().cmp(&a.len()));
            Arc::new(next)
        });
    }

    pub fn len(&self) -> usize {
        self.secrets.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let secrets = self.secrets.load();

        let mut out = Cow::Borrowed(text);
        for secret in secrets.iter() {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), MASK));
            }
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self {
            secrets: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }
}

/// Wraps another [`MakeWriter`], masking registered secrets in everything written through it
pub struct RedactingMakeWriter<M> {
    redactor: Redactor,
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(redactor: Redactor, inner: M) -> Self {
        Self { redactor, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for RedactingMakeWriter<M> {
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            redactor: self.redactor.clone(),
            inner: self.inner.make_writer(),
            buf: Vec::new(),
        }
    }
}

/// Buffers one event and writes it redacted on flush or drop.
///
/// Buffering matters: a secret split across two `write` calls would otherwise slip through.
pub struct RedactingWriter<W: io::Write> {
    redactor: Redactor,
    inner: W,
    buf: Vec<u8>,
}

impl<W: io::Write> RedactingWriter<W> {
    fn write_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        {
            let text = String::from_utf8_lossy(&self.buf);
            let redacted = self.redactor.redact(&text);
            self.inner.write_all(redacted.as_bytes())?;
        }
        self.buf.clear();
        Ok(())
    }
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_buffered()?;
        self.inner.flush()
    }
}

impl<W: io::Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.write_buffered();
    }
}
