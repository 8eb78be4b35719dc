use crate::components::WindowReport;
use crate::record::FIELD_SEPARATOR;
use std::io::{self, BufWriter, Write};

/// Writes `begin|end|value` lines.
///
/// `push` is infallible so the writer can terminate a stage chain; the first
/// write error is kept and handed out by [`ReportWriter::check`], and later
/// pushes are dropped.
pub struct ReportWriter<W: Write> {
    inner: BufWriter<W>,
    error: Option<io::Error>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            error: None,
        }
    }

    pub fn push(&mut self, report: &WindowReport) {
        if self.error.is_some() {
            return;
        }
        let result = writeln!(
            self.inner,
            "{}{sep}{}{sep}{}",
            report.begin,
            report.end,
            report.average,
            sep = FIELD_SEPARATOR
        );
        if let Err(err) = result {
            self.error = Some(err);
        }
    }

    /// Returns the first write error since the last check, if any.
    pub fn check(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.check()?;
        self.inner.flush()
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        self.inner.into_inner().map_err(|err| err.into_error())
    }
}
