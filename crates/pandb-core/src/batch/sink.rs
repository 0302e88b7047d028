//! Output sinks. Both flush after every record so an interrupted run keeps
//! everything up to the last completed URL.

use anyhow::{Context, Result};
use std::io::Write;

pub const CSV_HEADER: [&str; 3] = ["URL", "Local Category", "Cloud Category"];

/// One resolved URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub url: String,
    pub local_category: String,
    pub cloud_category: String,
}

/// CSV result stream: header, then one line per resolved URL.
pub struct ResultSink<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl<W: Write> ResultSink<W> {
    /// Writes the header immediately.
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);
        writer
            .write_record(CSV_HEADER)
            .context("failed to write CSV header")?;
        writer.flush().context("failed to flush output")?;
        Ok(Self { writer, written: 0 })
    }

    pub fn emit(&mut self, record: &OutputRecord) -> Result<()> {
        self.writer
            .write_record([
                record.url.as_str(),
                record.local_category.as_str(),
                record.cloud_category.as_str(),
            ])
            .with_context(|| format!("failed to write result for {}", record.url))?;
        self.writer.flush().context("failed to flush output")?;
        self.written += 1;
        Ok(())
    }

    /// Data lines written so far (header excluded).
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Plain list of URLs that could not be categorized, one per line.
pub struct BadUrlSink<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> BadUrlSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn record(&mut self, url: &str) -> Result<()> {
        writeln!(self.inner, "{url}")
            .and_then(|_| self.inner.flush())
            .with_context(|| format!("failed to record bad URL {url}"))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }
}
