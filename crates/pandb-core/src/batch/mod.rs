//! The batch loop: for each URL, look up → parse → emit.
//!
//! Strictly sequential over one session. Every URL lands in exactly one of
//! the two sinks; a failed URL never stops the run, a failed sink write does.

mod progress;
mod sink;

pub use progress::Progress;
pub use sink::{BadUrlSink, OutputRecord, ResultSink, CSV_HEADER};

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::lookup::{lookup_category, ClassificationClient, LookupResult};

/// Counts for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Read the URL list: one per line, trimmed, blank lines dropped.
pub fn read_urls<R: BufRead>(input: R) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read URL list")?;
        let url = line.trim();
        if !url.is_empty() {
            urls.push(url.to_string());
        }
    }
    Ok(urls)
}

/// Drives lookups over a borrowed client.
pub struct BatchLookup<'a, C: ClassificationClient + ?Sized> {
    client: &'a mut C,
    progress_interval: usize,
}

impl<'a, C: ClassificationClient + ?Sized> BatchLookup<'a, C> {
    pub fn new(client: &'a mut C, progress_interval: usize) -> Self {
        Self {
            client,
            progress_interval,
        }
    }

    /// Process `urls` in order. `status` gets `Bad URL: ...` and `count/total` lines.
    pub fn run<O, B, S>(
        &mut self,
        urls: &[String],
        output: &mut ResultSink<O>,
        bad_urls: &mut BadUrlSink<B>,
        status: &mut S,
    ) -> Result<BatchSummary>
    where
        O: Write,
        B: Write,
        S: Write + ?Sized,
    {
        let progress = Progress::new(urls.len(), self.progress_interval);
        let mut summary = BatchSummary::default();
        tracing::info!(total = urls.len(), "starting URL lookups");

        for (idx, url) in urls.iter().enumerate() {
            match lookup_category(&mut *self.client, url) {
                Ok(LookupResult::Resolved { local, cloud }) => {
                    tracing::debug!(url = %url, local = %local, cloud = %cloud, "resolved");
                    output.emit(&OutputRecord {
                        url: url.clone(),
                        local_category: local,
                        cloud_category: cloud,
                    })?;
                    summary.resolved += 1;
                }
                Ok(LookupResult::Unresolved) => {
                    tracing::debug!(url = %url, "response not in two-line format");
                    bad_urls.record(url)?;
                    summary.unresolved += 1;
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "lookup failed");
                    writeln!(status, "Bad URL: {url}")?;
                    bad_urls.record(url)?;
                    summary.unresolved += 1;
                }
            }

            summary.processed = idx + 1;
            if let Some(line) = progress.line_at(summary.processed) {
                writeln!(status, "{line}")?;
            }
        }

        tracing::info!(
            processed = summary.processed,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            "URL lookups finished"
        );
        Ok(summary)
    }
}
