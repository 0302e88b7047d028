//! The lookup run: open files, authenticate, stream results.

use anyhow::{Context, Result};
use pandb_core::batch::{self, BadUrlSink, BatchLookup, BatchSummary, ResultSink};
use pandb_core::config::PandbConfig;
use pandb_core::lookup::ClassificationClient;
use pandb_core::session;
use pandb_core::settings::{Credentials, InputSource, OutputTarget, RunConfig};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::Path;

pub fn run_lookup(run: &RunConfig, cfg: &PandbConfig) -> Result<()> {
    let mut status = io::stderr().lock();
    run_lookup_with(run, |creds| session::authenticate(creds, cfg), &mut status)?;
    Ok(())
}

/// Every file is opened before the session so that a bad path never costs a keygen,
/// but nothing is truncated until the session is established.
pub(crate) fn run_lookup_with<C, A, S>(
    run: &RunConfig,
    authenticate: A,
    status: &mut S,
) -> Result<BatchSummary>
where
    C: ClassificationClient,
    A: FnOnce(&Credentials) -> Result<C>,
    S: Write,
{
    let urls = match &run.input {
        InputSource::Stdin => batch::read_urls(io::stdin().lock())?,
        InputSource::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open input file {}", path.display()))?;
            batch::read_urls(BufReader::new(file))?
        }
    };
    tracing::info!(count = urls.len(), "read URL list");

    let out_file = match &run.output {
        OutputTarget::Stdout => None,
        OutputTarget::File(path) => Some((open_untruncated(path, "output file")?, path)),
    };
    let bad_file = open_untruncated(&run.bad_urls, "bad-URL file")?;

    let mut client = authenticate(&run.credentials)?;

    let output: Box<dyn Write> = match out_file {
        None => Box::new(io::stdout().lock()),
        Some((file, path)) => Box::new(truncate(file, path)?),
    };
    let mut output = ResultSink::new(output)?;
    let mut bad_urls = BadUrlSink::new(truncate(bad_file, &run.bad_urls)?);

    let summary = BatchLookup::new(&mut client, run.progress_interval).run(
        &urls,
        &mut output,
        &mut bad_urls,
        status,
    )?;

    anyhow::ensure!(
        output.written() == summary.resolved && bad_urls.written() == summary.unresolved,
        "sink counts ({} results, {} bad) disagree with summary {:?}",
        output.written(),
        bad_urls.written(),
        summary
    );
    writeln!(
        status,
        "Done: {} URLs, {} categorized, {} written to {}",
        summary.processed,
        output.written(),
        bad_urls.written(),
        run.bad_urls.display()
    )?;
    Ok(summary)
}

fn open_untruncated(path: &Path, what: &str) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("cannot open {what} {}", path.display()))
}

fn truncate(file: File, path: &Path) -> Result<File> {
    file.set_len(0)
        .with_context(|| format!("cannot truncate {}", path.display()))?;
    Ok(file)
}
