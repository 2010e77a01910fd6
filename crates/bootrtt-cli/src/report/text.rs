use crate::app::RunInfo;
use anyhow::Context;
use bootrtt_core::Report;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::instrument;

const SUMMARY_HEADER: &str = "HOST_NAME ADDRESS REQUESTS RESPONSES";
const DETAIL_HEADER: &str = "HOST_NAME ADDRESS RTT";

/// Generate the plain summary and detail reports.
///
/// Each report is written to its file if one is given and to stdout otherwise. When both are
/// written to stdout they are separated by a blank line.
#[instrument(skip_all, level = "trace")]
pub fn report(
    info: &RunInfo,
    summary_file: Option<&str>,
    detail_file: Option<&str>,
) -> anyhow::Result<()> {
    let report = Report::from(&info.results);
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    match summary_file {
        Some(path) => write_file(path, |w| write_summary(&report, w))?,
        None => write_summary(&report, &mut stdout)?,
    }
    if summary_file.is_none() && detail_file.is_none() {
        writeln!(stdout)?;
    }
    match detail_file {
        Some(path) => write_file(path, |w| write_details(&report, w))?,
        None => write_details(&report, &mut stdout)?,
    }
    Ok(())
}

fn write_file<F>(path: &str, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("failed to write {path}"))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {path}"))
}

fn write_summary<W: Write>(report: &Report, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "{SUMMARY_HEADER}")?;
    for row in &report.summary {
        writeln!(w, "{row}")?;
    }
    Ok(())
}

fn write_details<W: Write>(report: &Report, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "{DETAIL_HEADER}")?;
    for row in &report.details {
        writeln!(w, "{row}")?;
    }
    Ok(())
}
