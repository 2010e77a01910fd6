use crate::app::RunInfo;
use crate::report::types::{Info, Report, Sample, TargetSummary};
use std::io::Write;
use tracing::instrument;

/// Generate a json report of the probe results.
#[instrument(skip_all, level = "trace")]
pub fn report(info: &RunInfo) -> anyhow::Result<()> {
    write_report(info, std::io::stdout())
}

fn write_report<W: Write>(info: &RunInfo, w: W) -> anyhow::Result<()> {
    let details = bootrtt_core::Report::from(&info.results).details;
    let report = Report {
        info: Info {
            start_timestamp: info.start_timestamp,
            end_timestamp: info.end_timestamp,
        },
        targets: info
            .results
            .iter()
            .map(|(target, stats)| TargetSummary::new(&target.label, target.addr, stats))
            .collect(),
        samples: details.iter().map(Sample::from).collect(),
    };
    serde_json::to_writer_pretty(w, &report)?;
    Ok(())
}
