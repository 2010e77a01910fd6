use crate::app::RunInfo;
use crate::report::types::fixed_width;
use bootrtt_core::{Target, TargetStats};
use serde::Serialize;
use std::io::Write;
use std::net::SocketAddr;
use tracing::instrument;

/// Generate a CSV report of the probe results.
#[instrument(skip_all, level = "trace")]
pub fn report(info: &RunInfo) -> anyhow::Result<()> {
    write_rows(info, std::io::stdout())
}

fn write_rows<W: Write>(info: &RunInfo, w: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    for (target, stats) in info.results.iter() {
        writer.serialize(CsvRow::new(target, stats))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
pub struct CsvRow {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Addr")]
    pub addr: SocketAddr,
    #[serde(rename = "Snt")]
    pub sent: usize,
    #[serde(rename = "Recv")]
    pub recv: usize,
    #[serde(rename = "Loss%")]
    #[serde(serialize_with = "fixed_width")]
    pub loss_pct: f64,
    #[serde(rename = "Avg")]
    #[serde(serialize_with = "fixed_width")]
    pub avg: f64,
    #[serde(rename = "Best")]
    pub best: String,
    #[serde(rename = "Wrst")]
    pub worst: String,
    #[serde(rename = "StdDev")]
    #[serde(serialize_with = "fixed_width")]
    pub stddev: f64,
}

impl CsvRow {
    fn new(target: &Target, stats: &TargetStats) -> Self {
        let best = stats
            .best_ms()
            .map_or_else(|| String::from("???"), |best| format!("{best:.1}"));
        let worst = stats
            .worst_ms()
            .map_or_else(|| String::from("???"), |worst| format!("{worst:.1}"));
        Self {
            host: target.label.clone(),
            addr: target.addr,
            sent: stats.attempts(),
            recv: stats.responses(),
            loss_pct: stats.loss_pct(),
            avg: stats.avg_ms(),
            best,
            worst,
            stddev: stats.stddev_ms(),
        }
    }
}
