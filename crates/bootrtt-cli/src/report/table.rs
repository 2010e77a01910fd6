use crate::app::RunInfo;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};
use tracing::instrument;

/// Generate a Markdown table report of the probe results.
#[instrument(skip_all, level = "trace")]
pub fn report_md(info: &RunInfo) -> anyhow::Result<()> {
    println!("{}", summary_table(info, ASCII_MARKDOWN));
    Ok(())
}

/// Generate a pretty table report of the probe results.
#[instrument(skip_all, level = "trace")]
pub fn report_pretty(info: &RunInfo) -> anyhow::Result<()> {
    println!("{}", summary_table(info, UTF8_FULL));
    Ok(())
}

fn summary_table(info: &RunInfo, preset: &str) -> Table {
    let columns = vec![
        "Host", "Addr", "Loss%", "Snt", "Recv", "Avg", "Best", "Wrst", "StdDev",
    ];
    let mut table = Table::new();
    table
        .load_preset(preset)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns);
    for (target, stats) in info.results.iter() {
        let host = target.label.clone();
        let addr = target.addr.to_string();
        let loss_pct = format!("{:.1}", stats.loss_pct());
        let sent = stats.attempts().to_string();
        let recv = stats.responses().to_string();
        let avg = format!("{:.1}", stats.avg_ms());
        let best = stats
            .best_ms()
            .map_or_else(|| String::from("???"), |best| format!("{best:.1}"));
        let worst = stats
            .worst_ms()
            .map_or_else(|| String::from("???"), |worst| format!("{worst:.1}"));
        let stddev = format!("{:.1}", stats.stddev_ms());
        table.add_row(vec![
            &host, &addr, &loss_pct, &sent, &recv, &avg, &best, &worst, &stddev,
        ]);
    }
    table
}
