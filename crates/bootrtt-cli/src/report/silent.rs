use crate::app::RunInfo;
use tracing::{debug, instrument};

/// Run the probes without generating any output.
#[instrument(skip_all, level = "trace")]
pub fn report(info: &RunInfo) -> anyhow::Result<()> {
    debug!(
        attempts = info.results.total_attempts(),
        responses = info.results.total_responses(),
        "probe run complete"
    );
    Ok(())
}
