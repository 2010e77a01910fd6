use crate::state::ResultTable;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

/// The final report of a probe run.
///
/// A projection of a [`ResultTable`] into a per-target summary and a per-sample detail listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub summary: Vec<SummaryRow>,
    pub details: Vec<DetailRow>,
}

/// The attempts and responses for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub addr: SocketAddr,
    pub attempts: usize,
    pub responses: usize,
}

/// A single observed round trip time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub addr: SocketAddr,
    pub rtt: Duration,
}

impl From<&ResultTable> for Report {
    fn from(table: &ResultTable) -> Self {
        let summary = table
            .iter()
            .map(|(target, stats)| SummaryRow {
                label: target.label.clone(),
                addr: target.addr,
                attempts: stats.attempts(),
                responses: stats.responses(),
            })
            .collect();
        let details = table
            .iter()
            .flat_map(|(target, stats)| {
                stats.rtts().iter().map(|rtt| DetailRow {
                    label: target.label.clone(),
                    addr: target.addr,
                    rtt: *rtt,
                })
            })
            .collect();
        Self { summary, details }
    }
}

impl Display for SummaryRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.label, self.addr, self.attempts, self.responses
        )
    }
}

impl Display for DetailRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {:.6}",
            self.label,
            self.addr,
            self.rtt.as_secs_f64()
        )
    }
}
