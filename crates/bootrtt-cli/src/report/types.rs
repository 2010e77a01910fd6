use bootrtt_core::{DetailRow, TargetStats};
use chrono::Utc;
use serde::{Serialize, Serializer};
use std::net::SocketAddr;

#[derive(Serialize)]
pub struct Report {
    pub info: Info,
    pub targets: Vec<TargetSummary>,
    pub samples: Vec<Sample>,
}

#[derive(Serialize)]
pub struct Info {
    pub start_timestamp: chrono::DateTime<Utc>,
    pub end_timestamp: chrono::DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TargetSummary {
    pub host: String,
    pub addr: SocketAddr,
    pub sent: usize,
    pub recv: usize,
    #[serde(serialize_with = "fixed_width")]
    pub loss_pct: f64,
    #[serde(serialize_with = "fixed_width")]
    pub avg: f64,
    #[serde(serialize_with = "fixed_width")]
    pub best: f64,
    #[serde(serialize_with = "fixed_width")]
    pub worst: f64,
    #[serde(serialize_with = "fixed_width")]
    pub stddev: f64,
}

impl TargetSummary {
    pub fn new(host: &str, addr: SocketAddr, stats: &TargetStats) -> Self {
        Self {
            host: String::from(host),
            addr,
            sent: stats.attempts(),
            recv: stats.responses(),
            loss_pct: stats.loss_pct(),
            avg: stats.avg_ms(),
            best: stats.best_ms().unwrap_or_default(),
            worst: stats.worst_ms().unwrap_or_default(),
            stddev: stats.stddev_ms(),
        }
    }
}

#[derive(Serialize)]
pub struct Sample {
    pub host: String,
    pub addr: SocketAddr,
    pub rtt_ms: f64,
}

impl From<&DetailRow> for Sample {
    fn from(value: &DetailRow) -> Self {
        Self {
            host: value.label.clone(),
            addr: value.addr,
            rtt_ms: value.rtt.as_secs_f64() * 1000_f64,
        }
    }
}

pub fn fixed_width<S>(val: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{val:.2}"))
}
