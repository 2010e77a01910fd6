use crate::queue::Target;
use indexmap::IndexMap;
use std::time::Duration;

/// The results of a probe run, keyed by target.
///
/// Targets are kept in the order they were first attempted.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    targets: IndexMap<Target, TargetStats>,
}

impl ResultTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a probe was dispatched to `target`.
    pub fn record_attempt(&mut self, target: &Target) {
        self.entry(target).attempts += 1;
    }

    /// Record that a probe to `target` was answered after `rtt`.
    pub fn record_success(&mut self, target: &Target, rtt: Duration) {
        self.entry(target).add_sample(rtt);
    }

    /// The statistics for a single target.
    #[must_use]
    pub fn get(&self, target: &Target) -> Option<&TargetStats> {
        self.targets.get(target)
    }

    /// All targets with their statistics, in the order they were first attempted.
    pub fn iter(&self) -> impl Iterator<Item = (&Target, &TargetStats)> {
        self.targets.iter()
    }

    /// The number of distinct targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The total number of probes dispatched across all targets.
    #[must_use]
    pub fn total_attempts(&self) -> usize {
        self.targets.values().map(TargetStats::attempts).sum()
    }

    /// The total number of responses received across all targets.
    #[must_use]
    pub fn total_responses(&self) -> usize {
        self.targets.values().map(TargetStats::responses).sum()
    }

    fn entry(&mut self, target: &Target) -> &mut TargetStats {
        if !self.targets.contains_key(target) {
            self.targets.insert(target.clone(), TargetStats::default());
        }
        &mut self.targets[target]
    }
}

/// The statistics for a single target.
#[derive(Debug, Clone, Default)]
pub struct TargetStats {
    /// The number of probes dispatched.
    attempts: usize,
    /// The round trip time of every answered probe, in dispatch order.
    rtts: Vec<Duration>,
    best: Option<Duration>,
    worst: Option<Duration>,
    mean: f64,
    m2: f64,
}

impl TargetStats {
    /// The number of probes dispatched.
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// The number of probes answered.
    #[must_use]
    pub fn responses(&self) -> usize {
        self.rtts.len()
    }

    /// The round trip time of every answered probe, in dispatch order.
    #[must_use]
    pub fn rtts(&self) -> &[Duration] {
        &self.rtts
    }

    /// The % of probes that went unanswered.
    #[must_use]
    pub fn loss_pct(&self) -> f64 {
        if self.attempts > 0 {
            let lost = self.attempts.saturating_sub(self.responses());
            lost as f64 / self.attempts as f64 * 100_f64
        } else {
            0_f64
        }
    }

    /// The duration of the fastest response.
    #[must_use]
    pub fn best_ms(&self) -> Option<f64> {
        self.best.map(|best| best.as_secs_f64() * 1000_f64)
    }

    /// The duration of the slowest response.
    #[must_use]
    pub fn worst_ms(&self) -> Option<f64> {
        self.worst.map(|worst| worst.as_secs_f64() * 1000_f64)
    }

    /// The average duration of all responses.
    #[must_use]
    pub const fn avg_ms(&self) -> f64 {
        self.mean
    }

    /// The sample standard deviation of all responses.
    #[must_use]
    pub fn stddev_ms(&self) -> f64 {
        if self.rtts.len() > 1 {
            (self.m2 / (self.rtts.len() - 1) as f64).sqrt()
        } else {
            0_f64
        }
    }

    fn add_sample(&mut self, rtt: Duration) {
        let rtt_ms = rtt.as_secs_f64() * 1000_f64;
        self.rtts.push(rtt);
        self.best = self.best.map_or(Some(rtt), |d| Some(d.min(rtt)));
        self.worst = self.worst.map_or(Some(rtt), |d| Some(d.max(rtt)));
        // Welford's online algorithm
        let delta = rtt_ms - self.mean;
        self.mean += delta / self.rtts.len() as f64;
        self.m2 += delta * (rtt_ms - self.mean);
    }
}
