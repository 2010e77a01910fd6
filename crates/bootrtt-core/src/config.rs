use crate::types::ProbeId;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `probe-timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// The largest supported `probe-timeout`.
    pub const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

    /// The default value for `repeat`.
    pub const DEFAULT_REPEAT: usize = 10;

    /// The default value for `initial-identifier`.
    pub const DEFAULT_INITIAL_IDENTIFIER: u64 = 1;
}

/// Prober configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StrategyConfig {
    /// How long to wait for a response before giving up on a probe.
    pub probe_timeout: Duration,
    /// The first identifier handed out by the session.
    pub initial_identifier: ProbeId,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            initial_identifier: ProbeId(defaults::DEFAULT_INITIAL_IDENTIFIER),
        }
    }
}
