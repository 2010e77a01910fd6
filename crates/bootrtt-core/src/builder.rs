use crate::config::defaults::MAX_PROBE_TIMEOUT;
use crate::config::StrategyConfig;
use crate::error::{Error, Result};
use crate::queue::TargetQueue;
use crate::types::ProbeId;
use crate::Prober;
use std::time::Duration;

/// Build a prober.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> anyhow::Result<()> {
/// use bootrtt_core::{Builder, Target, TargetQueue};
/// use std::time::Duration;
///
/// let target = Target::new("boot1.example", "192.0.2.1:6421".parse()?);
/// let queue = TargetQueue::from_targets(vec![target], 10);
/// let results = Builder::new(queue)
///     .probe_timeout(Duration::from_secs(2))
///     .build()?
///     .run_udp("0.0.0.0:0".parse()?)
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Prober`] - A sequential round trip time prober.
#[derive(Debug)]
pub struct Builder {
    queue: TargetQueue,
    probe_timeout: Duration,
    initial_identifier: ProbeId,
}

impl Builder {
    /// Build a prober for a queue of targets.
    #[must_use]
    pub fn new(queue: TargetQueue) -> Self {
        Self {
            queue,
            probe_timeout: StrategyConfig::default().probe_timeout,
            initial_identifier: StrategyConfig::default().initial_identifier,
        }
    }

    /// How long to wait for each response.
    #[must_use]
    pub fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// The identifier of the first probe.
    #[must_use]
    pub fn initial_identifier(self, initial_identifier: u64) -> Self {
        Self {
            initial_identifier: ProbeId(initial_identifier),
            ..self
        }
    }

    /// Build the `Prober`.
    ///
    /// Fails with [`Error::BadConfig`] if the probe timeout is zero or greater than
    /// [`MAX_PROBE_TIMEOUT`].
    pub fn build(self) -> Result<Prober> {
        if self.probe_timeout.is_zero() {
            return Err(Error::BadConfig(String::from(
                "probe_timeout must be greater than zero",
            )));
        }
        if self.probe_timeout > MAX_PROBE_TIMEOUT {
            return Err(Error::BadConfig(format!(
                "probe_timeout ({:?}) must not be greater than {MAX_PROBE_TIMEOUT:?}",
                self.probe_timeout
            )));
        }
        Ok(Prober::new(
            self.queue,
            StrategyConfig {
                probe_timeout: self.probe_timeout,
                initial_identifier: self.initial_identifier,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Target;
    use std::net::SocketAddr;
    use test_case::test_case;

    fn queue() -> TargetQueue {
        let target = Target::new("a", SocketAddr::from(([192, 0, 2, 1], 6421)));
        TargetQueue::from_targets(vec![target], 2)
    }

    #[test]
    fn test_defaults() {
        let prober = Builder::new(queue()).build().unwrap();
        assert_eq!(Duration::from_secs(5), prober.probe_timeout());
        assert_eq!(ProbeId(1), prober.initial_identifier());
        assert_eq!(2, prober.queue().len());
    }

    #[test]
    fn test_overrides() {
        let prober = Builder::new(queue())
            .probe_timeout(Duration::from_millis(250))
            .initial_identifier(6421)
            .build()
            .unwrap();
        assert_eq!(Duration::from_millis(250), prober.probe_timeout());
        assert_eq!(ProbeId(6421), prober.initial_identifier());
    }

    #[test]
    fn test_zero_timeout() {
        let err = Builder::new(queue())
            .probe_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test]
    fn test_max_timeout() {
        let prober = Builder::new(queue())
            .probe_timeout(MAX_PROBE_TIMEOUT)
            .build()
            .unwrap();
        assert_eq!(MAX_PROBE_TIMEOUT, prober.probe_timeout());
    }

    #[test_case(MAX_PROBE_TIMEOUT + Duration::from_millis(1); "just above the maximum")]
    #[test_case(Duration::from_secs(10 * 365 * 24 * 60 * 60); "ten years")]
    #[test_case(Duration::MAX; "max duration")]
    fn test_excessive_timeout(probe_timeout: Duration) {
        let err = Builder::new(queue())
            .probe_timeout(probe_timeout)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }
}
