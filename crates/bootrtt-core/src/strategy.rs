use self::session::Session;
use crate::config::StrategyConfig;
use crate::error::{Error, Result};
use crate::net::Transport;
use crate::probe::{ProbeMessage, Response};
use crate::queue::TargetQueue;
use crate::state::ResultTable;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

/// Probe a queue of targets, strictly one probe at a time.
#[derive(Debug, Clone)]
pub struct Strategy {
    config: StrategyConfig,
}

impl Strategy {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: &StrategyConfig) -> Self {
        debug!(?config);
        Self { config: *config }
    }

    /// Probe every target in the queue and return the results.
    ///
    /// A single probe is in flight at any time. The next probe is sent as soon as the previous one
    /// is resolved, either by a matching response arriving on `responses` or by its timeout
    /// expiring. The run ends once the queue is exhausted and the final probe has been resolved.
    ///
    /// If the `responses` channel closes the run continues, with every remaining probe resolved by
    /// timeout.
    #[instrument(skip_all, level = "trace")]
    pub async fn run<T: Transport>(
        self,
        queue: TargetQueue,
        mut transport: T,
        mut responses: mpsc::UnboundedReceiver<Response>,
    ) -> Result<ResultTable> {
        let mut session = Session::new(self.config, queue);
        let mut responses_open = true;
        Self::advance(&mut transport, &mut session)?;
        while !session.is_done() {
            tokio::select! {
                response = responses.recv(), if responses_open => match response {
                    Some(response) => Self::on_response(&mut transport, &mut session, response)?,
                    None => {
                        debug!("response channel closed");
                        responses_open = false;
                    }
                },
                Some(probe) = session.next_expired() => {
                    debug!(id = %probe.id, target = %probe.target, "probe timed out");
                    session.expire(probe.id);
                    Self::advance(&mut transport, &mut session)?;
                },
                else => return Err(Error::Other(String::from("no probe in flight"))),
            }
        }
        Ok(session.into_results())
    }

    /// Send a probe to the next target, or finish if there are none left.
    ///
    /// A probe which fails to send stays pending and is resolved by its timeout.
    fn advance<T: Transport>(transport: &mut T, session: &mut Session) -> Result<()> {
        let Some(target) = session.next_target() else {
            debug!("all targets probed");
            return Ok(());
        };
        let id = session.dispatch(&target, Instant::now())?;
        debug!(%id, %target, "sending probe");
        match transport.send_probe(target.addr, ProbeMessage::request(id)) {
            Ok(()) => Ok(()),
            Err(Error::ProbeFailed(err)) => {
                warn!(%id, %target, %err, "failed to send probe");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Handle a response, discarding it if it does not match the probe in flight.
    fn on_response<T: Transport>(
        transport: &mut T,
        session: &mut Session,
        response: Response,
    ) -> Result<()> {
        if let Some((probe, rtt)) = session.complete(response.id, Instant::now()) {
            let (id, target, from) = (probe.id, &probe.target, response.from);
            debug!(%id, %target, %from, ?rtt, "received response");
            Self::advance(transport, session)
        } else {
            trace!(id = %response.id, from = %response.from, "discarding unsolicited response");
            Ok(())
        }
    }
}

/// Mutable state for a single probe run.
mod session {
    use crate::config::StrategyConfig;
    use crate::error::Result;
    use crate::pending::{PendingProbe, PendingRegistry};
    use crate::queue::{Target, TargetQueue};
    use crate::state::ResultTable;
    use crate::types::{IdAllocator, ProbeId};
    use std::time::Duration;
    use tokio::time::Instant;

    /// The state of the driver.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub enum DriverState {
        /// No probe is in flight.
        Idle,
        /// Exactly one probe, with this id, is in flight.
        AwaitingResponse(ProbeId),
        /// The queue is exhausted.
        Done,
    }

    /// Owns the queue, the in-flight probe and the results of a run.
    pub struct Session {
        queue: TargetQueue,
        pending: PendingRegistry,
        results: ResultTable,
        ids: IdAllocator,
        state: DriverState,
    }

    impl Session {
        pub fn new(config: StrategyConfig, queue: TargetQueue) -> Self {
            Self {
                queue,
                pending: PendingRegistry::new(config.probe_timeout),
                results: ResultTable::new(),
                ids: IdAllocator::new(config.initial_identifier),
                state: DriverState::Idle,
            }
        }

        /// Take the next target from the queue, moving to `Done` if it is empty.
        pub fn next_target(&mut self) -> Option<Target> {
            let target = self.queue.pop();
            if target.is_none() {
                self.state = DriverState::Done;
            }
            target
        }

        /// Register a probe to `target` sent at `sent` and return its id.
        pub fn dispatch(&mut self, target: &Target, sent: Instant) -> Result<ProbeId> {
            let id = self.ids.next_id();
            self.pending
                .add(PendingProbe::new(id, target.clone(), sent))?;
            self.results.record_attempt(target);
            self.state = DriverState::AwaitingResponse(id);
            Ok(id)
        }

        /// Resolve the probe `id` as answered at `received`.
        ///
        /// Returns `None`, leaving all state untouched, if no such probe is pending.
        pub fn complete(
            &mut self,
            id: ProbeId,
            received: Instant,
        ) -> Option<(PendingProbe, Duration)> {
            let probe = self.pending.resolve(id)?;
            let rtt = received.saturating_duration_since(probe.sent);
            self.results.record_success(&probe.target, rtt);
            self.state = DriverState::Idle;
            Some((probe, rtt))
        }

        /// Mark the probe `id`, already removed by its timer, as timed out.
        pub fn expire(&mut self, id: ProbeId) {
            if self.state == DriverState::AwaitingResponse(id) {
                self.state = DriverState::Idle;
            }
        }

        /// Wait for the probe in flight to time out.
        pub async fn next_expired(&mut self) -> Option<PendingProbe> {
            self.pending.next_expired().await
        }

        #[cfg(test)]
        pub const fn state(&self) -> DriverState {
            self.state
        }

        pub fn is_done(&self) -> bool {
            self.state == DriverState::Done
        }

        #[cfg(test)]
        pub const fn results(&self) -> &ResultTable {
            &self.results
        }

        pub fn into_results(self) -> ResultTable {
            self.results
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::net::SocketAddr;

        fn session(repeat: usize) -> Session {
            let target = Target::new("a", SocketAddr::from(([192, 0, 2, 1], 6421)));
            let config = StrategyConfig {
                initial_identifier: ProbeId(100),
                ..StrategyConfig::default()
            };
            Session::new(config, TargetQueue::from_targets(vec![target], repeat))
        }

        #[tokio::test(start_paused = true)]
        async fn test_session_lifecycle() {
            let mut session = session(1);
            assert_eq!(DriverState::Idle, session.state());
            let target = session.next_target().unwrap();
            let id = session.dispatch(&target, Instant::now()).unwrap();
            assert_eq!(ProbeId(100), id);
            assert_eq!(DriverState::AwaitingResponse(id), session.state());
            tokio::time::advance(Duration::from_millis(15)).await;
            let (probe, rtt) = session.complete(id, Instant::now()).unwrap();
            assert_eq!(target, probe.target);
            assert_eq!(Duration::from_millis(15), rtt);
            assert_eq!(DriverState::Idle, session.state());
            assert_eq!(None, session.next_target());
            assert!(session.is_done());
        }

        #[tokio::test(start_paused = true)]
        async fn test_complete_unknown_id_is_noop() {
            let mut session = session(1);
            let target = session.next_target().unwrap();
            let id = session.dispatch(&target, Instant::now()).unwrap();
            assert!(session.complete(ProbeId(99), Instant::now()).is_none());
            assert_eq!(DriverState::AwaitingResponse(id), session.state());
            let stats = session.results().get(&target).unwrap();
            assert_eq!(1, stats.attempts());
            assert_eq!(0, stats.responses());
        }

        #[tokio::test(start_paused = true)]
        async fn test_complete_twice_is_noop() {
            let mut session = session(1);
            let target = session.next_target().unwrap();
            let id = session.dispatch(&target, Instant::now()).unwrap();
            assert!(session.complete(id, Instant::now()).is_some());
            assert!(session.complete(id, Instant::now()).is_none());
            assert_eq!(1, session.results().get(&target).unwrap().responses());
        }

        #[tokio::test(start_paused = true)]
        async fn test_expire_other_id_is_noop() {
            let mut session = session(2);
            let target = session.next_target().unwrap();
            let id = session.dispatch(&target, Instant::now()).unwrap();
            session.expire(ProbeId(1));
            assert_eq!(DriverState::AwaitingResponse(id), session.state());
            session.expire(id);
            assert_eq!(DriverState::Idle, session.state());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use crate::net::MockTransport;
    use crate::queue::Target;
    use crate::types::ProbeId;
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn target(label: &str, port: u16) -> Target {
        Target::new(label, SocketAddr::from(([192, 0, 2, 1], port)))
    }

    fn strategy() -> Strategy {
        Strategy::new(&StrategyConfig {
            probe_timeout: TIMEOUT,
            initial_identifier: ProbeId(1),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_respond() -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport
            .expect_send_probe()
            .times(6)
            .returning(move |addr, probe| {
                tx.send(Response::new(probe.id, addr)).unwrap();
                Ok(())
            });
        let queue = TargetQueue::from_targets(vec![target("a", 1), target("b", 2)], 3);
        let start = Instant::now();
        let results = strategy().run(queue, transport, rx).await?;
        assert_eq!(Duration::ZERO, start.elapsed());
        assert_eq!(6, results.total_attempts());
        assert_eq!(6, results.total_responses());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_advance_queue() -> anyhow::Result<()> {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport.expect_send_probe().times(3).returning(|_, _| Ok(()));
        let queue = TargetQueue::from_targets(vec![target("a", 1)], 3);
        let start = Instant::now();
        let results = strategy().run(queue, transport, rx).await?;
        assert!(start.elapsed() >= TIMEOUT * 3);
        let stats = results.get(&target("a", 1)).unwrap();
        assert_eq!(3, stats.attempts());
        assert_eq!(0, stats.responses());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsolicited_responses_ignored() -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let foreign = SocketAddr::from(([198, 51, 100, 1], 9999));
        tx.send(Response::new(ProbeId(1000), foreign))?;
        let mut transport = MockTransport::new();
        transport
            .expect_send_probe()
            .times(2)
            .returning(move |addr, probe| {
                tx.send(Response::new(ProbeId(probe.id.0 + 500), foreign))
                    .unwrap();
                tx.send(Response::new(probe.id, addr)).unwrap();
                tx.send(Response::new(probe.id, addr)).unwrap();
                Ok(())
            });
        let queue = TargetQueue::from_targets(vec![target("a", 1)], 2);
        let results = strategy().run(queue, transport, rx).await?;
        let stats = results.get(&target("a", 1)).unwrap();
        assert_eq!(2, stats.attempts());
        assert_eq!(2, stats.responses());
        assert_eq!(1, results.len());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_after_timeout_ignored() -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        let late = tx.clone();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send_probe()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |addr, probe| {
                let late = late.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(TIMEOUT + Duration::from_secs(1)).await;
                    late.send(Response::new(probe.id, addr)).unwrap();
                });
                Ok(())
            });
        transport
            .expect_send_probe()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |addr, probe| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    tx.send(Response::new(probe.id, addr)).unwrap();
                });
                Ok(())
            });
        let queue = TargetQueue::from_targets(vec![target("a", 1), target("b", 2)], 1);
        let results = strategy().run(queue, transport, rx).await?;
        assert_eq!(0, results.get(&target("a", 1)).unwrap().responses());
        let b = results.get(&target("b", 2)).unwrap();
        assert_eq!(1, b.responses());
        assert!(b.rtts()[0] >= Duration::from_secs(2));
        assert!(b.rtts()[0] < Duration::from_secs(2) + Duration::from_millis(10));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_waits_for_timeout() -> anyhow::Result<()> {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport.expect_send_probe().times(1).returning(|addr, _| {
            Err(Error::ProbeFailed(IoError::SendTo(
                std::io::Error::from(std::io::ErrorKind::AddrNotAvailable),
                addr,
            )))
        });
        let queue = TargetQueue::from_targets(vec![target("a", 1)], 1);
        let start = Instant::now();
        let results = strategy().run(queue, transport, rx).await?;
        assert!(start.elapsed() >= TIMEOUT);
        let stats = results.get(&target("a", 1)).unwrap();
        assert_eq!(1, stats.attempts());
        assert_eq!(0, stats.responses());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_send_error_propagates() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport
            .expect_send_probe()
            .times(1)
            .returning(|_, _| Err(Error::Other(String::from("boom"))));
        let queue = TargetQueue::from_targets(vec![target("a", 1)], 2);
        let err = strategy().run(queue, transport, rx).await.unwrap_err();
        assert_eq!("prober error: boom", err.to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_resolves_by_timeout() -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel::<Response>();
        drop(tx);
        let mut transport = MockTransport::new();
        transport.expect_send_probe().times(2).returning(|_, _| Ok(()));
        let queue = TargetQueue::from_targets(vec![target("a", 1), target("b", 2)], 1);
        let results = strategy().run(queue, transport, rx).await?;
        assert_eq!(2, results.total_attempts());
        assert_eq!(0, results.total_responses());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue() -> anyhow::Result<()> {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut transport = MockTransport::new();
        transport.expect_send_probe().never();
        let results = strategy()
            .run(TargetQueue::default(), transport, rx)
            .await?;
        assert!(results.is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_identifiers_unique_and_sequential() -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(vec![]));
        let recorded = Arc::clone(&sent);
        let mut transport = MockTransport::new();
        transport
            .expect_send_probe()
            .times(10)
            .returning(move |addr, probe| {
                recorded.lock().unwrap().push(probe.id);
                tx.send(Response::new(probe.id, addr)).unwrap();
                Ok(())
            });
        let queue = TargetQueue::from_targets(vec![target("a", 1)], 10);
        strategy().run(queue, transport, rx).await?;
        let sent = sent.lock().unwrap().clone();
        assert_eq!((1..=10).map(ProbeId).collect::<Vec<_>>(), sent);
        assert_eq!(10, sent.iter().collect::<HashSet<_>>().len());
        Ok(())
    }
}
