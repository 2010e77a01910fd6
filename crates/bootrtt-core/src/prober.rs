use crate::config::StrategyConfig;
use crate::error::Result;
use crate::net::udp::UdpTransport;
use crate::net::Transport;
use crate::probe::Response;
use crate::queue::TargetQueue;
use crate::state::ResultTable;
use crate::strategy::Strategy;
use crate::types::ProbeId;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::instrument;

/// A sequential round trip time prober.
///
/// Use the [`crate::Builder`] type to create a [`Prober`].
///
/// See the [`crate`] documentation for more information.
#[derive(Debug, Clone)]
pub struct Prober {
    queue: TargetQueue,
    config: StrategyConfig,
}

impl Prober {
    #[must_use]
    pub(crate) const fn new(queue: TargetQueue, config: StrategyConfig) -> Self {
        Self { queue, config }
    }

    /// Run the prober over a UDP socket bound to `bind_addr`.
    #[instrument(skip(self), level = "trace")]
    pub async fn run_udp(self, bind_addr: SocketAddr) -> Result<ResultTable> {
        let (transport, responses) = UdpTransport::bind(bind_addr).await?;
        self.run(transport, responses).await
    }

    /// Run the prober with a custom `Transport`.
    ///
    /// Responses to probes sent with `transport` must be delivered on `responses`.
    pub async fn run<T: Transport>(
        self,
        transport: T,
        responses: mpsc::UnboundedReceiver<Response>,
    ) -> Result<ResultTable> {
        Strategy::new(&self.config)
            .run(self.queue, transport, responses)
            .await
    }

    /// The queue of targets to be probed.
    #[must_use]
    pub const fn queue(&self) -> &TargetQueue {
        &self.queue
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.config.probe_timeout
    }

    #[must_use]
    pub const fn initial_identifier(&self) -> ProbeId {
        self.config.initial_identifier
    }
}
