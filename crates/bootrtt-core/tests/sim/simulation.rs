use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// A simulated probe run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    pub name: String,
    pub repeat: usize,
    pub probe_timeout_ms: u64,
    pub initial_identifier: Option<u64>,
    /// Answer every probe with an additional response carrying a foreign identifier.
    #[serde(default)]
    pub noise: bool,
    pub targets: Vec<SimTarget>,
    pub expected: Vec<Expected>,
}

impl Simulation {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn target(&self, addr: SocketAddr) -> Option<&SimTarget> {
        self.targets.iter().find(|target| target.addr == addr)
    }
}

/// A simulated peer.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimTarget {
    pub label: String,
    pub addr: SocketAddr,
    pub resp: Response,
}

/// How a simulated peer answers probes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "tag")]
pub enum Response {
    /// Simulate a peer which never responds.
    NoResponse,
    /// Simulate a peer which cannot be sent to.
    SendFailure,
    /// Simulate a peer which responds to every probe after a fixed delay.
    Fixed(Fixed),
    /// Simulate a peer which responds to the nth probe after the nth delay, and to nothing after.
    Sequence(Sequence),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixed {
    /// The simulated round trip time (RTT) in ms.
    pub rtt_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sequence {
    /// The simulated round trip time (RTT) in ms of each probe in turn.
    pub rtt_ms: Vec<u64>,
}

impl Response {
    /// The delay before the nth probe to this peer is answered, if at all.
    pub fn delay_for(&self, nth: usize) -> Option<Duration> {
        match self {
            Self::NoResponse | Self::SendFailure => None,
            Self::Fixed(Fixed { rtt_ms }) => Some(Duration::from_millis(*rtt_ms)),
            Self::Sequence(Sequence { rtt_ms }) => {
                rtt_ms.get(nth).copied().map(Duration::from_millis)
            }
        }
    }
}

/// The expected results for one target.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expected {
    pub label: String,
    pub attempts: usize,
    pub responses: usize,
    #[serde(default)]
    pub rtt_ms: Vec<u64>,
}
