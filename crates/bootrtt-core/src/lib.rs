//! bootrtt - A sequential round trip time prober.
//!
//! This crate provides the probe engine used by the bootrtt application to
//! measure round trip times to a set of bootstrap peers.
//!
//! Targets are probed strictly one at a time. Each probe carries a unique
//! identifier which the peer echoes back in its response. A probe is resolved
//! either by a matching response, which records a round trip time sample, or by
//! its timeout expiring. The next probe is sent as soon as the previous one is
//! resolved. Per-target attempt counts and samples are collected in a
//! [`ResultTable`], from which a [`Report`] can be produced.
//!
//! # Example
//!
//! The following example probes two bootstrap peers three times each over UDP
//! and prints the report:
//!
//! ```no_run
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! use bootrtt_core::{Builder, Report, Target, TargetQueue};
//!
//! let targets = vec![
//!     Target::new("boot1.example", "192.0.2.1:6421".parse()?),
//!     Target::new("boot2.example", "192.0.2.2:6421".parse()?),
//! ];
//! let results = Builder::new(TargetQueue::from_targets(targets, 3))
//!     .build()?
//!     .run_udp("0.0.0.0:0".parse()?)
//!     .await?;
//! for row in Report::from(&results).summary {
//!     println!("{row}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Prober`].
//! - [`Prober::run_udp`] - Run the prober over a UDP socket.
//! - [`Prober::run`] - Run the prober with a custom [`Transport`].
//! - [`Responder`] - Answer probes sent by a [`Prober`].
#![forbid(unsafe_code)]

mod builder;
mod config;
mod error;
mod net;
mod pending;
mod probe;
mod prober;
mod queue;
mod report;
mod state;
mod strategy;
mod types;

/// The probe wire format.
pub mod packet;

pub use builder::Builder;
pub use config::{defaults, StrategyConfig};
pub use error::{Error, IoError, IoOperation, IoResult, Result};
pub use net::responder::Responder;
pub use net::udp::UdpTransport;
pub use net::{Transport, MAX_PACKET_SIZE};
pub use pending::{PendingProbe, PendingRegistry};
pub use probe::{ProbeKind, ProbeMessage, Response};
pub use prober::Prober;
pub use queue::{Labeller, NamedHost, PlaceholderLabels, Target, TargetQueue};
pub use report::{DetailRow, Report, SummaryRow};
pub use state::{ResultTable, TargetStats};
pub use strategy::Strategy;
pub use types::{IdAllocator, ProbeId};
