use crate::simulation::{Response as SimResponse, Simulation};
use bootrtt_core::{Error, IoError, ProbeId, ProbeMessage, Response, Result, Transport};
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The offset applied to the identifier of foreign responses.
const FOREIGN_OFFSET: u64 = 1_000_000;

/// A `Transport` which answers probes as described by a `Simulation`.
pub struct SimTransport {
    sim: Arc<Simulation>,
    tx: mpsc::UnboundedSender<Response>,
    sent: HashMap<SocketAddr, usize>,
    ids: Arc<Mutex<Vec<ProbeId>>>,
}

impl SimTransport {
    pub fn new(
        sim: Arc<Simulation>,
        ids: Arc<Mutex<Vec<ProbeId>>>,
    ) -> (Self, mpsc::UnboundedReceiver<Response>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            sim,
            tx,
            sent: HashMap::new(),
            ids,
        };
        (transport, rx)
    }
}

impl Transport for SimTransport {
    fn send_probe(&mut self, addr: SocketAddr, probe: ProbeMessage) -> Result<()> {
        self.ids.lock().unwrap().push(probe.id);
        let target = self
            .sim
            .target(addr)
            .ok_or_else(|| Error::Other(format!("unknown target {addr}")))?;
        if matches!(target.resp, SimResponse::SendFailure) {
            debug!(id = %probe.id, %addr, "simulating send failure");
            return Err(Error::ProbeFailed(IoError::SendTo(
                io::Error::from(io::ErrorKind::AddrNotAvailable),
                addr,
            )));
        }
        let nth = self.sent.entry(addr).or_default();
        let delay = target.resp.delay_for(*nth);
        *nth += 1;
        if self.sim.noise {
            let foreign = ProbeId(probe.id.0.wrapping_add(FOREIGN_OFFSET));
            self.tx.send(Response::new(foreign, addr)).ok();
        }
        if let Some(delay) = delay {
            info!(id = %probe.id, %addr, ?delay, "simulating response");
            let tx = self.tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                tx.send(Response::new(probe.id, addr)).ok();
            });
        } else {
            info!(id = %probe.id, %addr, "simulating no response");
        }
        Ok(())
    }
}
