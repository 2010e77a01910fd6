use crate::config::defaults::MAX_PROBE_TIMEOUT;
use crate::error::{Error, Result};
use crate::queue::Target;
use crate::types::ProbeId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::time::delay_queue::Key;
use tokio_util::time::DelayQueue;

/// A probe which has been dispatched and is awaiting a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProbe {
    pub id: ProbeId,
    pub target: Target,
    pub sent: Instant,
}

impl PendingProbe {
    #[must_use]
    pub const fn new(id: ProbeId, target: Target, sent: Instant) -> Self {
        Self { id, target, sent }
    }
}

#[derive(Debug)]
struct Entry {
    probe: PendingProbe,
    timer: Key,
}

/// The registry of in-flight probes.
///
/// Each entry owns a timer which expires `timeout` after the probe was sent. An entry is removed
/// exactly once, either by [`PendingRegistry::resolve`] (which also cancels the timer) or by its
/// timer expiring.
pub struct PendingRegistry {
    timeout: Duration,
    entries: HashMap<ProbeId, Entry>,
    timers: DelayQueue<ProbeId>,
}

impl PendingRegistry {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: HashMap::new(),
            timers: DelayQueue::new(),
        }
    }

    /// Register a probe and arm its timeout.
    ///
    /// Fails with [`Error::DuplicateIdentifier`] if a probe with the same id is already pending and
    /// with [`Error::BadConfig`] if the timeout cannot be armed.
    pub fn add(&mut self, probe: PendingProbe) -> Result<()> {
        if self.entries.contains_key(&probe.id) {
            return Err(Error::DuplicateIdentifier(probe.id));
        }
        let deadline = probe
            .sent
            .checked_add(self.timeout)
            .filter(|_| self.timeout <= MAX_PROBE_TIMEOUT)
            .ok_or_else(|| {
                Error::BadConfig(format!("unsupported probe timeout: {:?}", self.timeout))
            })?;
        let timer = self.timers.insert_at(probe.id, deadline);
        self.entries.insert(probe.id, Entry { probe, timer });
        Ok(())
    }

    /// Remove a pending probe and cancel its timeout.
    ///
    /// Returns `None` if the probe has already been resolved or never existed.
    pub fn resolve(&mut self, id: ProbeId) -> Option<PendingProbe> {
        let entry = self.entries.remove(&id)?;
        self.timers.try_remove(&entry.timer);
        Some(entry.probe)
    }

    /// Wait for the next pending probe to time out and remove it.
    ///
    /// Returns `None` immediately if nothing is pending.
    pub async fn next_expired(&mut self) -> Option<PendingProbe> {
        loop {
            let expired = std::future::poll_fn(|cx| self.timers.poll_expired(cx)).await?;
            if let Some(entry) = self.entries.remove(expired.get_ref()) {
                return Some(entry.probe);
            }
        }
    }

    /// Is the probe with this id pending?
    #[must_use]
    pub fn is_pending(&self, id: ProbeId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
