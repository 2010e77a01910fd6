use derive_more::Display;

/// `ProbeId` newtype.
///
/// The request identifier embedded in every probe and echoed back in every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Display)]
pub struct ProbeId(pub u64);

/// Allocates probe identifiers for a single session.
///
/// Identifiers are handed out from a monotonically increasing counter starting at the configured
/// initial value.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: ProbeId,
}

impl IdAllocator {
    #[must_use]
    pub const fn new(initial: ProbeId) -> Self {
        Self { next: initial }
    }

    /// Return the next identifier.
    pub fn next_id(&mut self) -> ProbeId {
        let id = self.next;
        self.next = ProbeId(id.0.wrapping_add(1));
        id
    }
}
