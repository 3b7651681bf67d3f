//! Per-request context passed to base-store reads.

/// Additive flags for one base-store call.
///
/// `use_master` forces the read onto the authoritative replica. The
/// decorator sets it after a local write invalidated the key being read,
/// so a fast-follow read cannot re-cache a stale value from a lagging
/// read replica. It is per-call state, never stored on a sub-store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub use_master: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same context, redirected to the master replica.
    #[must_use]
    pub fn with_master(mut self) -> Self {
        self.use_master = true;
        self
    }
}
