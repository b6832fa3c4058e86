use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Process-wide guard for the speech devices. Only one utterance and one
/// capture can be in flight, so only one session may hold them.
#[derive(Debug, Default)]
pub struct CapabilityArbiter {
    held: AtomicBool,
}

impl CapabilityArbiter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns `None` while another lease is alive.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CapabilityLease> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                debug!("Speech capabilities acquired");
                CapabilityLease {
                    arbiter: Arc::clone(self),
                }
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Exclusive hold on the speech devices, released on drop.
#[derive(Debug)]
pub struct CapabilityLease {
    arbiter: Arc<CapabilityArbiter>,
}

impl Drop for CapabilityLease {
    fn drop(&mut self) {
        self.arbiter.held.store(false, Ordering::Release);
        debug!("Speech capabilities released");
    }
}
