//! Admission gate: a bounded, non-queueing counting semaphore.
//!
//! `try_acquire` either hands out a slot immediately or fails; callers never
//! wait. A slot is returned exactly once, either through
//! [`AdmissionSlot::release`] or when it is dropped on any other path.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Caps the number of concurrently active sessions
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One held unit of the gate's capacity
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionSlot {
    /// Return the slot to its gate
    pub fn release(self) {}
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Reserve a slot if fewer than `capacity` are held
    pub fn try_acquire(&self) -> Option<AdmissionSlot> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Some(AdmissionSlot { _permit: permit }),
            Err(TryAcquireError::NoPermits) => None,
            Err(TryAcquireError::Closed) => {
                tracing::warn!("Admission gate is closed; refusing connection");
                None
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity
            .saturating_sub(self.semaphore.available_permits())
    }
}
