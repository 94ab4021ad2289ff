//! Infrastructure layer.
//!
//! Concrete implementations of the domain interfaces plus the admission gate.

pub mod admission;
pub mod broadcaster;
pub mod registry;

pub use admission::{AdmissionGate, AdmissionSlot};
pub use broadcaster::RegistryBroadcaster;
pub use registry::InMemoryUserRegistry;
