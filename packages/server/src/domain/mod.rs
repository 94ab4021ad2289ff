//! Domain layer.
//!
//! Value objects, domain errors and the interfaces (`UserRegistry`,
//! `Broadcaster`) that the infrastructure layer implements.

pub mod broadcaster;
pub mod error;
pub mod policy;
pub mod registry;
pub mod value_object;

pub use broadcaster::{Broadcaster, DeliveryReport};
pub use error::{BroadcastError, RegistryError, ValueObjectError};
pub use policy::UsernamePolicy;
pub use registry::{OnlineUsers, OutboundChannel, RegisteredConnection, UserRegistry};
pub use value_object::{ConnectionId, UserName};
