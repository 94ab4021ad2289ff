//! TCP chat server implementation.

mod server;
mod session;
mod signal;
pub mod state;
mod writer;

pub use server::{Server, ServerError};
pub use session::ClientSession;
pub use state::AppState;
