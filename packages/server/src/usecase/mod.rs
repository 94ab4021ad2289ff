//! UseCase layer.
//!
//! One struct per operation a session can trigger. Each holds the domain
//! interfaces it needs behind `Arc<dyn ...>`.

pub mod authenticate_user;
pub mod disconnect_user;
pub mod error;
pub mod get_online_users;
pub mod send_message;

pub use authenticate_user::AuthenticateUserUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{AuthenticateError, SendMessageError};
pub use get_online_users::GetOnlineUsersUseCase;
pub use send_message::SendMessageUseCase;
