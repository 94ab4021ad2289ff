//! Parlor wire protocol.
//!
//! - `message`: envelope, message kinds and payload schemas
//! - `codec`: length-prefixed framing over a byte stream

pub mod codec;
pub mod message;

pub use codec::{EnvelopeCodec, MAX_FRAME_LENGTH};
pub use message::{
    CodecError, Envelope, ErrorData, Message, MessageKind, NotificationData, OnlineUsersData,
    OpenConnectData, TextMessageData, decode, encode,
};
