//! Wire envelope and payload schemas.
//!
//! An envelope is a JSON object carrying a numeric kind and the payload as
//! base64 encoded JSON bytes:
//!
//! ```text
//! {"message_type_status": 3, "data": "eyJ1c2VyX25hbWUiOiJhbGljZSIsInRleHRfZGF0YSI6ImhpIn0="}
//! ```
//!
//! Decoding happens in two steps: [`Envelope::parse`] reads the outer object,
//! then [`Envelope::into_message`] interprets the payload once the kind is known.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use super::codec::MAX_FRAME_LENGTH;

/// Message kind carried in `message_type_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Error,
    Notification,
    OpenConnect,
    SendMessage,
    GetOnlineUsers,
    OnlineUsers,
}

impl MessageKind {
    /// Numeric code used on the wire
    pub fn code(self) -> u8 {
        match self {
            MessageKind::Error => 0,
            MessageKind::Notification => 1,
            MessageKind::OpenConnect => 2,
            MessageKind::SendMessage => 3,
            MessageKind::GetOnlineUsers => 4,
            MessageKind::OnlineUsers => 5,
        }
    }

    /// Resolve a wire code into a kind
    pub fn from_code(code: u8) -> Result<Self, CodecError> {
        match code {
            0 => Ok(MessageKind::Error),
            1 => Ok(MessageKind::Notification),
            2 => Ok(MessageKind::OpenConnect),
            3 => Ok(MessageKind::SendMessage),
            4 => Ok(MessageKind::GetOnlineUsers),
            5 => Ok(MessageKind::OnlineUsers),
            other => Err(CodecError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Error => "Error",
            MessageKind::Notification => "Notification",
            MessageKind::OpenConnect => "OpenConnect",
            MessageKind::SendMessage => "SendMessage",
            MessageKind::GetOnlineUsers => "GetOnlineUsers",
            MessageKind::OnlineUsers => "OnlineUsers",
        };
        f.write_str(name)
    }
}

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The outer envelope is not valid JSON or its `data` is not valid base64
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// `message_type_status` is outside the known range
    #[error("unknown message kind: {0}")]
    UnknownKind(u8),

    /// The payload does not match the schema of its kind
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: MessageKind, reason: String },

    /// Serialization of an in-memory message failed
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// The encoded envelope does not fit in one frame
    #[error("encoded message is {len} bytes, above the frame limit of {max}")]
    FrameTooLarge { len: usize, max: usize },
}

/// Payload of [`MessageKind::Error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub error_text: String,
}

/// Payload of [`MessageKind::Notification`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub notification_message: String,
}

/// Payload of [`MessageKind::OpenConnect`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenConnectData {
    pub user_name: String,
}

/// Payload of [`MessageKind::SendMessage`]
///
/// `user_name` is optional inbound; the server always overwrites it before relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessageData {
    #[serde(default)]
    pub user_name: String,
    pub text_data: String,
}

/// Payload of [`MessageKind::OnlineUsers`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUsersData {
    pub count: usize,
    pub user_names: Vec<String>,
}

/// Typed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Error(ErrorData),
    Notification(NotificationData),
    OpenConnect(OpenConnectData),
    SendMessage(TextMessageData),
    GetOnlineUsers,
    OnlineUsers(OnlineUsersData),
}

impl Message {
    pub fn error(error_text: impl Into<String>) -> Self {
        Message::Error(ErrorData {
            error_text: error_text.into(),
        })
    }

    pub fn notification(notification_message: impl Into<String>) -> Self {
        Message::Notification(NotificationData {
            notification_message: notification_message.into(),
        })
    }

    pub fn open_connect(user_name: impl Into<String>) -> Self {
        Message::OpenConnect(OpenConnectData {
            user_name: user_name.into(),
        })
    }

    pub fn send_message(user_name: impl Into<String>, text_data: impl Into<String>) -> Self {
        Message::SendMessage(TextMessageData {
            user_name: user_name.into(),
            text_data: text_data.into(),
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Error(_) => MessageKind::Error,
            Message::Notification(_) => MessageKind::Notification,
            Message::OpenConnect(_) => MessageKind::OpenConnect,
            Message::SendMessage(_) => MessageKind::SendMessage,
            Message::GetOnlineUsers => MessageKind::GetOnlineUsers,
            Message::OnlineUsers(_) => MessageKind::OnlineUsers,
        }
    }
}

/// Outer envelope as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_type_status: u8,
    /// Base64 of the payload JSON. `null` and absent both mean an empty payload.
    #[serde(default)]
    pub data: Option<String>,
}

impl Envelope {
    /// Parse the outer envelope without interpreting the payload
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
    }

    /// Resolve the kind and interpret the payload against its schema
    pub fn into_message(self) -> Result<Message, CodecError> {
        let kind = MessageKind::from_code(self.message_type_status)?;
        let payload = match self.data {
            Some(data) => STANDARD
                .decode(data)
                .map_err(|e| CodecError::MalformedEnvelope(e.to_string()))?,
            None => Vec::new(),
        };

        let message = match kind {
            MessageKind::Error => Message::Error(parse_payload(kind, &payload)?),
            MessageKind::Notification => Message::Notification(parse_payload(kind, &payload)?),
            MessageKind::OpenConnect => Message::OpenConnect(parse_payload(kind, &payload)?),
            MessageKind::SendMessage => Message::SendMessage(parse_payload(kind, &payload)?),
            // the payload of GetOnlineUsers carries nothing and is never inspected
            MessageKind::GetOnlineUsers => Message::GetOnlineUsers,
            MessageKind::OnlineUsers => Message::OnlineUsers(parse_payload(kind, &payload)?),
        };
        Ok(message)
    }
}

fn parse_payload<T: DeserializeOwned>(kind: MessageKind, payload: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(payload).map_err(|e| CodecError::MalformedPayload {
        kind,
        reason: e.to_string(),
    })
}

fn payload_bytes<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(payload).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode one envelope into a typed message
pub fn decode(bytes: &[u8]) -> Result<Message, CodecError> {
    Envelope::parse(bytes)?.into_message()
}

/// Encode a typed message into envelope bytes
///
/// Fails with [`CodecError::FrameTooLarge`] when the envelope would not fit
/// in a single frame, so no caller ever queues a frame the codec rejects.
pub fn encode(message: &Message) -> Result<Bytes, CodecError> {
    let payload = match message {
        Message::Error(data) => Some(payload_bytes(data)?),
        Message::Notification(data) => Some(payload_bytes(data)?),
        Message::OpenConnect(data) => Some(payload_bytes(data)?),
        Message::SendMessage(data) => Some(payload_bytes(data)?),
        Message::GetOnlineUsers => None,
        Message::OnlineUsers(data) => Some(payload_bytes(data)?),
    };

    let envelope = Envelope {
        message_type_status: message.kind().code(),
        data: payload.map(|bytes| STANDARD.encode(bytes)),
    };
    let bytes = serde_json::to_vec(&envelope).map_err(|e| CodecError::Encode(e.to_string()))?;
    if bytes.len() > MAX_FRAME_LENGTH {
        return Err(CodecError::FrameTooLarge {
            len: bytes.len(),
            max: MAX_FRAME_LENGTH,
        });
    }
    Ok(Bytes::from(bytes))
}
