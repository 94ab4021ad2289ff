//! Client session: the per-connection state machine.
//!
//! ```text
//! (admitted) -> Authenticating -> Active -> Closed
//!                     |                        ^
//!                     +------------------------+
//! ```
//!
//! A session is created only after the admission gate granted a slot.
//! `Authenticating` reads exactly one message, which must be an
//! `OpenConnect` with an acceptable name. `Active` loops over inbound
//! messages. `Closed` runs the teardown contract:
//!
//! 1. stop reading
//! 2. remove the connection from the registry
//! 3. close the connection (the writer flushes what is queued, then shuts down)
//! 4. release the admission slot
//! 5. optionally broadcast the "user left" notification
//!
//! Every frame for this client, replies included, goes through its outbound
//! queue; the writer task is the only one touching the socket.

use std::{io, sync::Arc};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use parlor_shared::protocol::{CodecError, EnvelopeCodec, Message, encode};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::codec::Framed;

use crate::{
    domain::{ConnectionId, OutboundChannel, UserName},
    infrastructure::AdmissionSlot,
};

use super::{state::AppState, writer::spawn_writer};

const UNKNOWN_SERVER_ERROR: &str = "unknown server error";

type InboundFrame = io::Result<Result<Message, CodecError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Authenticating,
    Active(UserName),
    /// Carries the name when the session had authenticated
    Closed(Option<UserName>),
}

pub struct ClientSession {
    connection_id: ConnectionId,
    peer: String,
    state: Arc<AppState>,
}

impl ClientSession {
    pub fn new(connection_id: ConnectionId, peer: impl Into<String>, state: Arc<AppState>) -> Self {
        Self {
            connection_id,
            peer: peer.into(),
            state,
        }
    }

    /// Drive the session to completion over `stream`
    ///
    /// `slot` is held for the whole session and released during teardown.
    pub async fn run<S>(self, stream: S, slot: AdmissionSlot)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (sink, mut frames) = Framed::new(stream, EnvelopeCodec::new()).split::<Bytes>();
        let (outbound, outbound_rx) = mpsc::channel(self.state.outbound_queue_capacity);
        let writer = spawn_writer(
            self.connection_id,
            sink,
            outbound_rx,
            self.state.write_timeout,
        );

        let mut session_state = SessionState::Authenticating;
        let user_name = loop {
            session_state = match session_state {
                SessionState::Authenticating => self.authenticate(&mut frames, &outbound).await,
                SessionState::Active(user_name) => {
                    self.receive(&mut frames, &outbound, user_name).await
                }
                SessionState::Closed(user_name) => break user_name,
            };
        };

        drop(frames);
        self.teardown(user_name, outbound, writer, slot).await;
    }

    async fn authenticate<R>(&self, frames: &mut R, outbound: &OutboundChannel) -> SessionState
    where
        R: Stream<Item = InboundFrame> + Unpin,
    {
        let message = match frames.next().await {
            Some(Ok(Ok(message))) => message,
            Some(Ok(Err(e))) => {
                // the input could not be parsed, so no reply is attempted
                tracing::warn!(
                    "client({}) sent an undecodable first message: {}",
                    self.peer,
                    e
                );
                return SessionState::Closed(None);
            }
            Some(Err(e)) => {
                tracing::warn!("client({}) read error before authenticating: {}", self.peer, e);
                return SessionState::Closed(None);
            }
            None => {
                tracing::info!("client({}) closed before authenticating", self.peer);
                return SessionState::Closed(None);
            }
        };

        match self
            .state
            .authenticate_user_usecase
            .execute(self.connection_id, message, outbound.clone())
            .await
        {
            Ok(user_name) => {
                tracing::info!(
                    "client({}) authenticated as '{}' (connection {})",
                    self.peer,
                    user_name,
                    self.connection_id
                );
                SessionState::Active(user_name)
            }
            Err(e) => {
                tracing::warn!("client({}) failed to authenticate: {}", self.peer, e);
                self.reply(outbound, Message::error(e.to_string())).await;
                SessionState::Closed(None)
            }
        }
    }

    async fn receive<R>(
        &self,
        frames: &mut R,
        outbound: &OutboundChannel,
        user_name: UserName,
    ) -> SessionState
    where
        R: Stream<Item = InboundFrame> + Unpin,
    {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(Ok(message))) => {
                    self.dispatch(message, outbound, &user_name).await;
                    SessionState::Active(user_name)
                }
                Some(Ok(Err(e))) => {
                    tracing::warn!("'{}' sent a malformed message: {}", user_name, e);
                    let text = format!("failed to convert message: {}", e);
                    self.reply(outbound, Message::error(text)).await;
                    SessionState::Active(user_name)
                }
                Some(Err(e)) => {
                    tracing::warn!("Read error from '{}': {}", user_name, e);
                    SessionState::Closed(Some(user_name))
                }
                None => SessionState::Closed(Some(user_name)),
            },
            _ = outbound.closed() => {
                tracing::warn!("Writer for '{}' stopped; closing session", user_name);
                SessionState::Closed(Some(user_name))
            }
        }
    }

    async fn dispatch(&self, message: Message, outbound: &OutboundChannel, user_name: &UserName) {
        match message {
            Message::SendMessage(data) => {
                match self
                    .state
                    .send_message_usecase
                    .execute(&self.connection_id, user_name, data)
                    .await
                {
                    Ok(report) => tracing::debug!(
                        "Relayed message from '{}' to {} user(s)",
                        user_name,
                        report.delivered
                    ),
                    Err(e) => {
                        tracing::error!("Failed to relay message from '{}': {}", user_name, e);
                        self.reply(outbound, Message::error(UNKNOWN_SERVER_ERROR))
                            .await;
                    }
                }
            }
            Message::GetOnlineUsers => {
                let online_users = self.state.get_online_users_usecase.execute().await;
                self.reply(outbound, Message::OnlineUsers(online_users))
                    .await;
            }
            other => {
                tracing::debug!("Ignoring {} message from '{}'", other.kind(), user_name);
            }
        }
    }

    /// Queue a message for this client only
    ///
    /// A reply that cannot be encoded is replaced by a generic `Error`.
    async fn reply(&self, outbound: &OutboundChannel, message: Message) {
        let frame = match encode(&message) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode reply for client({}): {}", self.peer, e);
                match encode(&Message::error(UNKNOWN_SERVER_ERROR)) {
                    Ok(frame) => frame,
                    Err(_) => return,
                }
            }
        };
        if outbound.send(frame).await.is_err() {
            tracing::debug!("client({}) is gone; reply dropped", self.peer);
        }
    }

    async fn teardown(
        &self,
        user_name: Option<UserName>,
        outbound: OutboundChannel,
        writer: JoinHandle<()>,
        slot: AdmissionSlot,
    ) {
        let disconnect = &self.state.disconnect_user_usecase;

        // the registry holds the other sender of the outbound queue
        disconnect.unregister(&self.connection_id).await;

        drop(outbound);
        if let Err(e) = writer.await {
            tracing::error!("Writer task for client({}) failed: {}", self.peer, e);
        }

        slot.release();
        let gate = &self.state.admission_gate;
        tracing::info!("client({}) disconnected", self.peer);
        tracing::info!("max: {} / now: {}", gate.capacity(), gate.in_use());

        if let Some(user_name) = user_name {
            match disconnect.announce_departure(&user_name).await {
                Ok(Some(report)) => tracing::debug!(
                    "Departure of '{}' announced to {} user(s)",
                    user_name,
                    report.delivered
                ),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to announce departure of '{}': {}", user_name, e)
                }
            }
        }
    }
}
