//! Server execution logic: the accept loop and admission control.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::SinkExt;
use parlor_shared::protocol::{EnvelopeCodec, Message};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use crate::{config::ServerConfig, domain::ConnectionId};

use super::{session::ClientSession, signal::shutdown_signal, state::AppState};

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// TCP chat relay server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::load("config.json")?;
/// Server::from_config(&config).run(&config.bind_addr()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(Arc::new(AppState::from_config(config)))
    }

    /// Bind `bind_addr` and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run(self, bind_addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        match listener.local_addr() {
            Ok(addr) => tracing::info!("Chat server listening on {}", addr),
            Err(_) => tracing::info!("Chat server listening on {}", bind_addr),
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Accept connections on `listener` until `shutdown` resolves
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            self.admit(stream, peer);
        }
    }

    fn admit(&self, stream: TcpStream, peer: SocketAddr) {
        let gate = &self.state.admission_gate;
        let Some(slot) = gate.try_acquire() else {
            tracing::warn!(
                "Rejecting client({}): server is full [{}/{}]",
                peer,
                gate.in_use(),
                gate.capacity()
            );
            let error_text = format!(
                "The maximum number of users has been reached on the server [{}/{}]",
                gate.in_use(),
                gate.capacity()
            );
            tokio::spawn(reject(stream, peer, error_text, self.state.write_timeout));
            return;
        };

        tracing::info!("client({}) connected", peer);
        tracing::info!("max: {} / now: {}", gate.capacity(), gate.in_use());

        let session =
            ClientSession::new(ConnectionId::generate(), peer.to_string(), self.state.clone());
        tokio::spawn(session.run(stream, slot));
    }
}

/// Tell a client the server is full, then close the connection
async fn reject(stream: TcpStream, peer: SocketAddr, error_text: String, write_timeout: Duration) {
    let mut framed = Framed::new(stream, EnvelopeCodec::new());

    match tokio::time::timeout(write_timeout, framed.send(Message::error(error_text))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Failed to send rejection to client({}): {}", peer, e),
        Err(_) => tracing::debug!("Sending rejection to client({}) timed out", peer),
    }
    if tokio::time::timeout(write_timeout, SinkExt::<Message>::close(&mut framed))
        .await
        .is_err()
    {
        tracing::debug!("Closing rejected client({}) timed out", peer);
    }
}
