//! Per-connection writer task.
//!
//! Only this task ever writes to a client's socket. Sessions and the
//! broadcaster push pre-encoded frames onto the connection's outbound queue;
//! the writer drains it in order with a bounded timeout per frame. The task
//! ends when every sender of the queue is gone or a write fails, and then
//! closes the sink.

use std::{io, time::Duration};

use bytes::Bytes;
use futures_util::{Sink, SinkExt};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::ConnectionId;

pub(crate) fn spawn_writer<W>(
    connection_id: ConnectionId,
    mut sink: W,
    mut outbound_rx: mpsc::Receiver<Bytes>,
    write_timeout: Duration,
) -> JoinHandle<()>
where
    W: Sink<Bytes, Error = io::Error> + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match tokio::time::timeout(write_timeout, sink.send(frame)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Failed to write to connection {}: {}", connection_id, e);
                    break;
                }
                Err(_) => {
                    tracing::warn!(
                        "Write to connection {} timed out after {:?}",
                        connection_id,
                        write_timeout
                    );
                    break;
                }
            }
        }

        // refuse further frames so that senders observe the closed queue
        outbound_rx.close();

        match tokio::time::timeout(write_timeout, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Failed to close connection {}: {}", connection_id, e),
            Err(_) => tracing::debug!("Closing connection {} timed out", connection_id),
        }
        tracing::debug!("Writer for connection {} stopped", connection_id);
    })
}
