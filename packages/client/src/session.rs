//! Client session management: one TCP connection from login to close.

use futures_util::{SinkExt, Stream, StreamExt};
use parlor_shared::{
    protocol::{CodecError, EnvelopeCodec, Message, encode},
    time::get_timestamp_millis,
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::Framed;

use crate::{
    domain::{Command, classify_rejection, parse_command},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Run one client session against `addr`
///
/// Returns `Ok(())` when the user quits, and an error when the server
/// rejects the login or the connection is lost.
pub async fn run_client_session(
    addr: &str,
    user_name: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    let mut framed = Framed::new(stream, EnvelopeCodec::new());

    // The server does not acknowledge a login, so ask for the user list:
    // the answer arrives only once the name was accepted.
    send(&mut framed, Message::open_connect(user_name)).await?;
    send(&mut framed, Message::GetOnlineUsers).await?;
    login(&mut framed, user_name).await?;

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. \
         /users lists who is online, /quit exits.\n",
        user_name
    );
    redisplay_prompt(user_name);

    let (mut write, mut read) = framed.split::<Message>();

    // Spawn a task to handle incoming messages
    let user_name_for_read = user_name.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Ok(message)) => display(&message, &user_name_for_read),
                Ok(Err(e)) => tracing::warn!("Received an undecodable message: {}", e),
                Err(e) => return ClientError::ConnectionError(e.to_string()),
            }
        }
        ClientError::ConnectionError("server closed the connection".to_string())
    });

    let result = loop {
        tokio::select! {
            read_result = &mut read_task => {
                break Err(read_result.unwrap_or_else(|e| {
                    ClientError::ConnectionError(e.to_string())
                }));
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break Ok(());
                };
                let message = match parse_command(&line) {
                    None => continue,
                    Some(Command::Quit) => break Ok(()),
                    Some(Command::ListUsers) => Message::GetOnlineUsers,
                    Some(Command::Say(text)) => Message::send_message(user_name, text),
                };
                let is_chat = matches!(message, Message::SendMessage(_));
                // The server stamps the same name, so a line that does not fit
                // in a frame here would not fit on the relay either.
                if let Err(e) = encode(&message) {
                    tracing::warn!("Not sending message: {}", e);
                    print!("{}", MessageFormatter::format_local_error(&e.to_string()));
                    redisplay_prompt(user_name);
                    continue;
                }
                if let Err(e) = write.send(message).await {
                    tracing::warn!("Failed to send message: {}", e);
                    break Err(ClientError::ConnectionError(e.to_string()));
                }
                if is_chat {
                    let formatted =
                        MessageFormatter::format_sent_confirmation(get_timestamp_millis());
                    print!("{}", formatted);
                    redisplay_prompt(user_name);
                }
            }
        }
    };

    read_task.abort();
    result
}

async fn send(
    framed: &mut Framed<TcpStream, EnvelopeCodec>,
    message: Message,
) -> Result<(), ClientError> {
    framed
        .send(message)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

/// Wait for the answer to the login, displaying anything that arrives first
async fn login<S>(frames: &mut S, user_name: &str) -> Result<(), ClientError>
where
    S: Stream<Item = std::io::Result<Result<Message, CodecError>>> + Unpin,
{
    loop {
        match frames.next().await {
            Some(Ok(Ok(Message::Error(data)))) => {
                return Err(classify_rejection(&data.error_text, user_name));
            }
            Some(Ok(Ok(message @ Message::OnlineUsers(_)))) => {
                display(&message, user_name);
                return Ok(());
            }
            Some(Ok(Ok(message))) => display(&message, user_name),
            Some(Ok(Err(e))) => tracing::warn!("Received an undecodable message: {}", e),
            Some(Err(e)) => return Err(ClientError::ConnectionError(e.to_string())),
            None => {
                return Err(ClientError::ConnectionError(
                    "server closed the connection during login".to_string(),
                ));
            }
        }
    }
}

fn display(message: &Message, user_name: &str) {
    let formatted = match message {
        Message::SendMessage(data) => MessageFormatter::format_chat_message(
            &data.user_name,
            &data.text_data,
            get_timestamp_millis(),
        ),
        Message::Notification(data) => MessageFormatter::format_notification(
            &data.notification_message,
            get_timestamp_millis(),
        ),
        Message::OnlineUsers(data) => MessageFormatter::format_online_users(data, user_name),
        Message::Error(data) => MessageFormatter::format_error(&data.error_text),
        other => {
            tracing::debug!("Ignoring {} message", other.kind());
            return;
        }
    };
    print!("{}", formatted);
    redisplay_prompt(user_name);
}
