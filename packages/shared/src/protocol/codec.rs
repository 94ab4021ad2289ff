//! Length-prefixed framing for envelopes.
//!
//! Every envelope travels in its own frame: a 4-byte big-endian length
//! followed by the envelope JSON. Transport-level problems (oversized or
//! truncated frames, socket errors) surface as `io::Error` and end the stream.
//! A complete frame whose content fails to decode is yielded as an
//! `Err(CodecError)` item so that the reader can keep going.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use super::message::{CodecError, Message, decode, encode};

/// Upper bound for a single frame's payload
pub const MAX_FRAME_LENGTH: usize = 8192;

/// Framed codec for `tokio_util::codec::Framed`
#[derive(Debug)]
pub struct EnvelopeCodec {
    frames: LengthDelimitedCodec,
}

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self {
            frames: LengthDelimitedCodec::builder()
                .max_frame_length(MAX_FRAME_LENGTH)
                .new_codec(),
        }
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Result<Message, CodecError>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame) = self.frames.decode(src)? else {
            return Ok(None);
        };
        let item = decode(&frame);
        if let Err(e) = &item {
            tracing::debug!("Dropping content of a {}-byte frame: {}", frame.len(), e);
        }
        Ok(Some(item))
    }
}

/// Pre-encoded envelopes, used when the same bytes go to many connections
impl Encoder<Bytes> for EnvelopeCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.frames.encode(item, dst)
    }
}

impl Encoder<Message> for EnvelopeCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = encode(&item).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.frames.encode(bytes, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::Framed;

    fn frame(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_decode_waits_for_complete_frame() {
        // テスト項目: フレームが途中までしか届いていない場合は何も返さない
        // given (前提条件):
        let mut codec = EnvelopeCodec::new();
        let bytes = encode(&Message::open_connect("alice")).unwrap();
        let full = frame(&bytes);
        let mut partial = BytesMut::from(&full[..full.len() - 3]);

        // when (操作):
        let first = codec.decode(&mut partial).unwrap();
        partial.extend_from_slice(&full[full.len() - 3..]);
        let second = codec.decode(&mut partial).unwrap();

        // then (期待する結果):
        assert!(first.is_none());
        assert_eq!(second, Some(Ok(Message::open_connect("alice"))));
    }

    #[test]
    fn test_decode_splits_coalesced_frames() {
        // テスト項目: 1回の読み込みに複数フレームが含まれていても個別に取り出せる
        // given (前提条件):
        let mut codec = EnvelopeCodec::new();
        let mut buf = frame(&encode(&Message::send_message("", "one")).unwrap());
        buf.extend_from_slice(&frame(&encode(&Message::send_message("", "two")).unwrap()));

        // when (操作):
        let first = codec.decode(&mut buf).unwrap();
        let second = codec.decode(&mut buf).unwrap();
        let third = codec.decode(&mut buf).unwrap();

        // then (期待する結果):
        assert_eq!(first, Some(Ok(Message::send_message("", "one"))));
        assert_eq!(second, Some(Ok(Message::send_message("", "two"))));
        assert!(third.is_none());
    }

    #[test]
    fn test_decode_bad_content_is_an_item_not_a_stream_error() {
        // テスト項目: 中身が壊れたフレームはストリームエラーではなく Err アイテムになる
        // given (前提条件):
        let mut codec = EnvelopeCodec::new();
        let mut buf = frame(b"{broken");

        // when (操作):
        let result = codec.decode(&mut buf);

        // then (期待する結果):
        assert!(matches!(
            result,
            Ok(Some(Err(CodecError::MalformedEnvelope(_))))
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        // テスト項目: 上限を超える長さのフレームは io エラーになる
        // given (前提条件):
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&((MAX_FRAME_LENGTH + 1) as u32).to_be_bytes());

        // when (操作):
        let result = codec.decode(&mut buf);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_framed_transport_between_peers() {
        // テスト項目: Framed を介して型付きメッセージと事前エンコード済みバイト列の両方を送受信できる
        // given (前提条件):
        let (left, right) = tokio::io::duplex(1024);
        let mut writer = Framed::new(left, EnvelopeCodec::new());
        let mut reader = Framed::new(right, EnvelopeCodec::new());

        // when (操作):
        writer.send(Message::open_connect("alice")).await.unwrap();
        let pre_encoded = encode(&Message::notification("hello")).unwrap();
        writer.send(pre_encoded).await.unwrap();

        // then (期待する結果):
        let first = reader.next().await.unwrap().unwrap();
        let second = reader.next().await.unwrap().unwrap();
        assert_eq!(first, Ok(Message::open_connect("alice")));
        assert_eq!(second, Ok(Message::notification("hello")));
    }
}
