//! Message-level I/O over an async byte stream.
//!
//! Thin driver around the incremental codec: reads chunks from the
//! transport into [`FrameDecoder`], writes [`FrameEncoder`] output back.
//! One instance per connection.

use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::codec::rfc6455::{FrameDecoder, FrameEncoder};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::Message;

const READ_CHUNK: usize = 8192;

/// Reads and writes [`Message`]s over any `AsyncRead + AsyncWrite` stream.
pub struct WsStream<T> {
    io: T,
    decoder: FrameDecoder,
    encoder: FrameEncoder,
    /// Messages decoded but not yet handed to the caller: one read from
    /// the transport can complete several frames.
    ready: VecDeque<Message>,
}

impl<T> WsStream<T> {
    /// Wrap a connected stream.
    #[must_use]
    pub fn new(io: T, config: Config) -> Self {
        Self {
            io,
            decoder: FrameDecoder::new(config.clone()),
            encoder: FrameEncoder::new(&config),
            ready: VecDeque::new(),
        }
    }

    /// Unwrap the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> WsStream<T> {
    /// Read the next message, pulling from the transport as needed.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] when the peer closes the stream.
    /// - Any decode error, after which the stream must be discarded.
    pub async fn read_message(&mut self) -> Result<Message> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Ok(message);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                debug!(
                    pending = self.decoder.pending_bytes(),
                    "stream closed by peer"
                );
                return Err(Error::ConnectionClosed(None));
            }
            self.ready.extend(self.decoder.decode(&chunk[..n])?);
        }
    }

    /// Write one message to the transport.
    ///
    /// Header and payload go out as separate writes so an unmasked payload
    /// is never copied.
    ///
    /// # Errors
    ///
    /// Encode errors, or I/O errors from the transport.
    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        let (header, payload) = self.encoder.encode_vectored(message)?;
        self.io.write_all(&header).await?;
        if !payload.is_empty() {
            self.io.write_all(&payload).await?;
        }
        Ok(())
    }

    /// Flush the transport.
    ///
    /// # Errors
    ///
    /// I/O errors from the transport.
    pub async fn flush(&mut self) -> Result<()> {
        self.io.flush().await?;
        Ok(())
    }
}
