//! Reassembly of fragment messages into whole logical messages.
//!
//! The streaming decoders emit one [`Message`] per frame, fragments
//! included. Hosts that want whole messages feed those events through a
//! `MessageAssembler`, which concatenates fragment payloads and hands back
//! the completed message when the final fragment arrives.

use bytes::{Bytes, BytesMut};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{Kind, Message};

/// Concatenates fragmented messages back into complete ones.
pub struct MessageAssembler {
    buffer: BytesMut,
    kind: Option<Kind>,
    config: Config,
}

impl MessageAssembler {
    /// Create an assembler enforcing the config's message size limit.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            buffer: BytesMut::new(),
            kind: None,
            config,
        }
    }

    /// Feed one decoded message.
    ///
    /// Returns `Some` when a logical message is complete: either the input
    /// itself (whole data messages and control messages pass straight
    /// through) or the reassembled message on the final continuation.
    /// Returns `None` for interior fragments.
    ///
    /// # Errors
    ///
    /// - [`Error::ProtocolViolation`] for a continuation with no open
    ///   message, or a new data message while one is open.
    /// - [`Error::MessageTooLarge`] when the accumulated payload exceeds
    ///   the configured limit.
    pub fn push(&mut self, message: Message) -> Result<Option<Message>> {
        match message {
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => Ok(Some(message)),
            Message::Text { data, fin } => self.push_data(Kind::Text, data, fin),
            Message::Binary { data, fin } => self.push_data(Kind::Binary, data, fin),
            Message::Continuation { data, fin } => {
                let Some(kind) = self.kind else {
                    return Err(Error::ProtocolViolation(
                        "continuation frame without a message to continue".into(),
                    ));
                };
                self.append(&data)?;
                if fin {
                    self.kind = None;
                    Ok(Some(self.take_complete(kind)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// True while a fragmented message is being accumulated.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.kind.is_some()
    }

    /// Discard any partially assembled message.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.kind = None;
    }

    fn push_data(&mut self, kind: Kind, data: Bytes, fin: bool) -> Result<Option<Message>> {
        if self.kind.is_some() {
            return Err(Error::ProtocolViolation(
                "new data message while a fragmented message is open".into(),
            ));
        }
        if fin {
            // Whole message, nothing buffered: pass it through untouched.
            self.config.check_message_size(data.len() as u64)?;
            return Ok(Some(rebuild(kind, data)));
        }
        self.append(&data)?;
        self.kind = Some(kind);
        Ok(None)
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        let total = self.buffer.len() as u64 + data.len() as u64;
        self.config.check_message_size(total)?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn take_complete(&mut self, kind: Kind) -> Message {
        rebuild(kind, self.buffer.split().freeze())
    }
}

fn rebuild(kind: Kind, data: Bytes) -> Message {
    match kind {
        Kind::Text => Message::Text { data, fin: true },
        Kind::Binary => Message::Binary { data, fin: true },
    }
}
