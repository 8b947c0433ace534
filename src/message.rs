//! Logical message types produced and consumed by the codecs.

use bytes::Bytes;

/// Payload kind of a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// UTF-8 text payload.
    Text,
    /// Arbitrary binary payload.
    Binary,
}

/// WebSocket close status code per RFC 6455 Section 7.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CloseCode {
    /// Normal closure (1000).
    #[default]
    Normal,
    /// Going away (1001).
    GoingAway,
    /// Protocol error (1002).
    ProtocolError,
    /// Unsupported data (1003).
    UnsupportedData,
    /// Policy violation (1008).
    PolicyViolation,
    /// Message too big (1009).
    MessageTooBig,
    /// Unexpected condition (1011).
    UnexpectedCondition,
    /// Any other code (registered 1012-1014, application 3000-4999, ...).
    Other(u16),
}

impl CloseCode {
    /// Build a `CloseCode` from its numeric value.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1011 => CloseCode::UnexpectedCondition,
            other => CloseCode::Other(other),
        }
    }

    /// Numeric value of this close code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::UnexpectedCondition => 1011,
            CloseCode::Other(code) => *code,
        }
    }

    /// Whether an endpoint may put this code in an outgoing Close frame.
    ///
    /// Codes 1004-1006 and 1015 are reserved and never appear on the wire.
    #[must_use]
    pub const fn is_sendable(&self) -> bool {
        let code = self.as_u16();
        matches!(code, 1000..=1003 | 1007..=1014 | 3000..=4999)
    }
}

/// Close frame contents: status code plus optional reason text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The close status code.
    pub code: CloseCode,
    /// Human-readable reason (UTF-8, at most 123 bytes on the wire).
    pub reason: String,
}

impl CloseFrame {
    /// Create a close frame with the given code and reason.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// One decoded or to-be-encoded WebSocket message.
///
/// Data variants carry a `fin` flag: a message with `fin == false` is an
/// interior fragment of a larger logical message, to be followed by
/// continuations until one arrives with `fin == true`. Control messages
/// (ping, pong, close) always occupy a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Message {
    /// Text payload, whole message or first fragment.
    Text {
        /// Payload bytes (UTF-8 by convention; not validated at this layer).
        data: Bytes,
        /// Final-fragment flag.
        fin: bool,
    },
    /// Binary payload, whole message or first fragment.
    Binary {
        /// Payload bytes.
        data: Bytes,
        /// Final-fragment flag.
        fin: bool,
    },
    /// Interior or final continuation of a fragmented message.
    Continuation {
        /// Payload bytes.
        data: Bytes,
        /// Final-fragment flag.
        fin: bool,
    },
    /// Liveness probe (payload at most 125 bytes).
    Ping(Bytes),
    /// Probe response (payload at most 125 bytes).
    Pong(Bytes),
    /// Close frame, optionally carrying a status code and reason.
    Close(Option<CloseFrame>),
}

impl Message {
    /// Create a complete text message.
    #[must_use]
    pub fn text(data: impl Into<Bytes>) -> Self {
        Message::Text {
            data: data.into(),
            fin: true,
        }
    }

    /// Create a complete binary message.
    #[must_use]
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Message::Binary {
            data: data.into(),
            fin: true,
        }
    }

    /// Create the opening fragment of a fragmented message.
    #[must_use]
    pub fn fragment_start(kind: Kind, data: impl Into<Bytes>) -> Self {
        match kind {
            Kind::Text => Message::Text {
                data: data.into(),
                fin: false,
            },
            Kind::Binary => Message::Binary {
                data: data.into(),
                fin: false,
            },
        }
    }

    /// Create a continuation fragment; `fin` marks the last one.
    #[must_use]
    pub fn continuation(data: impl Into<Bytes>, fin: bool) -> Self {
        Message::Continuation {
            data: data.into(),
            fin,
        }
    }

    /// Create a ping message.
    #[must_use]
    pub fn ping(data: impl Into<Bytes>) -> Self {
        Message::Ping(data.into())
    }

    /// Create a pong message.
    #[must_use]
    pub fn pong(data: impl Into<Bytes>) -> Self {
        Message::Pong(data.into())
    }

    /// Create a close message with status code and reason.
    #[must_use]
    pub fn close(code: CloseCode, reason: impl Into<String>) -> Self {
        Message::Close(Some(CloseFrame::new(code, reason)))
    }

    /// `true` for ping, pong and close.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        matches!(
            self,
            Message::Ping(_) | Message::Pong(_) | Message::Close(_)
        )
    }

    /// `true` for text, binary and continuation.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        !self.is_control()
    }

    /// `true` when this message ends a logical message.
    ///
    /// Control messages are always final; data messages are final when
    /// their `fin` flag is set.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        match self {
            Message::Text { fin, .. }
            | Message::Binary { fin, .. }
            | Message::Continuation { fin, .. } => *fin,
            _ => true,
        }
    }

    /// Payload kind for text and binary messages, `None` otherwise.
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Message::Text { .. } => Some(Kind::Text),
            Message::Binary { .. } => Some(Kind::Binary),
            _ => None,
        }
    }

    /// Borrow the payload of a data or ping/pong message.
    ///
    /// Close frames encode their payload structurally; this returns an
    /// empty slice for them.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match self {
            Message::Text { data, .. }
            | Message::Binary { data, .. }
            | Message::Continuation { data, .. }
            | Message::Ping(data)
            | Message::Pong(data) => data,
            Message::Close(_) => &[],
        }
    }
}
