//! Error types for the framing and keep-alive core.
//!
//! Decode errors are fatal to the connection that produced them: the
//! transport is expected to propagate them and close. [`Error::Incomplete`]
//! is the one exception, an internal control value meaning "need more
//! bytes" that the streaming decoders handle by buffering.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while framing or deframing a connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed frame that fits no more specific variant.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Frame sequence violates the protocol (e.g. orphan continuation).
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Opcode value reserved by RFC 6455.
    #[error("reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Leading byte of a legacy frame names no known frame type.
    #[error("unknown frame type: {0:#x}")]
    UnknownFrameType(u8),

    /// Control frame with FIN=0.
    #[error("control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload over the 125-byte protocol limit.
    #[error("control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Logical message exceeds the configured maximum.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Size the message would reach, per the declared frame lengths.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Masking policy requires a masking key and the frame carries none.
    #[error("inbound frame must be masked")]
    ExpectedMaskedFrame,

    /// Masking policy forbids a masking key and the frame carries one.
    #[error("inbound frame must not be masked")]
    UnexpectedMaskedFrame,

    /// Declared payload length cannot be addressed on this platform.
    #[error("payload length {size} exceeds platform addressable size")]
    PayloadTooLargeForPlatform {
        /// Declared length.
        size: u64,
    },

    /// Close-frame reason text is not valid UTF-8.
    #[error("invalid UTF-8 in close reason")]
    InvalidUtf8,

    /// Not enough input to make progress. Handled internally by the
    /// streaming decoders; callers of the low-level parse functions buffer
    /// and retry without losing or duplicating bytes.
    #[error("incomplete frame: need {needed} more bytes")]
    Incomplete {
        /// Lower bound on the additional bytes required.
        needed: usize,
    },

    /// The peer closed the connection.
    #[error("connection closed: {0:?}")]
    ConnectionClosed(Option<u16>),

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// True for the internal "buffer and retry" control value.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        matches!(self, Error::Incomplete { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
