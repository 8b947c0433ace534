//! # wsgate - WebSocket framing and keep-alive core
//!
//! `wsgate` turns a byte stream into a sequence of WebSocket messages and
//! back, incrementally, and decides when a quiet connection is dead. It is
//! the framing core of a gateway: the transport (acceptors, TLS, HTTP
//! upgrade) lives elsewhere and feeds raw bytes in and out.
//!
//! ## Features
//!
//! - **Incremental decoding** — input may be split at any byte boundary;
//!   partial frames are carried across calls without copy games
//! - **RFC 6455 and legacy Hixie framing** with one message model
//! - **Fail-fast limits** — oversized messages are rejected from their
//!   declared length, before the payload is buffered
//! - **Encode-once broadcast** — a shared message's wire bytes are cached
//!   on first encode and reused by every session
//! - **Ping/pong liveness** — a timer-driven check-alive state machine the
//!   transport drives through two callbacks
//!
//! ## Quick Start
//!
//! ```rust
//! use wsgate::{Config, FrameDecoder, FrameEncoder, Message};
//!
//! let config = Config::new();
//! let mut encoder = FrameEncoder::new(&config);
//! let mut decoder = FrameDecoder::new(config);
//!
//! let wire = encoder.encode(&Message::text("hello")).unwrap();
//! let messages = decoder.decode(&wire).unwrap();
//! assert_eq!(messages, vec![Message::text("hello")]);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod message;
pub mod protocol;

pub use codec::hixie::{HixieDecoder, HixieEncoder};
pub use codec::rfc6455::{FrameDecoder, FrameEncoder, SharedMessage};
pub use config::Config;
pub use error::{Error, Result};
pub use keepalive::{IdleAction, KeepAlive};
pub use message::{CloseCode, CloseFrame, Kind, Message};
pub use protocol::{MessageAssembler, OpCode};

#[cfg(feature = "async-tokio")]
pub use codec::framed::WsStream;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<Config>();
        assert_send::<Message>();
        assert_send::<FrameDecoder>();
        assert_send::<FrameEncoder>();
        assert_send::<SharedMessage>();
        assert_send::<KeepAlive>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Config>();
        assert_sync::<Message>();
        assert_sync::<SharedMessage>();
        assert_sync::<KeepAlive>();
    }
}
