//! Streaming codecs for both wire formats.

pub mod hixie;
pub mod rfc6455;

#[cfg(feature = "async-tokio")]
pub mod framed;

pub use hixie::{HixieDecoder, HixieEncoder};
pub use rfc6455::{FrameDecoder, FrameEncoder, SharedMessage};

#[cfg(feature = "async-tokio")]
pub use framed::WsStream;
