//! Per-connection configuration for the codecs and the keep-alive probe.

use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration consumed by the decoders, encoders and keep-alive.
///
/// One value per connection; the transport builds it once at session setup
/// and hands clones to the components it instantiates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum size of a logical (possibly fragmented) message, in bytes.
    ///
    /// Zero disables the limit. Enforced from declared frame lengths, so an
    /// oversized message fails before its payload is buffered.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: u64,

    /// Whether inbound frames must carry a masking key.
    ///
    /// RFC 6455 requires client-to-server frames to be masked and
    /// server-to-client frames not to be. A frame whose masking bit
    /// disagrees with this policy, in either direction, is a decode error.
    ///
    /// Default: false
    pub masking_required: bool,

    /// Whether outgoing frames are masked (client-role framing).
    ///
    /// Default: false
    pub mask_outgoing: bool,

    /// Inactivity window for the keep-alive probe.
    ///
    /// Half of it is used as the reader-idle interval so a full ping+pong
    /// round trip fits within one window. `Duration::ZERO` disables the
    /// feature entirely: no idle configuration is installed.
    ///
    /// Default: zero (disabled)
    pub inactivity_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_message_size: 64 * 1024 * 1024,
            masking_required: false,
            mask_outgoing: false,
            inactivity_timeout: Duration::ZERO,
        }
    }
}

impl Config {
    /// Create a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure for server role: inbound frames masked, outbound plain.
    #[must_use]
    pub fn server() -> Self {
        Self {
            masking_required: true,
            mask_outgoing: false,
            ..Default::default()
        }
    }

    /// Configure for client role: inbound frames plain, outbound masked.
    #[must_use]
    pub fn client() -> Self {
        Self {
            masking_required: false,
            mask_outgoing: true,
            ..Default::default()
        }
    }

    /// Set the maximum logical message size. Zero means unlimited.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: u64) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the inbound masking policy.
    #[must_use]
    pub const fn with_masking_required(mut self, required: bool) -> Self {
        self.masking_required = required;
        self
    }

    /// Set whether outgoing frames are masked.
    #[must_use]
    pub const fn with_mask_outgoing(mut self, mask: bool) -> Self {
        self.mask_outgoing = mask;
        self
    }

    /// Set the keep-alive inactivity window. Zero disables the probe.
    #[must_use]
    pub const fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    /// Validate a prospective logical-message size against the limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] when `size` exceeds the configured
    /// maximum and the limit is enabled.
    pub const fn check_message_size(&self, size: u64) -> Result<()> {
        if self.max_message_size != 0 && size > self.max_message_size {
            Err(Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }
}
