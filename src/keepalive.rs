//! Connection liveness via ping/pong probes on reader-idle timeouts.
//!
//! The transport owns the timers. This component only decides: it tells
//! the host what reader-idle interval to install, and reacts to the two
//! events the host forwards — an idle expiry and a pong arrival. An idle
//! expiry with no probe outstanding sends a ping; a second expiry while
//! the probe is still unanswered means the peer is gone and the host must
//! close. Ordinary traffic resets the transport's own idle tracking, so
//! nothing here runs on the data path.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::Config;

/// What the host must do after a reader-idle expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    /// Send a ping frame; the idle timer keeps running at the same
    /// interval.
    SendPing,
    /// The peer missed its pong window: close the connection.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Liveness {
    Idle,
    AwaitingPong { sent_at: Instant },
}

/// Per-connection ping/pong liveness state machine.
///
/// At most one ping is outstanding at any time. The reader-idle interval
/// is half the configured inactivity window, so a ping and its pong
/// complete within one window.
#[derive(Debug, Clone)]
pub struct KeepAlive {
    inactivity_timeout: Duration,
    state: Liveness,
}

impl KeepAlive {
    /// Create the component, or `None` when the timeout is zero: the
    /// feature is disabled and no idle configuration may be installed.
    #[must_use]
    pub fn new(inactivity_timeout: Duration) -> Option<Self> {
        if inactivity_timeout.is_zero() {
            return None;
        }
        Some(Self {
            inactivity_timeout,
            state: Liveness::Idle,
        })
    }

    /// Create from a connection config; `None` when disabled there.
    #[must_use]
    pub fn from_config(config: &Config) -> Option<Self> {
        Self::new(config.inactivity_timeout)
    }

    /// The configured inactivity window.
    #[must_use]
    pub const fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    /// Reader-idle interval: half the inactivity window. This ratio is a
    /// contract, not a tunable — both halves of the probe round trip must
    /// fit inside one window.
    #[must_use]
    pub fn idle_interval(&self) -> Duration {
        self.inactivity_timeout / 2
    }

    /// Reader-idle timeout the host must install when attaching the
    /// component to a session.
    #[must_use]
    pub fn on_attach(&self) -> Duration {
        trace!(
            interval_ms = self.idle_interval().as_millis() as u64,
            "keep-alive attached"
        );
        self.idle_interval()
    }

    /// Reader-idle timeout to install when detaching: zero, restoring the
    /// transport's default idle behavior. Probe state is kept, so a
    /// session migrated to another transport layer resumes where it left
    /// off after re-attach.
    #[must_use]
    pub fn on_detach(&self) -> Duration {
        Duration::ZERO
    }

    /// True while a ping is outstanding.
    #[must_use]
    pub const fn awaiting_pong(&self) -> bool {
        matches!(self.state, Liveness::AwaitingPong { .. })
    }

    /// React to a reader-idle expiry reported by the transport.
    pub fn on_idle(&mut self, now: Instant) -> IdleAction {
        match self.state {
            Liveness::Idle => {
                self.state = Liveness::AwaitingPong { sent_at: now };
                trace!("reader idle, sending liveness probe");
                IdleAction::SendPing
            }
            Liveness::AwaitingPong { sent_at } => {
                warn!(
                    outstanding_ms = now.saturating_duration_since(sent_at).as_millis() as u64,
                    "no pong within the inactivity window, closing"
                );
                IdleAction::Close
            }
        }
    }

    /// React to a pong from the peer.
    ///
    /// Returns the probe round-trip time when one was outstanding. An
    /// unsolicited pong is ignored: no state change, no timer effects, so
    /// spurious pongs never count as liveness evidence.
    pub fn on_pong(&mut self, now: Instant) -> Option<Duration> {
        match self.state {
            Liveness::AwaitingPong { sent_at } => {
                self.state = Liveness::Idle;
                let rtt = now.saturating_duration_since(sent_at);
                debug!(rtt_ms = rtt.as_millis() as u64, "liveness probe answered");
                Some(rtt)
            }
            Liveness::Idle => {
                trace!("unsolicited pong ignored");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_disabled_when_timeout_zero() {
        assert!(KeepAlive::new(Duration::ZERO).is_none());

        let config = Config::new(); // inactivity disabled by default
        assert!(KeepAlive::from_config(&config).is_none());
    }

    #[test]
    fn test_enabled_from_config() {
        let config = Config::new().with_inactivity_timeout(100 * MS);
        let ka = KeepAlive::from_config(&config).unwrap();
        assert_eq!(ka.inactivity_timeout(), 100 * MS);
    }

    #[test]
    fn test_idle_interval_is_half_the_window() {
        let ka = KeepAlive::new(100 * MS).unwrap();
        assert_eq!(ka.idle_interval(), 50 * MS);
        assert_eq!(ka.on_attach(), 50 * MS);
    }

    #[test]
    fn test_first_idle_sends_ping() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let now = Instant::now();

        assert!(!ka.awaiting_pong());
        assert_eq!(ka.on_idle(now), IdleAction::SendPing);
        assert!(ka.awaiting_pong());
    }

    #[test]
    fn test_second_idle_without_pong_closes() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let t0 = Instant::now();

        assert_eq!(ka.on_idle(t0), IdleAction::SendPing);
        assert_eq!(ka.on_idle(t0 + 50 * MS), IdleAction::Close);
    }

    #[test]
    fn test_pong_within_window_resumes_idle() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let t0 = Instant::now();

        assert_eq!(ka.on_idle(t0), IdleAction::SendPing);
        let rtt = ka.on_pong(t0 + 20 * MS);
        assert_eq!(rtt, Some(20 * MS));
        assert!(!ka.awaiting_pong());

        // The next idle expiry probes again instead of closing.
        assert_eq!(ka.on_idle(t0 + 70 * MS), IdleAction::SendPing);
    }

    #[test]
    fn test_unsolicited_pong_ignored() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let t0 = Instant::now();

        assert_eq!(ka.on_pong(t0), None);
        assert!(!ka.awaiting_pong());

        // A later idle still behaves as the first one.
        assert_eq!(ka.on_idle(t0 + 50 * MS), IdleAction::SendPing);
    }

    #[test]
    fn test_rtt_measured_from_ping_send() {
        let mut ka = KeepAlive::new(200 * MS).unwrap();
        let t0 = Instant::now();

        ka.on_idle(t0);
        assert_eq!(ka.on_pong(t0 + 35 * MS), Some(35 * MS));
    }

    #[test]
    fn test_only_one_ping_outstanding() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let t0 = Instant::now();

        ka.on_idle(t0);
        // A second expiry never stacks another probe; it escalates.
        assert_eq!(ka.on_idle(t0 + 50 * MS), IdleAction::Close);
        assert!(ka.awaiting_pong());
    }

    #[test]
    fn test_detach_returns_zero_and_keeps_state() {
        let mut ka = KeepAlive::new(100 * MS).unwrap();
        let t0 = Instant::now();

        ka.on_idle(t0);
        assert!(ka.awaiting_pong());

        // Session migrates between transport layers: detach, re-attach.
        assert_eq!(ka.on_detach(), Duration::ZERO);
        assert!(ka.awaiting_pong());
        assert_eq!(ka.on_attach(), 50 * MS);

        // The outstanding probe is still honored after the move.
        assert_eq!(ka.on_pong(t0 + 40 * MS), Some(40 * MS));
    }
}
