//! Connection lifecycle of the cache service.
//!
//! Transport callbacks (connect attempts, round-trip outcomes, shutdown) are
//! fed in as [`ConnectionEvent`]s; the next state is a pure function of the
//! current state and the event.

use std::fmt;

/// Where the service is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Constructed, `connect()` not yet called
    Uninitialized,
    /// Connect in flight
    Connecting,
    /// Transport healthy
    Connected,
    /// Transport reported an error; commands are still attempted
    Degraded,
    /// Connect failed and the transport was dropped; every operation is a no-op
    Disabled,
    /// Explicitly disconnected; terminal
    Closed,
}

/// Something the transport reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `connect()` was called
    Connect,
    /// Connect or a command round-trip succeeded
    Ready,
    /// A command failed at the transport level
    Error,
    /// The initial connect could not be established
    ConnectFailed,
    /// `disconnect()` was called
    Close,
}

impl ConnectionState {
    /// Applies `event` and returns the resulting state.
    pub fn on(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent as E;
        use ConnectionState as S;

        match (self, event) {
            (S::Closed, _) => S::Closed,
            (_, E::Close) => S::Closed,
            (S::Uninitialized, E::Connect) => S::Connecting,
            (S::Uninitialized, E::ConnectFailed) => S::Disabled,
            (S::Connecting, E::Ready) => S::Connected,
            (S::Connecting, E::Error | E::ConnectFailed) => S::Disabled,
            (S::Connected, E::Error) => S::Degraded,
            (S::Degraded, E::Ready) => S::Connected,
            (state, _) => state,
        }
    }

    /// True only for a healthy transport.
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    /// Whether operations should be sent to the transport.
    pub fn accepts_commands(self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Degraded)
    }

    /// Coarse status reported to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Degraded => "error",
            ConnectionState::Uninitialized | ConnectionState::Disabled | ConnectionState::Closed => {
                "disconnected"
            }
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionEvent as E;
    use ConnectionState as S;

    #[test]
    fn test_connect_success_path() {
        let state = S::Uninitialized.on(E::Connect);
        assert_eq!(state, S::Connecting);
        assert_eq!(state.on(E::Ready), S::Connected);
    }

    #[test]
    fn test_connect_failure_disables() {
        assert_eq!(S::Connecting.on(E::ConnectFailed), S::Disabled);
        assert_eq!(S::Connecting.on(E::Error), S::Disabled);
        // no way back once the transport is dropped
        assert_eq!(S::Disabled.on(E::Connect), S::Disabled);
        assert_eq!(S::Disabled.on(E::Ready), S::Disabled);
    }

    #[test]
    fn test_degrade_and_recover() {
        let degraded = S::Connected.on(E::Error);
        assert_eq!(degraded, S::Degraded);
        assert!(degraded.accepts_commands());
        assert!(!degraded.is_connected());
        assert_eq!(degraded.on(E::Error), S::Degraded);
        assert_eq!(degraded.on(E::Ready), S::Connected);
    }

    #[test]
    fn test_close_is_terminal() {
        for state in [S::Uninitialized, S::Connecting, S::Connected, S::Degraded, S::Disabled] {
            assert_eq!(state.on(E::Close), S::Closed);
        }
        for event in [E::Connect, E::Ready, E::Error, E::ConnectFailed] {
            assert_eq!(S::Closed.on(event), S::Closed);
        }
    }

    #[test]
    fn test_connect_is_idempotent_when_connected() {
        assert_eq!(S::Connected.on(E::Connect), S::Connected);
    }

    #[test]
    fn test_reported_status() {
        assert_eq!(S::Uninitialized.as_str(), "disconnected");
        assert_eq!(S::Connecting.as_str(), "connecting");
        assert_eq!(S::Connected.as_str(), "connected");
        assert_eq!(S::Degraded.as_str(), "error");
        assert_eq!(S::Closed.to_string(), "disconnected");
    }
}
