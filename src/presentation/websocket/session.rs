//! WebSocket Session Management
//!
//! Per-connection state machine:
//!
//! ```text
//! Connecting -> Authenticating -> Connected -> Disconnected
//!                              \-> Rejected  -> Disconnected
//! ```

use std::time::Instant;

use uuid::Uuid;

use super::gateway::GatewayError;
use crate::application::services::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticating,
    Connected,
    Rejected,
    Disconnected,
}

impl ConnectionState {
    fn can_become(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Authenticating)
                | (Authenticating, Connected)
                | (Authenticating, Rejected)
                | (Connecting | Authenticating | Connected | Rejected, Disconnected)
        )
    }
}

/// WebSocket session state
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    state: ConnectionState,
    identity: Option<Identity>,
    last_heartbeat: Instant,
}

impl SessionState {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            state: ConnectionState::Connecting,
            identity: None,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity.map(|i| i.user_id)
    }

    fn transition(&mut self, next: ConnectionState) -> Result<(), GatewayError> {
        if !self.state.can_become(next) {
            return Err(GatewayError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!(
            session_id = %self.session_id,
            from = ?self.state,
            to = ?next,
            "Session state changed"
        );
        self.state = next;
        Ok(())
    }

    pub fn begin_authentication(&mut self) -> Result<(), GatewayError> {
        self.transition(ConnectionState::Authenticating)
    }

    pub fn authenticated(&mut self, identity: Identity) -> Result<(), GatewayError> {
        self.transition(ConnectionState::Connected)?;
        self.identity = Some(identity);
        self.heartbeat();
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), GatewayError> {
        self.transition(ConnectionState::Rejected)
    }

    pub fn disconnect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_heartbeat.elapsed().as_millis() < timeout_ms as u128
    }
}
