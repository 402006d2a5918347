//! WebSocket Gateway
//!
//! Connection registry and channel membership. Every authenticated
//! connection is auto-joined to its user channel and its role channel and
//! may join application channels explicitly. Membership lives in shared
//! maps, so a join is visible to the next broadcast as soon as it returns.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::messages::GatewaySend;
use super::session::ConnectionState;
use crate::application::events::Channel;
use crate::application::services::Identity;

/// Transport failures. These never leave the event publisher.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Session {0} is not connected")]
    UnknownSession(String),

    #[error("Outbound queue of session {0} is full")]
    QueueFull(String),

    #[error("Outbound queue of session {0} is closed")]
    Closed(String),

    #[error("Delivered to {delivered} sessions, {failed} failed")]
    PartialDelivery { delivered: usize, failed: usize },

    #[error("Invalid session transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// A registered, authenticated connection
struct ConnectedSession {
    identity: Identity,
    sender: mpsc::Sender<GatewaySend>,
    sequence: AtomicU64,
    channels: Mutex<HashSet<Channel>>,
}

impl ConnectedSession {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Queue a frame without waiting. A full or closed queue drops it.
    fn try_deliver(&self, session_id: &str, frame: GatewaySend) -> Result<(), GatewayError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => GatewayError::QueueFull(session_id.to_string()),
            TrySendError::Closed(_) => GatewayError::Closed(session_id.to_string()),
        })
    }
}

/// Gateway state shared by every connection
pub struct Gateway {
    sessions: DashMap<String, Arc<ConnectedSession>>,
    channels: DashMap<Channel, HashSet<String>>,
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            channels: DashMap::new(),
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Register an authenticated session and auto-join its user and role
    /// channels. Returns the channels joined.
    pub fn register_session(
        &self,
        session_id: &str,
        identity: Identity,
        sender: mpsc::Sender<GatewaySend>,
    ) -> Vec<Channel> {
        let session = Arc::new(ConnectedSession {
            identity,
            sender,
            sequence: AtomicU64::new(0),
            channels: Mutex::new(HashSet::new()),
        });
        self.sessions.insert(session_id.to_string(), session);

        let auto = vec![Channel::User(identity.user_id), Channel::Role(identity.role)];
        for channel in &auto {
            self.join(session_id, channel.clone());
        }

        tracing::info!(
            user_id = %identity.user_id,
            role = %identity.role,
            session_id = %session_id,
            "Session registered"
        );
        auto
    }

    /// Unregister a session and drop all of its memberships
    pub fn unregister_session(&self, session_id: &str) {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return;
        };

        let joined: Vec<Channel> = session.channels.lock().drain().collect();
        for channel in joined {
            self.evict(session_id, &channel);
        }

        tracing::info!(
            user_id = %session.identity.user_id,
            session_id = %session_id,
            "Session unregistered"
        );
    }

    /// Add a session to a channel. Returns false when it was already a
    /// member or the session is unknown.
    pub fn join(&self, session_id: &str, channel: Channel) -> bool {
        let Some(session) = self.session(session_id) else {
            return false;
        };

        let added = self
            .channels
            .entry(channel.clone())
            .or_default()
            .insert(session_id.to_string());
        session.channels.lock().insert(channel.clone());

        // Lost a race with unregister_session, which has already swept
        // this session's channels.
        if !self.sessions.contains_key(session_id) {
            self.evict(session_id, &channel);
            return false;
        }

        if added {
            tracing::debug!(session_id = %session_id, channel = %channel, "Joined channel");
        }
        added
    }

    /// Remove a session from a channel. Returns false when it was not a member.
    pub fn leave(&self, session_id: &str, channel: &Channel) -> bool {
        let removed = self.evict(session_id, channel);

        if let Some(session) = self.session(session_id) {
            session.channels.lock().remove(channel);
        }

        if removed {
            tracing::debug!(session_id = %session_id, channel = %channel, "Left channel");
        }
        removed
    }

    /// Deliver one named event to every session in any of `channels`.
    ///
    /// A session in several of the channels receives the frame once. Each
    /// recipient gets its own sequence number. Returns the number of
    /// sessions the frame was queued for.
    pub fn broadcast(
        &self,
        channels: &[Channel],
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<usize, GatewayError> {
        let mut targets: HashSet<String> = HashSet::new();
        for channel in channels {
            if let Some(members) = self.channels.get(channel) {
                targets.extend(members.iter().cloned());
            }
        }

        let mut delivered = 0;
        let mut failed = 0;
        for session_id in targets {
            let Some(session) = self.session(&session_id) else {
                continue;
            };
            let frame = GatewaySend::dispatch(event, payload.clone(), session.next_sequence());
            match session.try_deliver(&session_id, frame) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::debug!(event, error = %e, "Dropped frame");
                }
            }
        }

        if failed > 0 {
            return Err(GatewayError::PartialDelivery { delivered, failed });
        }
        Ok(delivered)
    }

    /// Dispatch an event to one session, using its sequence counter.
    pub fn dispatch_to_session(
        &self,
        session_id: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), GatewayError> {
        let session = self
            .session(session_id)
            .ok_or_else(|| GatewayError::UnknownSession(session_id.to_string()))?;
        let frame = GatewaySend::dispatch(event, payload, session.next_sequence());
        session.try_deliver(session_id, frame)
    }

    /// Drop `session_id` from one channel's member set, removing the set
    /// once empty.
    fn evict(&self, session_id: &str, channel: &Channel) -> bool {
        let removed = self
            .channels
            .get_mut(channel)
            .map(|mut members| members.remove(session_id))
            .unwrap_or(false);
        self.channels.remove_if(channel, |_, members| members.is_empty());
        removed
    }

    fn session(&self, session_id: &str) -> Option<Arc<ConnectedSession>> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions currently in `channel`
    pub fn member_count(&self, channel: &Channel) -> usize {
        self.channels.get(channel).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_member(&self, session_id: &str, channel: &Channel) -> bool {
        self.channels
            .get(channel)
            .map(|m| m.contains(session_id))
            .unwrap_or(false)
    }
}
