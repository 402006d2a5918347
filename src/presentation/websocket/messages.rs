//! WebSocket Message Types
//!
//! Gateway frame formats. Every frame is `{op, d?, s?, t?}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserRole;

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Event dispatch (server -> client)
    Dispatch = 0,
    /// Heartbeat (client -> server)
    Heartbeat = 1,
    /// Credential rejected; the connection closes next
    InvalidSession = 9,
    /// First frame on every connection
    Hello = 10,
    /// Heartbeat ACK
    HeartbeatAck = 11,
    /// Join an application channel
    Join = 20,
    /// Leave an application channel
    Leave = 21,
    /// Reply to Join and Leave
    Ack = 22,
}

impl OpCode {
    pub fn from_u8(op: u8) -> Option<Self> {
        match op {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            20 => Some(Self::Join),
            21 => Some(Self::Leave),
            22 => Some(Self::Ack),
            _ => None,
        }
    }
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    pub d: Option<serde_json::Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewaySend {
    fn op(op: OpCode, d: Option<serde_json::Value>) -> Self {
        Self {
            op: op as u8,
            d,
            s: None,
            t: None,
        }
    }

    pub fn hello(heartbeat_interval: u64) -> Self {
        Self::op(
            OpCode::Hello,
            serde_json::to_value(HelloPayload { heartbeat_interval }).ok(),
        )
    }

    pub fn dispatch(event: &str, payload: serde_json::Value, sequence: u64) -> Self {
        Self {
            op: OpCode::Dispatch as u8,
            d: Some(payload),
            s: Some(sequence),
            t: Some(event.to_string()),
        }
    }

    pub fn invalid_session() -> Self {
        Self::op(OpCode::InvalidSession, Some(serde_json::Value::Bool(false)))
    }

    pub fn heartbeat_ack() -> Self {
        Self::op(OpCode::HeartbeatAck, None)
    }

    pub fn ack(payload: AckPayload) -> Self {
        Self::op(OpCode::Ack, serde_json::to_value(payload).ok())
    }
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

/// Ready payload (dispatch READY)
#[derive(Debug, Serialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub user_id: Uuid,
    pub role: UserRole,
    /// Channels joined automatically
    pub channels: Vec<String>,
}

/// Join / Leave payload (op 20, 21)
#[derive(Debug, Deserialize)]
pub struct ChannelRequest {
    pub application_id: Uuid,
}

/// Ack payload (op 22)
#[derive(Debug, Serialize)]
pub struct AckPayload {
    /// Opcode being answered
    pub op: u8,
    pub application_id: Option<Uuid>,
    pub ok: bool,
    /// Whether membership actually changed
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckPayload {
    pub fn success(op: OpCode, application_id: Uuid, changed: bool) -> Self {
        Self {
            op: op as u8,
            application_id: Some(application_id),
            ok: true,
            changed,
            error: None,
        }
    }

    pub fn failure(op: OpCode, application_id: Option<Uuid>, error: impl Into<String>) -> Self {
        Self {
            op: op as u8,
            application_id,
            ok: false,
            changed: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trip() {
        for op in [
            OpCode::Dispatch,
            OpCode::Heartbeat,
            OpCode::InvalidSession,
            OpCode::Hello,
            OpCode::HeartbeatAck,
            OpCode::Join,
            OpCode::Leave,
            OpCode::Ack,
        ] {
            assert_eq!(OpCode::from_u8(op as u8), Some(op));
        }
        assert_eq!(OpCode::from_u8(2), None);
    }

    #[test]
    fn test_dispatch_frame_shape() {
        let frame = GatewaySend::dispatch("message.new", serde_json::json!({"a": 1}), 7);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["op"], 0);
        assert_eq!(json["t"], "message.new");
        assert_eq!(json["s"], 7);
    }

    #[test]
    fn test_heartbeat_ack_omits_empty_fields() {
        let json = serde_json::to_value(GatewaySend::heartbeat_ack()).unwrap();
        assert_eq!(json, serde_json::json!({"op": 11}));
    }
}
