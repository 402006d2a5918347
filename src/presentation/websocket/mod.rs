//! WebSocket Gateway
//!
//! Real-time delivery of application events to connected clients.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod publisher;
pub mod session;

pub use gateway::{Gateway, GatewayError};
pub use handler::ws_handler;
pub use messages::{GatewayReceive, GatewaySend, OpCode};
pub use publisher::GatewayPublisher;
pub use session::{ConnectionState, SessionState};
