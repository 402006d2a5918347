//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    ApplyRequest, MarkReadRequest, OrderQuery, ReceivedQuery, ScheduleInterviewRequest,
    SendMessageRequest, UpdateInterviewRequest, UpdateStatusRequest,
};
pub use response::{ApplicationListResponse, MarkReadResponse};
