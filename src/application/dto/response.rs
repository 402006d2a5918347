//! Response DTOs
//!
//! Data structures for API response bodies that are not already service
//! projections.

use serde::Serialize;

use crate::application::services::ApplicationSummary;

/// Application listing response
#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationSummary>,
    pub total: usize,
}

impl From<Vec<ApplicationSummary>> for ApplicationListResponse {
    fn from(applications: Vec<ApplicationSummary>) -> Self {
        Self {
            total: applications.len(),
            applications,
        }
    }
}

/// Mark read response
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked: u64,
}
