//! Gateway-backed event publisher
//!
//! Bridges application services to connected clients. Every alias of an
//! event name is emitted; transport failures stop here.

use std::sync::Arc;

use super::gateway::Gateway;
use crate::application::{DomainEvent, EventPublisher};
use crate::infrastructure::metrics;

pub struct GatewayPublisher {
    gateway: Arc<Gateway>,
}

impl GatewayPublisher {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

impl EventPublisher for GatewayPublisher {
    fn publish(&self, event: DomainEvent) {
        let kind = event.kind();
        let canonical = kind.canonical_name();
        let channels = event.channels();

        let payload = match event.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(event = canonical, error = %e, "Failed to serialize event");
                metrics::record_fanout_failure(canonical);
                return;
            }
        };

        metrics::record_event_published(canonical);

        for name in kind.names() {
            match self.gateway.broadcast(&channels, name, &payload) {
                Ok(delivered) => tracing::debug!(
                    event = %name,
                    application_id = %event.application_id(),
                    delivered,
                    "Event delivered"
                ),
                Err(e) => {
                    tracing::warn!(
                        event = %name,
                        application_id = %event.application_id(),
                        error = %e,
                        "Event fan-out incomplete"
                    );
                    metrics::record_fanout_failure(canonical);
                }
            }
        }
    }
}
