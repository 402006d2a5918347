//! Thread Service
//!
//! Per-application message threads between the job seeker and the employer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::access::require_party;
use crate::application::error::ApplicationError;
use crate::application::events::{DomainEvent, EventPublisher};
use crate::domain::{
    Application, ApplicationRepository, Message, MessageRole, Party, SortOrder, UserDirectory,
};

/// Message thread service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadService: Send + Sync {
    /// Post a message as one of the two parties
    async fn send_message(
        &self,
        application_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, ApplicationError>;

    /// Thread with sender display data and the viewer's unread count
    async fn list_thread(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        order: SortOrder,
    ) -> Result<ThreadView, ApplicationError>;

    /// Mark messages addressed to the viewer as read; all of them when
    /// `message_id` is `None`. Returns how many were newly marked.
    async fn mark_read(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        message_id: Option<Uuid>,
    ) -> Result<u64, ApplicationError>;
}

/// Resolved sender display data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SenderInfo {
    pub id: Uuid,
    pub name: String,
    pub role: MessageRole,
}

/// Message as shown to a viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: SenderInfo,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadView {
    pub application_id: Uuid,
    pub messages: Vec<ThreadMessage>,
    pub unread_count: usize,
}

const SYSTEM_SENDER_NAME: &str = "System";
const UNKNOWN_SENDER_NAME: &str = "Unknown user";

/// Project an application's thread for `viewer`.
///
/// Sender names come from the two parties' profiles, each looked up once.
pub(crate) async fn project_thread(
    application: &Application,
    viewer: Party,
    users: &dyn UserDirectory,
    order: SortOrder,
) -> Result<ThreadView, ApplicationError> {
    let name_of = |record: Option<crate::domain::UserRecord>| {
        record
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_SENDER_NAME.to_string())
    };
    let seeker_name = name_of(users.find_user(application.job_seeker_id).await?);
    let employer_name = name_of(users.find_user(application.employer_id).await?);

    let messages = application
        .messages
        .iter()
        .map(|m| {
            let name = match m.role {
                MessageRole::JobSeeker => seeker_name.clone(),
                MessageRole::Employer => employer_name.clone(),
                MessageRole::System => SYSTEM_SENDER_NAME.to_string(),
            };
            ThreadMessage {
                id: m.id,
                content: m.content.clone(),
                sender: SenderInfo {
                    id: m.sender_id,
                    name,
                    role: m.role,
                },
                role: m.role,
                timestamp: m.timestamp,
                read: m.read,
            }
        })
        .collect();

    Ok(ThreadView {
        application_id: application.id,
        messages: order.arrange(messages),
        unread_count: application.unread_count_for(viewer),
    })
}

/// ThreadService implementation
pub struct ThreadServiceImpl {
    applications: Arc<dyn ApplicationRepository>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    max_message_length: usize,
}

impl ThreadServiceImpl {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        max_message_length: usize,
    ) -> Self {
        Self {
            applications,
            users,
            publisher,
            max_message_length,
        }
    }

    async fn load(&self, application_id: Uuid) -> Result<Application, ApplicationError> {
        self.applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Application".into()))
    }
}

#[async_trait]
impl ThreadService for ThreadServiceImpl {
    async fn send_message(
        &self,
        application_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, ApplicationError> {
        let application = self.load(application_id).await?;
        let (party, role) = application
            .party_of(sender_id)
            .and_then(|party| MessageRole::for_party(party).map(|role| (party, role)))
            .ok_or_else(|| {
                ApplicationError::Forbidden(
                    "only the job seeker and the employer can post to this thread".into(),
                )
            })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(ApplicationError::Validation(
                "message content cannot be empty".into(),
            ));
        }
        if content.chars().count() > self.max_message_length {
            return Err(ApplicationError::Validation(format!(
                "message content exceeds {} characters",
                self.max_message_length
            )));
        }

        let message = Message::new(sender_id, role, content.to_string());

        // Sending implies the sender has seen everything the other side wrote.
        self.applications
            .append_message(application_id, &message, MessageRole::counterpart_of(party))
            .await?;

        tracing::info!(
            application_id = %application_id,
            message_id = %message.id,
            sender_id = %sender_id,
            role = %role,
            "Message appended"
        );

        if let Some(recipient_id) = party.counterpart().and_then(|p| application.party_id(p)) {
            self.publisher.publish(DomainEvent::message_new(
                application_id,
                message.clone(),
                recipient_id,
            ));
        }

        Ok(message)
    }

    async fn list_thread(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        order: SortOrder,
    ) -> Result<ThreadView, ApplicationError> {
        let application = self.load(application_id).await?;
        let viewer = require_party(&application, viewer_id, self.users.as_ref()).await?;
        project_thread(&application, viewer, self.users.as_ref(), order).await
    }

    async fn mark_read(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        message_id: Option<Uuid>,
    ) -> Result<u64, ApplicationError> {
        let application = self.load(application_id).await?;
        let viewer = require_party(&application, viewer_id, self.users.as_ref()).await?;

        if let Some(id) = message_id {
            if !application.messages.iter().any(|m| m.id == id) {
                return Err(ApplicationError::NotFound("Message".into()));
            }
        }

        let targets: Vec<Uuid> = application
            .messages
            .iter()
            .filter(|m| message_id.map_or(true, |id| m.id == id))
            .filter(|m| !m.read && m.role.is_addressed_to(viewer))
            .map(|m| m.id)
            .collect();

        if targets.is_empty() {
            return Ok(0);
        }

        let marked = self
            .applications
            .mark_messages_read(application_id, &targets)
            .await?;

        tracing::debug!(
            application_id = %application_id,
            viewer_id = %viewer_id,
            marked,
            "Messages marked read"
        );

        Ok(marked)
    }
}
