//! Application Repository Implementation
//!
//! PostgreSQL implementation of the application aggregate. Every mutation
//! runs in its own transaction and touches only the rows it appends or
//! flips, so concurrent writers never overwrite each other's history or
//! messages.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::services::TransitionPolicy;
use crate::domain::{
    Application, ApplicationRepository, ApplicationStatus, Interview, InterviewStatus,
    InterviewType, Message, MessageRole, StatusEntry,
};
use crate::shared::error::AppError;

/// PostgreSQL application repository implementation.
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    /// Creates a new PgApplicationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const APPLICATION_COLUMNS: &str = r#"
    id, job_id, job_seeker_id, employer_id, status, resume_ref, cover_letter,
    applied_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    job_seeker_id: Uuid,
    employer_id: Uuid,
    status: String,
    resume_ref: String,
    cover_letter: Option<String>,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    application_id: Uuid,
    status: String,
    previous_status: Option<String>,
    actor_id: Uuid,
    notes: Option<String>,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    application_id: Uuid,
    sender_id: Uuid,
    role: String,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct InterviewRow {
    id: Uuid,
    application_id: Uuid,
    interview_date: NaiveDate,
    interview_time: NaiveTime,
    location: String,
    interview_type: String,
    notes: Option<String>,
    status: String,
    job_seeker_confirmed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(value: &str) -> Result<ApplicationStatus, AppError> {
    value.parse().map_err(AppError::Internal)
}

impl StatusRow {
    fn into_entry(self) -> Result<StatusEntry, AppError> {
        Ok(StatusEntry {
            status: parse_status(&self.status)?,
            timestamp: self.created_at,
            actor_id: self.actor_id,
            notes: self.notes,
            previous_status: self.previous_status.as_deref().map(parse_status).transpose()?,
            details: self.details,
        })
    }
}

impl MessageRow {
    fn into_message(self) -> Result<Message, AppError> {
        let role = MessageRole::parse(&self.role)
            .ok_or_else(|| AppError::Internal(format!("unknown message role '{}'", self.role)))?;
        Ok(Message {
            id: self.id,
            content: self.content,
            sender_id: self.sender_id,
            role,
            timestamp: self.created_at,
            read: self.is_read,
        })
    }
}

impl InterviewRow {
    fn into_interview(self) -> Result<Interview, AppError> {
        let interview_type = InterviewType::parse(&self.interview_type).ok_or_else(|| {
            AppError::Internal(format!("unknown interview type '{}'", self.interview_type))
        })?;
        let status = InterviewStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("unknown interview status '{}'", self.status))
        })?;
        Ok(Interview {
            id: self.id,
            application_id: self.application_id,
            date: self.interview_date,
            time: self.interview_time,
            location: self.location,
            interview_type,
            notes: self.notes,
            status,
            job_seeker_confirmed: self.job_seeker_confirmed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PgApplicationRepository {
    /// Load child rows for `rows` in three batched queries and assemble the
    /// aggregates, preserving the order of `rows`.
    async fn hydrate(&self, rows: Vec<ApplicationRow>) -> Result<Vec<Application>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let status_rows = sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT application_id, status, previous_status, actor_id, notes, details, created_at
            FROM application_status_history
            WHERE application_id = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let message_rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, application_id, sender_id, role, content, is_read, created_at
            FROM application_messages
            WHERE application_id = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let interview_rows = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT id, application_id, interview_date, interview_time, location,
                   interview_type, notes, status, job_seeker_confirmed, created_at, updated_at
            FROM interviews
            WHERE application_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut histories: HashMap<Uuid, Vec<StatusEntry>> = HashMap::new();
        for row in status_rows {
            let app_id = row.application_id;
            histories.entry(app_id).or_default().push(row.into_entry()?);
        }

        let mut threads: HashMap<Uuid, Vec<Message>> = HashMap::new();
        for row in message_rows {
            let app_id = row.application_id;
            threads.entry(app_id).or_default().push(row.into_message()?);
        }

        let mut interviews: HashMap<Uuid, Interview> = HashMap::new();
        for row in interview_rows {
            let interview = row.into_interview()?;
            interviews.insert(interview.application_id, interview);
        }

        rows.into_iter()
            .map(|row| {
                Ok(Application {
                    id: row.id,
                    job_id: row.job_id,
                    job_seeker_id: row.job_seeker_id,
                    employer_id: row.employer_id,
                    status: parse_status(&row.status)?,
                    applied_at: row.applied_at,
                    resume_ref: row.resume_ref,
                    cover_letter: row.cover_letter,
                    status_history: histories.remove(&row.id).unwrap_or_default(),
                    messages: threads.remove(&row.id).unwrap_or_default(),
                    interview: interviews.remove(&row.id),
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    async fn find_where(&self, column: &str, value: Uuid) -> Result<Vec<Application>, AppError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE {column} = $1 ORDER BY applied_at DESC"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn load(&self, id: Uuid) -> Result<Application, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application".into()))
    }

    /// Lock the application row for the rest of the transaction and return
    /// its current status.
    async fn lock_row(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<ApplicationStatus, AppError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM applications WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        match status {
            Some(status) => parse_status(&status),
            None => Err(AppError::NotFound("Application".into())),
        }
    }

    async fn insert_status_row(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        entry: &StatusEntry,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO application_status_history
                (application_id, status, previous_status, actor_id, notes, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(entry.status.as_str())
        .bind(entry.previous_status.map(|s| s.as_str()))
        .bind(entry.actor_id)
        .bind(&entry.notes)
        .bind(&entry.details)
        .bind(entry.timestamp)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO applications
                (id, job_id, job_seeker_id, employer_id, status, resume_ref, cover_letter,
                 applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (job_id, job_seeker_id) DO NOTHING
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.job_seeker_id)
        .bind(application.employer_id)
        .bind(application.status.as_str())
        .bind(&application.resume_ref)
        .bind(&application.cover_letter)
        .bind(application.applied_at)
        .bind(application.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(AppError::Conflict(
                "application already exists for this job and job seeker".into(),
            ));
        }

        for entry in &application.status_history {
            Self::insert_status_row(&mut tx, application.id, entry).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND job_seeker_id = $2)",
        )
        .bind(job_id)
        .bind(job_seeker_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        self.find_where("job_id", job_id).await
    }

    async fn find_by_job_seeker(&self, job_seeker_id: Uuid) -> Result<Vec<Application>, AppError> {
        self.find_where("job_seeker_id", job_seeker_id).await
    }

    async fn find_by_employer(&self, employer_id: Uuid) -> Result<Vec<Application>, AppError> {
        self.find_where("employer_id", employer_id).await
    }

    async fn append_status(
        &self,
        id: Uuid,
        mut entry: StatusEntry,
        policy: TransitionPolicy,
    ) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_row(&mut tx, id).await?;
        policy.check(current, entry.status)?;
        entry.previous_status = Some(current);

        sqlx::query("UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(entry.status.as_str())
            .bind(entry.timestamp)
            .execute(&mut *tx)
            .await?;

        Self::insert_status_row(&mut tx, id, &entry).await?;

        tx.commit().await?;
        self.load(id).await
    }

    async fn append_message(
        &self,
        id: Uuid,
        message: &Message,
        mark_read_role: Option<MessageRole>,
    ) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_row(&mut tx, id).await?;

        if let Some(role) = mark_read_role {
            sqlx::query(
                r#"
                UPDATE application_messages
                SET is_read = TRUE
                WHERE application_id = $1 AND role = $2 AND is_read = FALSE
                "#,
            )
            .bind(id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO application_messages
                (id, application_id, sender_id, role, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(id)
        .bind(message.sender_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.read)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE applications SET updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.load(id).await
    }

    async fn mark_messages_read(&self, id: Uuid, message_ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE application_messages
            SET is_read = TRUE
            WHERE application_id = $1 AND id = ANY($2) AND is_read = FALSE
            "#,
        )
        .bind(id)
        .bind(message_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn save_interview(&self, interview: &Interview) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_row(&mut tx, interview.application_id).await?;

        // The interview row is the application's embedded copy; one upsert
        // keeps both views identical.
        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, application_id, interview_date, interview_time, location, interview_type,
                 notes, status, job_seeker_confirmed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (application_id) DO UPDATE SET
                interview_date = EXCLUDED.interview_date,
                interview_time = EXCLUDED.interview_time,
                location = EXCLUDED.location,
                interview_type = EXCLUDED.interview_type,
                notes = EXCLUDED.notes,
                status = EXCLUDED.status,
                job_seeker_confirmed = EXCLUDED.job_seeker_confirmed,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(interview.id)
        .bind(interview.application_id)
        .bind(interview.date)
        .bind(interview.time)
        .bind(&interview.location)
        .bind(interview.interview_type.as_str())
        .bind(&interview.notes)
        .bind(interview.status.as_str())
        .bind(interview.job_seeker_confirmed)
        .bind(interview.created_at)
        .bind(interview.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE applications SET updated_at = $2 WHERE id = $1")
            .bind(interview.application_id)
            .bind(interview.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.load(interview.application_id).await
    }

    async fn update_interview(
        &self,
        interview_id: Uuid,
        status: Option<InterviewStatus>,
        confirmed: Option<bool>,
        updated_at: DateTime<Utc>,
    ) -> Result<Application, AppError> {
        let application_id: Uuid =
            sqlx::query_scalar("SELECT application_id FROM interviews WHERE id = $1")
                .bind(interview_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Interview".into()))?;

        // Same lock order as save_interview: application row first.
        let mut tx = self.pool.begin().await?;
        Self::lock_row(&mut tx, application_id).await?;

        let updated = sqlx::query(
            r#"
            UPDATE interviews
            SET status = COALESCE($2, status),
                job_seeker_confirmed = COALESCE($3, job_seeker_confirmed),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(interview_id)
        .bind(status.map(|s| s.as_str()))
        .bind(confirmed)
        .bind(updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Replaced by a reschedule between the lookup and the lock
        if updated == 0 {
            return Err(AppError::NotFound("Interview".into()));
        }

        sqlx::query("UPDATE applications SET updated_at = $2 WHERE id = $1")
            .bind(application_id)
            .bind(updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.load(application_id).await
    }

    async fn find_interview(&self, interview_id: Uuid) -> Result<Option<Interview>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT id, application_id, interview_date, interview_time, location,
                   interview_type, notes, status, job_seeker_confirmed, created_at, updated_at
            FROM interviews
            WHERE id = $1
            "#,
        )
        .bind(interview_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InterviewRow::into_interview).transpose()
    }

    async fn ping(&self) -> Result<(), AppError> {
        crate::infrastructure::database::ping(&self.pool).await?;
        Ok(())
    }
}
