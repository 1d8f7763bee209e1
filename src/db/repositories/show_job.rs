use crate::db::repositories::episode::EpisodeRepository;
use crate::db::repositories::show::ShowRepository;
use crate::domain::JobStatus;
use crate::entities::{job_shows, prelude::*};
use crate::models::{EnqueuedJob, Episode, Show};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, RuntimeErr, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Attempts after the first when another connection holds the write lock.
const BUSY_RETRIES: u32 = 5;

/// Result of enqueueing a show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enqueued {
    pub job: EnqueuedJob,
    /// `false` when a pending job for the same external id already existed.
    pub created: bool,
}

/// Repository for show ingestion jobs
pub struct ShowJobRepository {
    conn: DatabaseConnection,
    write_gate: Arc<Mutex<()>>,
}

impl ShowJobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, write_gate: Arc<Mutex<()>>) -> Self {
        Self { conn, write_gate }
    }

    fn to_job(m: job_shows::Model) -> EnqueuedJob {
        EnqueuedJob {
            internal_show_id: m.show_id,
            internal_job_show_id: m.id,
            status: JobStatus::parse(&m.status).unwrap_or_default(),
            retry_count: m.retry_count,
        }
    }

    async fn find_pending_in<C: ConnectionTrait>(
        conn: &C,
        external_id: &str,
    ) -> Result<Option<job_shows::Model>, DbErr> {
        JobShows::find()
            .filter(job_shows::Column::ExternalId.eq(external_id))
            .filter(job_shows::Column::Status.eq(JobStatus::Pending.as_str()))
            .one(conn)
            .await
    }

    pub async fn find_pending(&self, external_id: &str) -> Result<Option<EnqueuedJob>> {
        let row = Self::find_pending_in(&self.conn, external_id.trim()).await?;
        Ok(row.map(Self::to_job))
    }

    pub async fn get(&self, id: &str) -> Result<Option<EnqueuedJob>> {
        let row = JobShows::find_by_id(id.to_string()).one(&self.conn).await?;
        Ok(row.map(Self::to_job))
    }

    /// Atomically creates the show, its episodes and a pending job.
    ///
    /// If a pending job for the show's external id already exists, nothing is
    /// written and that job is returned. Episodes colliding on
    /// `(show, season, episode)` are skipped. Any other failure rolls back the
    /// whole unit, as does dropping the returned future before it completes.
    pub async fn enqueue(&self, show: &Show, episodes: &[Episode]) -> Result<Enqueued> {
        let external_id = show.external_id.trim();
        if external_id.is_empty() {
            anyhow::bail!("cannot enqueue a show without an external id");
        }

        let _guard = self.write_gate.lock().await;

        let mut attempt = 0;
        let enqueued = loop {
            match self.try_enqueue(external_id, show, episodes).await {
                Ok(enqueued) => break enqueued,
                Err(err) if is_busy(&err) && attempt < BUSY_RETRIES => {
                    // Another connection is writing; the retry re-runs the
                    // pending lookup and normally finds its job.
                    attempt += 1;
                    warn!(external_id, attempt, error = %err, "Store busy during enqueue; retrying");
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                }
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    // Another connection committed a pending job for this id first.
                    warn!(external_id, "Pending job insert raced; returning existing job");
                    let existing = Self::find_pending_in(&self.conn, external_id)
                        .await?
                        .ok_or(err)?;
                    break Enqueued {
                        job: Self::to_job(existing),
                        created: false,
                    };
                }
                Err(err) => return Err(err.into()),
            }
        };

        let outcome = if enqueued.created { "created" } else { "existing" };
        metrics::counter!("show_jobs_enqueued_total", "outcome" => outcome).increment(1);

        Ok(enqueued)
    }

    async fn try_enqueue(
        &self,
        external_id: &str,
        show: &Show,
        episodes: &[Episode],
    ) -> Result<Enqueued, DbErr> {
        let txn = self.conn.begin().await?;

        if let Some(existing) = Self::find_pending_in(&txn, external_id).await? {
            txn.commit().await?;
            debug!(external_id, job_id = %existing.id, "Pending job already exists");
            return Ok(Enqueued {
                job: Self::to_job(existing),
                created: false,
            });
        }

        let show_row = ShowRepository::insert_in(&txn, show).await?;

        let inserted =
            EpisodeRepository::insert_ignoring_conflicts(&txn, &show_row.id, episodes).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let job = job_shows::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            show_id: Set(show_row.id.clone()),
            external_id: Set(external_id.to_string()),
            status: Set(JobStatus::Pending.as_str().to_string()),
            retry_count: Set(0),
            last_error: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        debug!(
            external_id,
            show_id = %show_row.id,
            episodes_inserted = inserted,
            episodes_supplied = episodes.len(),
            "Show job created"
        );

        Ok(Enqueued {
            job: Self::to_job(job),
            created: true,
        })
    }
}

/// `SQLITE_BUSY` / `SQLITE_LOCKED`, including extended codes such as
/// `SQLITE_BUSY_SNAPSHOT`.
fn is_busy(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))
    | DbErr::Conn(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };

    e.as_database_error()
        .and_then(|db| db.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_sqlite_errors_are_not_busy() {
        assert!(!is_busy(&DbErr::Custom("database is locked".into())));
        assert!(!is_busy(&DbErr::RecordNotFound("job".into())));
        assert!(!is_busy(&DbErr::Exec(RuntimeErr::Internal("x".into()))));
    }
}
