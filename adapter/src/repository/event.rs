use crate::database::{
    is_serialization_failure,
    model::event::{EventRegistrationRow, EventRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    event::{
        event::{CreateEvent, DeleteEvent, UpdateEvent},
        Event,
    },
    id::{EventId, UserId},
};
use kernel::repository::event::EventRepository;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(new)]
pub struct EventRepositoryImpl {
    db: ConnectionPool,
}

/// Under SERIALIZABLE, Postgres can abort with 40001 on the statement
/// itself or at commit, and the unique key on the roster can race to 23505.
/// All of those mean "a concurrent writer got there first" and must reach
/// the caller as `RegistrationConflict` so its retry loop re-drives the
/// operation; anything else keeps its infrastructure mapping.
fn map_roster_conflict(
    err: sqlx::Error,
    event_id: EventId,
    fallback: fn(sqlx::Error) -> AppError,
) -> AppError {
    if is_serialization_failure(&err) {
        AppError::RegistrationConflict(format!("concurrent roster update on event ({event_id})"))
    } else {
        fallback(err)
    }
}

impl EventRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    /// Loads the event row plus its roster inside the given transaction so
    /// register/unregister operate on a consistent snapshot.
    async fn load_event_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
    ) -> AppResult<Event> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT event_id, title, description, event_date, required_workers, created_at
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id.raw())
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(AppError::EntityNotFound(format!(
                "event ({event_id}) was not found"
            )));
        };

        let workers: Vec<EventRegistrationRow> = sqlx::query_as(
            r#"
            SELECT event_id, worker_id
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY registered_at ASC
            "#,
        )
        .bind(event_id.raw())
        .fetch_all(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.into_event(workers.iter().map(EventRegistrationRow::worker_id).collect()))
    }
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let event_id = EventId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO events (event_id, title, description, event_date, required_workers)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event_id.raw())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .bind(event.required_workers)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no event record has been created".into(),
            ));
        }

        Ok(event_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT event_id, title, description, event_date, required_workers, created_at
            FROM events
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let registrations: Vec<EventRegistrationRow> = sqlx::query_as(
            r#"
            SELECT event_id, worker_id
            FROM event_registrations
            ORDER BY registered_at ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut rosters: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for reg in registrations {
            rosters.entry(reg.event_id).or_default().push(reg.worker_id());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let roster = rosters.remove(&row.event_id).unwrap_or_default();
                row.into_event(roster)
            })
            .collect())
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        let mut tx = self.db.begin().await?;
        let found = match self.load_event_in_tx(&mut tx, event_id).await {
            Ok(event) => Some(event),
            Err(AppError::EntityNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(found)
    }

    async fn update(&self, event: UpdateEvent) -> AppResult<()> {
        // Quota edits deliberately do not touch the roster: lowering
        // required_workers below the current registration count is accepted
        // without evicting anyone.
        let res = sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                required_workers = COALESCE($5, required_workers)
            WHERE event_id = $1
            "#,
        )
        .bind(event.event_id.raw())
        .bind(event.title)
        .bind(event.description)
        .bind(event.date)
        .bind(event.required_workers)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "event ({}) was not found",
                event.event_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, event: DeleteEvent) -> AppResult<()> {
        // Registrations go with the event via ON DELETE CASCADE.
        let res = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event.event_id.raw())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "event ({}) was not found",
                event.event_id
            )));
        }

        Ok(())
    }

    async fn register_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let mut event = self.load_event_in_tx(&mut tx, event_id).await?;
        event.register(user_id)?;

        let res = sqlx::query(
            r#"
            INSERT INTO event_registrations (event_id, worker_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(event_id.raw())
        .bind(user_id.raw())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_roster_conflict(e, event_id, AppError::SpecificOperationError))?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no registration record has been created".into(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| map_roster_conflict(e, event_id, AppError::TransactionError))?;

        Ok(event)
    }

    async fn unregister_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let mut event = self.load_event_in_tx(&mut tx, event_id).await?;
        event.unregister(user_id)?;

        let res = sqlx::query(
            r#"
            DELETE FROM event_registrations
            WHERE event_id = $1 AND worker_id = $2
            "#,
        )
        .bind(event_id.raw())
        .bind(user_id.raw())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_roster_conflict(e, event_id, AppError::SpecificOperationError))?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no registration record has been removed".into(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| map_roster_conflict(e, event_id, AppError::TransactionError))?;

        Ok(event)
    }
}
