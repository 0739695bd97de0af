use chrono::{DateTime, Utc};
use kernel::model::{
    event::Event,
    id::{EventId, UserId},
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub struct EventRow {
    pub event_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub required_workers: i32,
    pub created_at: DateTime<Utc>,
}

impl EventRow {
    pub fn into_event(self, registered_workers: Vec<UserId>) -> Event {
        let EventRow {
            event_id,
            title,
            description,
            event_date,
            required_workers,
            created_at,
        } = self;
        Event {
            id: EventId::from(event_id),
            title,
            description,
            date: event_date,
            required_workers,
            registered_workers,
            created_at,
        }
    }
}

/// One row of the registrations join table, ordered by `registered_at` so
/// the roster keeps registration order.
#[derive(FromRow)]
pub struct EventRegistrationRow {
    pub event_id: Uuid,
    pub worker_id: Uuid,
}

impl EventRegistrationRow {
    pub fn worker_id(&self) -> UserId {
        UserId::from(self.worker_id)
    }
}
