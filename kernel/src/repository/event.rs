use crate::model::{
    event::{
        event::{CreateEvent, DeleteEvent, UpdateEvent},
        Event,
    },
    id::{EventId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId>;
    async fn find_all(&self) -> AppResult<Vec<Event>>;
    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>>;
    async fn update(&self, event: UpdateEvent) -> AppResult<()>;
    async fn delete(&self, event: DeleteEvent) -> AppResult<()>;
    /// Atomic read-modify-write: loads the current roster, applies
    /// `Event::register` and persists the result, all under the store's
    /// serialization discipline. Returns the updated event. Concurrent
    /// collisions surface as `RegistrationConflict` for the caller to retry.
    async fn register_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event>;
    /// Same discipline as `register_worker`, applying `Event::unregister`.
    async fn unregister_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event>;
}
