use async_trait::async_trait;
use chrono::Utc;
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
use tokio::sync::Mutex;

#[derive(Default)]
pub struct EventRepositoryMemory {
    events: Mutex<HashMap<EventId, Event>>,
}

impl EventRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for EventRepositoryMemory {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let event_id = EventId::new();
        let record = Event {
            id: event_id,
            title: event.title,
            description: event.description,
            date: event.date,
            required_workers: event.required_workers,
            registered_workers: vec![],
            created_at: Utc::now(),
        };
        self.events.lock().await.insert(event_id, record);
        Ok(event_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Event>> {
        let guard = self.events.lock().await;
        let mut events: Vec<Event> = guard.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        Ok(self.events.lock().await.get(&event_id).cloned())
    }

    async fn update(&self, event: UpdateEvent) -> AppResult<()> {
        let mut guard = self.events.lock().await;
        let Some(record) = guard.get_mut(&event.event_id) else {
            return Err(AppError::EntityNotFound(format!(
                "event ({}) was not found",
                event.event_id
            )));
        };
        if let Some(title) = event.title {
            record.title = title;
        }
        if let Some(description) = event.description {
            record.description = description;
        }
        if let Some(date) = event.date {
            record.date = date;
        }
        if let Some(required_workers) = event.required_workers {
            // Roster untouched even when the quota drops below its length.
            record.required_workers = required_workers;
        }
        Ok(())
    }

    async fn delete(&self, event: DeleteEvent) -> AppResult<()> {
        match self.events.lock().await.remove(&event.event_id) {
            Some(_) => Ok(()),
            None => Err(AppError::EntityNotFound(format!(
                "event ({}) was not found",
                event.event_id
            ))),
        }
    }

    async fn register_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event> {
        let mut guard = self.events.lock().await;
        let Some(record) = guard.get_mut(&event_id) else {
            return Err(AppError::EntityNotFound(format!(
                "event ({event_id}) was not found"
            )));
        };
        record.register(user_id)?;
        Ok(record.clone())
    }

    async fn unregister_worker(&self, event_id: EventId, user_id: UserId) -> AppResult<Event> {
        let mut guard = self.events.lock().await;
        let Some(record) = guard.get_mut(&event_id) else {
            return Err(AppError::EntityNotFound(format!(
                "event ({event_id}) was not found"
            )));
        };
        record.unregister(user_id)?;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_event(required_workers: i32) -> CreateEvent {
        CreateEvent {
            title: "Night shift".into(),
            description: "Load-out crew".into(),
            date: "2025-02-01T22:00:00Z".into(),
            required_workers,
        }
    }

    #[tokio::test]
    async fn concurrent_registrations_for_the_last_slot_pick_one_winner() {
        let repo = Arc::new(EventRepositoryMemory::new());
        let event_id = repo.create(create_event(1)).await.unwrap();
        let (a, b) = (UserId::new(), UserId::new());

        let repo_a = Arc::clone(&repo);
        let repo_b = Arc::clone(&repo);
        let task_a = tokio::spawn(async move { repo_a.register_worker(event_id, a).await });
        let task_b = tokio::spawn(async move { repo_b.register_worker(event_id, b).await });

        let res_a = task_a.await.unwrap();
        let res_b = task_b.await.unwrap();

        assert_eq!(
            [&res_a, &res_b].iter().filter(|r| r.is_ok()).count(),
            1,
            "exactly one of the two racing registrations must win"
        );
        for res in [res_a, res_b] {
            if let Err(e) = res {
                assert!(matches!(e, AppError::CapacityExceeded(_)));
            }
        }

        let event = repo.find_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(event.registered_workers.len(), 1);
    }

    #[tokio::test]
    async fn lowering_the_quota_does_not_evict_registered_workers() {
        let repo = EventRepositoryMemory::new();
        let event_id = repo.create(create_event(3)).await.unwrap();
        let workers: Vec<_> = (0..3).map(|_| UserId::new()).collect();
        for w in &workers {
            repo.register_worker(event_id, *w).await.unwrap();
        }

        repo.update(UpdateEvent {
            event_id,
            title: None,
            description: None,
            date: None,
            required_workers: Some(1),
            requested_user: UserId::new(),
        })
        .await
        .unwrap();

        let event = repo.find_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(event.required_workers, 1);
        assert_eq!(event.registered_workers, workers);
        // Over quota now, so further registrations are refused.
        assert!(matches!(
            repo.register_worker(event_id, UserId::new()).await,
            Err(AppError::CapacityExceeded(_))
        ));
    }

    #[tokio::test]
    async fn register_against_missing_event_is_not_found() {
        let repo = EventRepositoryMemory::new();
        assert!(matches!(
            repo.register_worker(EventId::new(), UserId::new()).await,
            Err(AppError::EntityNotFound(_))
        ));
    }
}
