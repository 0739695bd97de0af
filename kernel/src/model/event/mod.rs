use crate::model::id::{EventId, UserId};
use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult};

pub mod event;

/// One staffing opportunity with a worker quota.
///
/// Registration state is fully carried by `registered_workers`: whether the
/// event is full or still needs workers is derived from its length against
/// `required_workers`, never stored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    /// ISO-8601 timestamp string. The core stores it verbatim and never
    /// parses it.
    pub date: String,
    pub required_workers: i32,
    /// Registration order is insertion order. No duplicates.
    pub registered_workers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        // A non-positive quota reads as "no open slots".
        self.registered_workers.len() >= usize::try_from(self.required_workers).unwrap_or(0)
    }

    pub fn needs_workers(&self) -> bool {
        !self.is_full()
    }

    pub fn is_registered(&self, user_id: UserId) -> bool {
        self.registered_workers.contains(&user_id)
    }

    /// Adds `user_id` to the roster, preserving registration order.
    ///
    /// Capacity is checked before duplicate membership, so a worker who is
    /// already on a full roster gets `CapacityExceeded` back. Callers must
    /// apply the result as a single atomic read-modify-write against the
    /// backing store; this method only transforms the snapshot it was given.
    pub fn register(&mut self, user_id: UserId) -> AppResult<()> {
        if self.is_full() {
            return Err(AppError::CapacityExceeded(format!(
                "event ({}) already has {} of {} required workers",
                self.id,
                self.registered_workers.len(),
                self.required_workers
            )));
        }
        if self.is_registered(user_id) {
            return Err(AppError::AlreadyRegistered(format!(
                "user ({}) is already registered for event ({})",
                user_id, self.id
            )));
        }
        self.registered_workers.push(user_id);
        Ok(())
    }

    /// Removes `user_id` from the roster. Rejects workers that are not on
    /// it; unregistering is never a silent no-op.
    pub fn unregister(&mut self, user_id: UserId) -> AppResult<()> {
        let Some(pos) = self
            .registered_workers
            .iter()
            .position(|id| *id == user_id)
        else {
            return Err(AppError::NotRegistered(format!(
                "user ({}) is not registered for event ({})",
                user_id, self.id
            )));
        };
        self.registered_workers.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(required_workers: i32) -> Event {
        Event {
            id: EventId::new(),
            title: "Community Workshop".into(),
            description: "A workshop for community engagement.".into(),
            date: "2025-01-25T10:00:00Z".into(),
            required_workers,
            registered_workers: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn register_fills_up_to_quota_and_rejects_past_it() {
        let mut e = event(2);
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());

        assert!(e.register(a).is_ok());
        assert_eq!(e.registered_workers.len(), 1);
        assert!(e.needs_workers());

        assert!(e.register(b).is_ok());
        assert_eq!(e.registered_workers.len(), 2);
        assert!(e.is_full());

        assert!(matches!(e.register(c), Err(AppError::CapacityExceeded(_))));
        assert_eq!(e.registered_workers.len(), 2);

        assert!(e.unregister(a).is_ok());
        assert_eq!(e.registered_workers.len(), 1);

        assert!(e.register(c).is_ok());
        assert_eq!(e.registered_workers, vec![b, c]);
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let mut e = event(3);
        let a = UserId::new();

        e.register(a).unwrap();
        assert!(matches!(e.register(a), Err(AppError::AlreadyRegistered(_))));
        assert_eq!(e.registered_workers, vec![a]);
    }

    #[test]
    fn capacity_is_checked_before_duplicate_membership() {
        // A worker already on a full roster gets CapacityExceeded,
        // not AlreadyRegistered.
        let mut e = event(1);
        let a = UserId::new();

        e.register(a).unwrap();
        assert!(e.is_full());
        assert!(matches!(e.register(a), Err(AppError::CapacityExceeded(_))));
    }

    #[test]
    fn unregister_of_absent_worker_leaves_state_unchanged() {
        let mut e = event(2);
        let (a, stranger) = (UserId::new(), UserId::new());
        e.register(a).unwrap();

        assert!(matches!(
            e.unregister(stranger),
            Err(AppError::NotRegistered(_))
        ));
        assert_eq!(e.registered_workers, vec![a]);

        // A second unregister of the same worker is an explicit error too.
        e.unregister(a).unwrap();
        assert!(matches!(e.unregister(a), Err(AppError::NotRegistered(_))));
    }

    #[test]
    fn register_then_unregister_round_trips() {
        let mut e = event(3);
        let (a, b) = (UserId::new(), UserId::new());
        e.register(a).unwrap();

        let before = e.registered_workers.clone();
        e.register(b).unwrap();
        e.unregister(b).unwrap();
        assert_eq!(e.registered_workers, before);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut e = event(4);
        let workers: Vec<_> = (0..4).map(|_| UserId::new()).collect();
        for w in &workers {
            e.register(*w).unwrap();
        }
        assert_eq!(e.registered_workers, workers);
    }
}
