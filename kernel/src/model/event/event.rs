use crate::model::id::{EventId, UserId};

pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub required_workers: i32,
}

/// Field edits by a manager. Lowering `required_workers` below the current
/// roster length is accepted and does not evict anyone.
#[derive(Debug)]
pub struct UpdateEvent {
    pub event_id: EventId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub required_workers: Option<i32>,
    pub requested_user: UserId,
}

#[derive(Debug)]
pub struct DeleteEvent {
    pub event_id: EventId,
    pub requested_user: UserId,
}
