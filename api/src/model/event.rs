use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    event::{
        event::{CreateEvent, UpdateEvent},
        Event,
    },
    id::{EventId, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    pub description: String,
    #[garde(length(min = 1))]
    pub date: String,
    #[garde(range(min = 1))]
    pub required_workers: i32,
}

impl From<CreateEventRequest> for CreateEvent {
    fn from(value: CreateEventRequest) -> Self {
        let CreateEventRequest {
            title,
            description,
            date,
            required_workers,
        } = value;
        CreateEvent {
            title,
            description,
            date,
            required_workers,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub event_id: EventId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub date: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub required_workers: Option<i32>,
}

#[derive(new)]
pub struct UpdateEventRequestWithIds(EventId, UserId, UpdateEventRequest);

impl From<UpdateEventRequestWithIds> for UpdateEvent {
    fn from(value: UpdateEventRequestWithIds) -> Self {
        let UpdateEventRequestWithIds(
            event_id,
            requested_user,
            UpdateEventRequest {
                title,
                description,
                date,
                required_workers,
            },
        ) = value;
        UpdateEvent {
            event_id,
            title,
            description,
            date,
            required_workers,
            requested_user,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub required_workers: i32,
    pub registered_workers: Vec<UserId>,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(value: Event) -> Self {
        let is_full = value.is_full();
        let Event {
            id,
            title,
            description,
            date,
            required_workers,
            registered_workers,
            created_at,
        } = value;
        Self {
            id,
            title,
            description,
            date,
            required_workers,
            registered_workers,
            is_full,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Vec<EventResponse>,
}

impl From<Vec<Event>> for EventsResponse {
    fn from(value: Vec<Event>) -> Self {
        Self {
            items: value.into_iter().map(EventResponse::from).collect(),
        }
    }
}
