use crate::{
    extractor::AuthorizedUser,
    model::event::{
        CreateEventRequest, CreateEventResponse, EventResponse, EventsResponse,
        UpdateEventRequest, UpdateEventRequestWithIds,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{event::event::DeleteEvent, id::EventId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

/// How often a handler re-drives a registration against a fresh snapshot
/// after the store reports a concurrent-write collision. The Registration
/// Manager itself never retries.
const CONFLICT_RETRY_LIMIT: usize = 3;

pub async fn register_event(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<CreateEventResponse>)> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    registry
        .event_repository()
        .create(req.into())
        .await
        .map(|event_id| (StatusCode::CREATED, Json(CreateEventResponse { event_id })))
}

pub async fn show_event_list(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    registry
        .event_repository()
        .find_all()
        .await
        .map(EventsResponse::from)
        .map(Json)
}

pub async fn show_event(
    _user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .event_repository()
        .find_by_id(event_id)
        .await
        .and_then(|event| match event {
            Some(event) => Ok(Json(event.into())),
            None => Err(AppError::EntityNotFound(format!(
                "event ({event_id}) was not found"
            ))),
        })
}

pub async fn update_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<StatusCode> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    let update_event = UpdateEventRequestWithIds::new(event_id, user.id(), req);
    registry
        .event_repository()
        .update(update_event.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }

    let delete_event = DeleteEvent {
        event_id,
        requested_user: user.id(),
    };
    registry
        .event_repository()
        .delete(delete_event)
        .await
        .map(|_| StatusCode::OK)
}

/// The acting worker comes from the token, never from the request body.
pub async fn register_for_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    let repo = registry.event_repository();
    let mut attempts = 0;
    loop {
        match repo.register_worker(event_id, user.id()).await {
            Err(AppError::RegistrationConflict(reason)) => {
                attempts += 1;
                if attempts >= CONFLICT_RETRY_LIMIT {
                    return Err(AppError::RegistrationConflict(reason));
                }
                tracing::debug!(%event_id, attempts, "retrying registration after conflict");
            }
            other => return other.map(EventResponse::from).map(Json),
        }
    }
}

pub async fn unregister_for_event(
    user: AuthorizedUser,
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    let repo = registry.event_repository();
    let mut attempts = 0;
    loop {
        match repo.unregister_worker(event_id, user.id()).await {
            Err(AppError::RegistrationConflict(reason)) => {
                attempts += 1;
                if attempts >= CONFLICT_RETRY_LIMIT {
                    return Err(AppError::RegistrationConflict(reason));
                }
                tracing::debug!(%event_id, attempts, "retrying unregistration after conflict");
            }
            other => return other.map(EventResponse::from).map(Json),
        }
    }
}
