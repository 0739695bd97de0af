use crate::{
    extractor::AuthorizedUser,
    model::user::{
        UpdateUserRoleRequest, UpdateUserRoleRequestWithUserId, UserResponse, UsersResponse,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kernel::model::{id::UserId, user::event::DeleteUser};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn show_user_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .find_all()
        .await
        .map(|users| UsersResponse {
            items: users.into_iter().map(UserResponse::from).collect(),
        })
        .map(Json)
}

pub async fn show_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

pub async fn show_user(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .find_by_id(user_id)
        .await
        .and_then(|found| match found {
            Some(found) => Ok(Json(found.into())),
            None => Err(AppError::EntityNotFound(format!(
                "user ({user_id}) was not found"
            ))),
        })
}

pub async fn update_user_role(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> AppResult<StatusCode> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }

    let update = UpdateUserRoleRequestWithUserId::new(user_id, req);
    registry
        .user_repository()
        .update_role(update.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_user(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_manager() {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .delete(DeleteUser { user_id })
        .await
        .map(|_| StatusCode::OK)
}
