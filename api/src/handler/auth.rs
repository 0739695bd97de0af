use crate::{
    extractor::AuthorizedUser,
    model::{
        auth::{AccessTokenResponse, LoginRequest},
        user::SignupRequest,
    },
};
use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::auth::event::CreateToken;
use registry::AppRegistry;
use shared::error::AppResult;

/// Public signup. Issues a token right away so a fresh account can use the
/// API without a separate login round-trip.
pub async fn signup(
    State(registry): State<AppRegistry>,
    Json(req): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AccessTokenResponse>)> {
    req.validate(&())?;

    let password = req.password.clone();
    let user = registry.user_repository().create(req.into()).await?;
    let (user_id, access_token) = registry
        .auth_repository()
        .create_token(CreateToken::new(user.email, password))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessTokenResponse {
            user_id,
            access_token: access_token.0,
        }),
    ))
}

pub async fn login(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    req.validate(&())?;

    let (user_id, access_token) = registry.auth_repository().create_token(req.into()).await?;
    Ok(Json(AccessTokenResponse {
        user_id,
        access_token: access_token.0,
    }))
}

pub async fn logout(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .auth_repository()
        .delete_token(user.access_token)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
