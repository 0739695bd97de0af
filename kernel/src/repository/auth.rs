use crate::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Resolves a presented bearer token to the user it was issued for.
    /// `None` means unknown or expired.
    async fn fetch_user_id_from_token(&self, access_token: &AccessToken)
        -> AppResult<Option<UserId>>;
    /// Verifies credentials, mints a token and stores it with a TTL.
    async fn create_token(&self, event: CreateToken) -> AppResult<(UserId, AccessToken)>;
    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()>;
}
