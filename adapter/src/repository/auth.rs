use crate::{
    database::ConnectionPool,
    redis::{
        model::{RedisKey, RedisValue},
        RedisClient,
    },
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};
use sqlx::FromRow;
use std::{str::FromStr, sync::Arc};
use uuid::Uuid;

pub struct AuthorizationKey(String);

impl RedisKey for AuthorizationKey {
    type Value = AuthorizedUserId;

    fn inner(&self) -> String {
        self.0.clone()
    }
}

impl From<&AccessToken> for AuthorizationKey {
    fn from(token: &AccessToken) -> Self {
        Self(token.0.clone())
    }
}

impl From<AccessToken> for AuthorizationKey {
    fn from(token: AccessToken) -> Self {
        Self(token.0)
    }
}

pub struct AuthorizedUserId(UserId);

impl RedisValue for AuthorizedUserId {
    fn inner(&self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<String> for AuthorizedUserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::from_str(&value).map(Self)
    }
}

#[derive(FromRow)]
struct UserCredentialRow {
    user_id: Uuid,
    password_hash: String,
}

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
    ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        let key = AuthorizationKey::from(access_token);
        Ok(self.kv.get(&key).await?.map(|value| value.0))
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<(UserId, AccessToken)> {
        let row: Option<UserCredentialRow> = sqlx::query_as(
            r#"
            SELECT user_id, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&event.email)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(AppError::UnauthenticatedError);
        };

        let valid = bcrypt::verify(&event.password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        let user_id = UserId::from(row.user_id);
        let access_token = AccessToken(Uuid::new_v4().simple().to_string());
        let key = AuthorizationKey::from(&access_token);
        self.kv
            .set_ex(&key, &AuthorizedUserId(user_id), self.ttl)
            .await?;

        Ok((user_id, access_token))
    }

    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()> {
        let key = AuthorizationKey::from(access_token);
        self.kv.delete(&key).await
    }
}
