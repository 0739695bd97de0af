use super::UserRepositoryMemory;
use async_trait::async_trait;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use kernel::repository::auth::AuthRepository;
use shared::error::AppResult;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct AuthRepositoryMemory {
    users: Arc<UserRepositoryMemory>,
    tokens: Mutex<HashMap<String, UserId>>,
}

impl AuthRepositoryMemory {
    pub fn new(users: Arc<UserRepositoryMemory>) -> Self {
        Self {
            users,
            tokens: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryMemory {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        Ok(self.tokens.lock().await.get(&access_token.0).copied())
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<(UserId, AccessToken)> {
        let user_id = self
            .users
            .verify_credentials(&event.email, &event.password)
            .await?;
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.lock().await.insert(token.clone(), user_id);
        Ok((user_id, AccessToken(token)))
    }

    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()> {
        self.tokens.lock().await.remove(&access_token.0);
        Ok(())
    }
}
