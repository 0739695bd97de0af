use crate::model::{
    id::UserId,
    user::{
        event::{CreateUser, DeleteUser, UpdateUserRole},
        User,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, event: CreateUser) -> AppResult<User>;
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()>;
    async fn delete(&self, event: DeleteUser) -> AppResult<()>;
}
