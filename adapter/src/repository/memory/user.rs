use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kernel::model::{
    id::UserId,
    user::{
        event::{CreateUser, DeleteUser, UpdateUserRole},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;
use tokio::sync::Mutex;

struct UserRecord {
    user: User,
    // Stored in the clear; this double never leaves test processes.
    password: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct UserRepositoryMemory {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl UserRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<UserId> {
        let guard = self.users.lock().await;
        guard
            .values()
            .find(|record| record.user.email == email && record.password == password)
            .map(|record| record.user.id)
            .ok_or(AppError::UnauthenticatedError)
    }
}

#[async_trait]
impl UserRepository for UserRepositoryMemory {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let mut guard = self.users.lock().await;
        if guard.values().any(|record| record.user.email == event.email) {
            return Err(AppError::UnprocessableEntity(format!(
                "a user with email ({}) already exists",
                event.email
            )));
        }
        let user = User {
            id: UserId::new(),
            name: event.name,
            email: event.email,
            role: event.role,
        };
        guard.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password: event.password,
                created_at: Utc::now(),
            },
        );
        Ok(user)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        // Newest first, same ordering as the Postgres implementation.
        let guard = self.users.lock().await;
        let mut records: Vec<&UserRecord> = guard.values().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records.into_iter().map(|record| record.user.clone()).collect())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .get(&user_id)
            .map(|record| record.user.clone()))
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let mut guard = self.users.lock().await;
        let Some(record) = guard.get_mut(&event.user_id) else {
            return Err(AppError::EntityNotFound(format!(
                "user ({}) was not found",
                event.user_id
            )));
        };
        record.user.role = event.role;
        Ok(())
    }

    async fn delete(&self, event: DeleteUser) -> AppResult<()> {
        match self.users.lock().await.remove(&event.user_id) {
            Some(_) => Ok(()),
            None => Err(AppError::EntityNotFound(format!(
                "user ({}) was not found",
                event.user_id
            ))),
        }
    }
}
