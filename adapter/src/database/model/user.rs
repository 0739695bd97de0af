use kernel::model::{id::UserId, role::Role, user::User};
use shared::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role_name: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            user_name,
            email,
            role_name,
        } = value;
        let role = Role::from_str(role_name.as_str()).map_err(|_| {
            AppError::ConversionEntityError(format!("unknown role stored: {role_name}"))
        })?;
        Ok(User {
            id: UserId::from(user_id),
            name: user_name,
            email,
            role,
        })
    }
}
