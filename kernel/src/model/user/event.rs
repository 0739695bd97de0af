use crate::model::{id::UserId, role::Role};

pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub struct UpdateUserRole {
    pub user_id: UserId,
    pub role: Role,
}

pub struct DeleteUser {
    pub user_id: UserId,
}
