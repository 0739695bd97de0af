pub mod auth;
pub mod event;
pub mod health;
pub mod memory;
pub mod user;
