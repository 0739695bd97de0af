//! In-memory repository doubles.
//!
//! Same traits as the Postgres implementations, backed by maps behind a
//! `tokio::sync::Mutex`. Mutations on the event store all go through one
//! lock, which is the single-writer discipline the registration path needs:
//! two concurrent register calls for the last slot are serialized and the
//! loser observes a full event.

pub mod auth;
pub mod event;
pub mod health;
pub mod user;

pub use auth::AuthRepositoryMemory;
pub use event::EventRepositoryMemory;
pub use health::HealthCheckRepositoryMemory;
pub use user::UserRepositoryMemory;
