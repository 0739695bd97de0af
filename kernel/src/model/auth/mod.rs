pub mod event;

/// Bearer token handed out at login and resolved back to a `UserId` by the
/// auth repository on every request.
pub struct AccessToken(pub String);
