//! Keys under which the session is persisted.

/// Key for the bearer token.
pub const AUTH_TOKEN: &str = "authToken";

/// Key for the JSON-encoded current user.
pub const USER: &str = "user";
