//! Client-side models.

pub mod favorite;
pub mod session;
pub mod user;

pub use favorite::{FavoriteKind, FavoriteTarget};
pub use user::User;
