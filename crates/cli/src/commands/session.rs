//! Persisted session management.
//!
//! # Usage
//!
//! ```bash
//! ho-cli session show
//! ho-cli session login -t "$TOKEN" -u 7 -n "Lan Nguyen" -e lan@example.com
//! ho-cli session logout
//! ```

use hungry_owl_client::Result;
use hungry_owl_client::models::User;
use hungry_owl_core::UserId;
use secrecy::SecretString;

use super::Context;

/// Print the persisted user. The token is never shown.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    match session.user() {
        Some(user) if session.is_authenticated() => {
            println!("Logged in as {} <{}> (id {})", user.full_name, user.email, user.id);
        }
        _ => println!("Not logged in"),
    }
    Ok(())
}

/// Persist a session obtained from the login endpoint.
pub async fn login(
    ctx: &Context,
    token: String,
    user_id: i32,
    name: String,
    email: String,
) -> Result<()> {
    let user = User {
        id: UserId::new(user_id),
        full_name: name,
        email,
        phone: None,
        address: None,
        avatar_url: None,
    };

    let session = ctx.session().await?;
    session.set_user(user, SecretString::from(token)).await?;
    tracing::info!(path = %ctx.storage.path().display(), "Session saved");
    Ok(())
}

/// Remove the persisted session.
pub async fn logout(ctx: &Context) -> Result<()> {
    let state = ctx.state().await?;
    if !state.session().is_authenticated() {
        tracing::info!("No session to remove");
        return Ok(());
    }
    state.logout().await?;
    tracing::info!("Session removed");
    Ok(())
}
