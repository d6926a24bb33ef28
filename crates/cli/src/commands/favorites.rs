//! Favorite listing and toggling.
//!
//! # Usage
//!
//! ```bash
//! ho-cli favorites list
//! ho-cli favorites list --kind product
//! ho-cli favorites toggle restaurant 4
//! ```

use hungry_owl_client::Result;
use hungry_owl_client::models::{FavoriteKind, FavoriteTarget};

use super::Context;

/// Print favorite ids, optionally for one kind only.
#[allow(clippy::print_stdout)]
pub async fn list(ctx: &Context, kind: Option<FavoriteKind>) -> Result<()> {
    let state = ctx.state().await?;
    let favorites = state.favorites();
    favorites.fetch_favorites().await;

    if let Some(error) = favorites.error() {
        tracing::warn!("Favorites could not be loaded: {error}");
    }

    let kinds = kind.map_or_else(|| FavoriteKind::ALL.to_vec(), |kind| vec![kind]);
    for kind in kinds {
        let ids = favorites.ids(kind);
        let joined = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        println!("{} ({}): {joined}", kind.path_segment(), ids.len());
    }
    Ok(())
}

/// Flip one favorite and print the new membership.
#[allow(clippy::print_stdout)]
pub async fn toggle(ctx: &Context, kind: FavoriteKind, id: i32) -> Result<()> {
    let state = ctx.state().await?;
    let target = FavoriteTarget::new(kind, id);

    let now_favorite = state.favorites().toggle_favorite(target).await?;
    if now_favorite {
        println!("Added {target} to favorites");
    } else {
        println!("Removed {target} from favorites");
    }
    Ok(())
}
