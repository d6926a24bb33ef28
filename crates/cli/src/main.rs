//! Hungry Owl CLI - Delivery fee estimates and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Fee for a known distance
//! ho-cli fee --distance 3.2
//!
//! # Fee from a restaurant to a customer
//! ho-cli fee --restaurant 10.7769,106.7009 --customer 10.8066,106.7009
//!
//! # Store a session obtained from the login endpoint
//! ho-cli session login --token "$TOKEN" --user-id 7 --name "Lan Nguyen" --email lan@example.com
//!
//! # List favorite restaurants and toggle a product
//! ho-cli favorites list --kind restaurant
//! ho-cli favorites toggle product 12
//!
//! # Second page of open restaurants
//! ho-cli restaurants --page 2 --filter open=true
//! ```
//!
//! # Commands
//!
//! - `fee` - Delivery distance and fee
//! - `session` - Show, store or remove the persisted session
//! - `favorites` - List or toggle favorites
//! - `restaurants` - Paginated, filtered restaurant listing
//!
//! Configuration is read from `HUNGRY_OWL_*` environment variables (see
//! `hungry_owl_client::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use hungry_owl_client::models::FavoriteKind;
use hungry_owl_core::GeoCoordinate;
use serde_json::Value;

mod commands;

#[derive(Parser)]
#[command(name = "ho-cli")]
#[command(author, version, about = "Hungry Owl CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a delivery fee
    Fee {
        /// Distance in kilometers
        #[arg(short, long, conflicts_with_all = ["restaurant", "customer"])]
        distance: Option<f64>,

        /// Restaurant position as `lat,lon`
        #[arg(short, long, required_unless_present = "distance")]
        restaurant: Option<GeoCoordinate>,

        /// Customer position as `lat,lon` (default: `HUNGRY_OWL_DEFAULT_LOCATION`)
        #[arg(short, long)]
        customer: Option<GeoCoordinate>,
    },
    /// Manage the persisted session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// List or toggle favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// List restaurants
    Restaurants {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size (default: `HUNGRY_OWL_PAGE_SIZE`)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Filter as `key=value`; values are parsed as JSON when possible
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show the persisted session
    Show,
    /// Persist a session
    Login {
        /// Bearer token returned by the login endpoint
        #[arg(short, long)]
        token: String,

        /// Server id of the user
        #[arg(short, long)]
        user_id: i32,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: String,
    },
    /// Remove the persisted session
    Logout,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite ids
    List {
        /// Only this kind (`restaurant` or `product`)
        #[arg(short, long)]
        kind: Option<FavoriteKind>,
    },
    /// Flip a favorite
    Toggle {
        /// `restaurant` or `product`
        kind: FavoriteKind,

        /// Server id
        id: i32,
    },
}

fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hungry_owl_client=info,hungry_owl_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::load()?;

    match cli.command {
        Commands::Fee {
            distance,
            restaurant,
            customer,
        } => match (distance, restaurant) {
            (Some(km), _) => commands::fee::for_distance(&ctx, km),
            (None, Some(restaurant)) => commands::fee::between(&ctx, restaurant, customer).await?,
            (None, None) => return Err("either --distance or --restaurant is required".into()),
        },
        Commands::Session { action } => match action {
            SessionAction::Show => commands::session::show(&ctx).await?,
            SessionAction::Login {
                token,
                user_id,
                name,
                email,
            } => commands::session::login(&ctx, token, user_id, name, email).await?,
            SessionAction::Logout => commands::session::logout(&ctx).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { kind } => commands::favorites::list(&ctx, kind).await?,
            FavoritesAction::Toggle { kind, id } => {
                commands::favorites::toggle(&ctx, kind, id).await?;
            }
        },
        Commands::Restaurants {
            page,
            limit,
            filters,
        } => commands::restaurants::list(&ctx, page, limit, filters).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_values() {
        assert_eq!(
            parse_filter("open=true").unwrap(),
            ("open".to_string(), Value::Bool(true))
        );
        assert_eq!(
            parse_filter("category=3").unwrap(),
            ("category".to_string(), serde_json::json!(3))
        );
        assert_eq!(
            parse_filter("q=com tam").unwrap(),
            ("q".to_string(), Value::String("com tam".to_string()))
        );
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fee_command() {
        let cli = Cli::try_parse_from(["ho-cli", "fee", "--distance", "3.2"]).unwrap();
        assert!(matches!(cli.command, Commands::Fee { distance: Some(d), .. } if (d - 3.2).abs() < f64::EPSILON));

        assert!(Cli::try_parse_from(["ho-cli", "fee"]).is_err());
        assert!(Cli::try_parse_from(["ho-cli", "fee", "-d", "1", "-r", "1,2"]).is_err());
    }
}
