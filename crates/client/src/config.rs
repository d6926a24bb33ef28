//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `HUNGRY_OWL_API_BASE_URL` - REST API root (default: `http://localhost:8080/api`)
//! - `HUNGRY_OWL_API_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `HUNGRY_OWL_PAGE_SIZE` - List page size (default: 10)
//! - `HUNGRY_OWL_CURRENCY` - ISO 4217 display currency (default: VND)
//! - `HUNGRY_OWL_STORAGE_PATH` - Session file (default: `.hungry-owl/session.json`)
//! - `HUNGRY_OWL_DELIVERY_BASE_FEE` - Flat delivery fee (default: 15000)
//! - `HUNGRY_OWL_DELIVERY_PER_KM_FEE` - Fee per started km in the standard tier (default: 5000)
//! - `HUNGRY_OWL_DELIVERY_EXTRA_PER_KM_FEE` - Fee per started km beyond it (default: 7000)
//! - `HUNGRY_OWL_DELIVERY_BASE_RADIUS_KM` - Radius covered by the flat fee (default: 2)
//! - `HUNGRY_OWL_DELIVERY_STANDARD_RADIUS_KM` - End of the standard tier (default: 5)
//! - `HUNGRY_OWL_DEFAULT_LOCATION` - Fallback position as `lat,lon`

use std::fmt::Display;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use hungry_owl_core::{CurrencyCode, FeeSchedule, GeoCoordinate};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_STORAGE_PATH: &str = ".hungry-owl/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// HTTP API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

/// Everything the client needs at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub page_size: NonZeroU32,
    pub currency: CurrencyCode,
    pub storage_path: PathBuf,
    pub fee_schedule: FeeSchedule,
    pub default_location: Option<GeoCoordinate>,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = env.parse_or("HUNGRY_OWL_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let timeout_secs: u64 = env.parse_or("HUNGRY_OWL_API_TIMEOUT_SECS", "15")?;
        let page_size = env.parse_or("HUNGRY_OWL_PAGE_SIZE", "10")?;
        let currency = env.parse_or("HUNGRY_OWL_CURRENCY", "VND")?;
        let storage_path =
            PathBuf::from(env.get_or_default("HUNGRY_OWL_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let default_location = env
            .get_optional("HUNGRY_OWL_DEFAULT_LOCATION")
            .map(|raw| parse_value("HUNGRY_OWL_DEFAULT_LOCATION", &raw))
            .transpose()?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            page_size,
            currency,
            storage_path,
            fee_schedule: fee_schedule(&env)?,
            default_location,
        })
    }

    /// The configured fallback position.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `HUNGRY_OWL_DEFAULT_LOCATION`
    /// was not set.
    pub fn require_default_location(&self) -> Result<GeoCoordinate, ConfigError> {
        self.default_location
            .ok_or_else(|| ConfigError::MissingEnvVar("HUNGRY_OWL_DEFAULT_LOCATION".to_string()))
    }
}

fn fee_schedule(env: &Env<'_>) -> Result<FeeSchedule, ConfigError> {
    let defaults = FeeSchedule::default();
    let schedule = FeeSchedule {
        base_fee: env.fee_or("HUNGRY_OWL_DELIVERY_BASE_FEE", defaults.base_fee)?,
        per_km_fee: env.fee_or("HUNGRY_OWL_DELIVERY_PER_KM_FEE", defaults.per_km_fee)?,
        extra_per_km_fee: env.fee_or(
            "HUNGRY_OWL_DELIVERY_EXTRA_PER_KM_FEE",
            defaults.extra_per_km_fee,
        )?,
        base_radius_km: env.parse_or(
            "HUNGRY_OWL_DELIVERY_BASE_RADIUS_KM",
            &defaults.base_radius_km.to_string(),
        )?,
        standard_radius_km: env.parse_or(
            "HUNGRY_OWL_DELIVERY_STANDARD_RADIUS_KM",
            &defaults.standard_radius_km.to_string(),
        )?,
    };

    if schedule.standard_radius_km < schedule.base_radius_km {
        return Err(ConfigError::InvalidEnvVar(
            "HUNGRY_OWL_DELIVERY_STANDARD_RADIUS_KM".to_string(),
            "must not be smaller than the base radius".to_string(),
        ));
    }
    Ok(schedule)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the usual accessors.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        parse_value(key, &self.get_or_default(key, default))
    }

    /// Parse a non-negative money amount.
    fn fee_or(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        let fee: Decimal = self.parse_or(key, &default.to_string())?;
        if fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must not be negative".to_string(),
            ));
        }
        Ok(fee)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
