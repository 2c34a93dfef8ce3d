use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{Decimal, MemberId};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// The house/company account credited at level 0.
    pub admin_member_id: MemberId,
    /// How many eligible uplines a distribution pays, at most.
    pub max_upline_depth: usize,
    /// Bounded placement retries after losing a slot race.
    pub placement_max_retries: u32,
    /// Policy flag: accept registrations under an inactive referrer.
    pub allow_inactive_referrer: bool,
    /// Upper bound on a single triggering amount; beyond it the ledger
    /// refuses the event.
    pub max_ledger_amount: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let admin_member_id = env_map
            .get("ADMIN_MEMBER_ID")
            .cloned()
            .map(MemberId::new)
            .ok_or_else(|| ConfigError::MissingEnv("ADMIN_MEMBER_ID".to_string()))?;

        let max_upline_depth = env_map
            .get("MAX_UPLINE_DEPTH")
            .map(|s| s.as_str())
            .unwrap_or("4")
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_UPLINE_DEPTH".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        let placement_max_retries = env_map
            .get("PLACEMENT_MAX_RETRIES")
            .map(|s| s.as_str())
            .unwrap_or("3")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "PLACEMENT_MAX_RETRIES".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        let allow_inactive_referrer = match env_map
            .get("ALLOW_INACTIVE_REFERRER")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" => true,
            "false" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ALLOW_INACTIVE_REFERRER".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let max_ledger_amount_raw = env_map
            .get("MAX_LEDGER_AMOUNT")
            .map(|s| s.as_str())
            .unwrap_or("1000000000");
        let max_ledger_amount =
            Decimal::from_str_canonical(max_ledger_amount_raw).map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_LEDGER_AMOUNT".to_string(),
                    "must be a valid decimal".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            admin_member_id,
            max_upline_depth,
            placement_max_retries,
            allow_inactive_referrer,
            max_ledger_amount,
        })
    }
}
