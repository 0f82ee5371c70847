//! Process configuration, read once by the entry point from environment
//! variables and handed to the components it constructs.

use crate::builder::{BuilderOptions, DuplicateNames};
use crate::composer::ComposerOptions;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ATTEST_SIGNER is not set")]
    MissingSigner,

    #[error("invalid boolean for {0}: '{1}'")]
    InvalidFlag(String, String),
}

/// The account attestations are signed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerAccount {
    address: String,
}

impl SignerAccount {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Target network label, e.g. `polygon-amoy`.
    pub network: String,
    pub signer: SignerAccount,
    pub schema_name: String,
    pub builder: BuilderOptions,
    pub composer: ComposerOptions,
}

impl AppConfig {
    /// Variables:
    /// - `ATTEST_NETWORK` (default: `polygon-amoy`)
    /// - `ATTEST_SIGNER` (required)
    /// - `ATTEST_SCHEMA_NAME` (default: `SDK Test`)
    /// - `ATTEST_REJECT_DUPLICATE_FIELDS`, `ATTEST_CLEAR_DRAFT_ON_SUBMIT`,
    ///   `ATTEST_VALIDATE_VALUES` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signer = lookup("ATTEST_SIGNER")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSigner)?;
        let flag = |key: &str| -> Result<bool, ConfigError> {
            match lookup(key) {
                None => Ok(false),
                Some(value) => parse_flag(&value)
                    .ok_or_else(|| ConfigError::InvalidFlag(key.to_string(), value)),
            }
        };

        Ok(Self {
            network: lookup("ATTEST_NETWORK").unwrap_or_else(|| "polygon-amoy".to_string()),
            signer: SignerAccount::new(signer.trim()),
            schema_name: lookup("ATTEST_SCHEMA_NAME").unwrap_or_else(|| "SDK Test".to_string()),
            builder: BuilderOptions {
                duplicate_names: if flag("ATTEST_REJECT_DUPLICATE_FIELDS")? {
                    DuplicateNames::Reject
                } else {
                    DuplicateNames::Allow
                },
            },
            composer: ComposerOptions {
                clear_draft_on_submit: flag("ATTEST_CLEAR_DRAFT_ON_SUBMIT")?,
                validate_values: flag("ATTEST_VALIDATE_VALUES")?,
            },
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
