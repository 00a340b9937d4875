//! Configuration error types

use bitacl::AclError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML role config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Role '{role}' references unregistered assertion '{assertion}'")]
    UnknownAssertion { role: String, assertion: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid role set: {0}")]
    Acl(#[from] AclError),
}
