// ── Common types shared across the domain model ──

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scheme nginx uses to reach an upstream.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl FromStr for Protocol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(CoreError::validation(
                "protocol",
                format!("expected 'http' or 'https', got '{other}'"),
            )),
        }
    }
}

/// Validate a user-supplied port; 0 is never a usable upstream port.
pub(crate) fn validate_port(field: &str, port: u16) -> Result<(), CoreError> {
    if port == 0 {
        return Err(CoreError::validation(field, "port must be in 1-65535"));
    }
    Ok(())
}

/// Reject empty or whitespace-only required values.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Reject values that would break out of a single nginx directive argument.
pub(crate) fn require_directive_value(field: &str, value: &str) -> Result<(), CoreError> {
    require_non_empty(field, value)?;
    if let Some(bad) = value.chars().find(|c| matches!(*c, ';' | '{' | '}' | '#' | '\n' | '\r')) {
        return Err(CoreError::validation(
            field,
            format!("'{}' is not allowed in a directive value", bad.escape_default()),
        ));
    }
    Ok(())
}
