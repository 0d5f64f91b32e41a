use std::fmt;

use serde::{Deserialize, Serialize};

/// The service's structured representation of a failed call:
/// `{"error": {"code", "message", "param", "type"}}`. Every field may be
/// absent on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

impl std::error::Error for ServiceError {}

/// Wrapper matching the envelope's outer object.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ServiceError,
}
