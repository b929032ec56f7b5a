//! Request DTOs for the service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum accepted length of a user name, in bytes.
pub const MAX_NAME_LENGTH: usize = 128;

/// Request body for renaming a user (PUT /users/:id)
#[derive(Debug, Clone, Deserialize)]
pub struct RenameUserRequest {
    /// The new display name
    pub name: String,
}

impl RenameUserRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} bytes",
                MAX_NAME_LENGTH
            ));
        }
        None
    }
}
