// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Identifier validation, applied before any storage call.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_RESOURCE_ID_LENGTH: usize = 64;
const MAX_VIEWER_ID_LENGTH: usize = 128;

// Resource ids name files in the store, so the charset is strict. Viewer
// ids are client-generated opaque strings and only live inside documents.
static RESOURCE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static VIEWER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._:-]+$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("Invalid viewer id: {0}")]
    InvalidViewerId(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a resource identifier
pub fn validate_resource_id(resource_id: &str) -> ValidationResult<&str> {
    if resource_id.is_empty() {
        return Err(ValidationError::InvalidResourceId(
            "resource id must not be empty".to_string(),
        ));
    }

    if resource_id.len() > MAX_RESOURCE_ID_LENGTH {
        return Err(ValidationError::InvalidResourceId(format!(
            "resource id must be at most {MAX_RESOURCE_ID_LENGTH} characters"
        )));
    }

    if !RESOURCE_ID_REGEX.is_match(resource_id) {
        return Err(ValidationError::InvalidResourceId(
            "resource id must contain only alphanumeric characters, hyphens, and underscores"
                .to_string(),
        ));
    }

    Ok(resource_id)
}

/// Validate a viewer identifier
pub fn validate_viewer_id(viewer_id: &str) -> ValidationResult<&str> {
    if viewer_id.is_empty() {
        return Err(ValidationError::InvalidViewerId(
            "viewer id must not be empty".to_string(),
        ));
    }

    if viewer_id.len() > MAX_VIEWER_ID_LENGTH {
        return Err(ValidationError::InvalidViewerId(format!(
            "viewer id must be at most {MAX_VIEWER_ID_LENGTH} characters"
        )));
    }

    if !VIEWER_ID_REGEX.is_match(viewer_id) {
        return Err(ValidationError::InvalidViewerId(
            "viewer id contains invalid characters".to_string(),
        ));
    }

    Ok(viewer_id)
}
