//! Unified error type for `SkinCheck`.
//!
//! Validation failures are distinct variants so the web layer can show them as
//! form errors, while database and I/O failures are wrapped as-is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Generic input validation failure
    #[error("{message}")]
    Validation {
        /// Human-readable description shown to the user
        message: String,
    },

    /// The category/key pair is not part of the allergen catalog
    #[error("'{key}' is not a known {category} allergen")]
    InvalidAllergen {
        /// Category value that was submitted
        category: String,
        /// Allergen key that was submitted
        key: String,
    },

    /// An allergen with this category/key pair already exists
    #[error("Allergen '{key}' already exists in category '{category}'")]
    DuplicateAllergen {
        /// Category value
        category: String,
        /// Allergen key
        key: String,
    },

    /// No allergen with this id
    #[error("Allergen not found: {id}")]
    AllergenNotFound {
        /// Allergen id
        id: i64,
    },

    /// Attempt to link a user to an inactive allergen
    #[error("Cannot link to an inactive allergen.")]
    InactiveAllergen {
        /// Allergen id
        id: i64,
    },

    /// No user with this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// User id
        id: i64,
    },

    /// Username is already taken
    #[error("Username '{username}' is already taken")]
    DuplicateUser {
        /// Requested username
        username: String,
    },

    /// The user already has a record for this allergen
    #[error("This allergy is already recorded for the user")]
    DuplicateAllergy {
        /// User id
        user_id: i64,
        /// Allergen id
        allergen_id: i64,
    },

    /// No allergy record with this id
    #[error("Allergy record not found: {id}")]
    AllergyNotFound {
        /// Allergy record id
        id: i64,
    },

    /// Symptom onset date lies in the future
    #[error("Symptom onset date cannot be in the future")]
    FutureOnsetDate,

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// JSON (de)serialisation of a notes column failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error is caused by user input and should be shown as a form error.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAllergen { .. }
                | Self::DuplicateAllergen { .. }
                | Self::InactiveAllergen { .. }
                | Self::DuplicateUser { .. }
                | Self::DuplicateAllergy { .. }
                | Self::FutureOnsetDate
        )
    }

    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::AllergenNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::AllergyNotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateAllergen { .. }
            | Self::DuplicateUser { .. }
            | Self::DuplicateAllergy { .. } => StatusCode::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidAllergen { .. }
            | Self::InactiveAllergen { .. }
            | Self::FutureOnsetDate => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Serialization(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            return (status, "Internal server error").into_response();
        }

        let title = status.canonical_reason().unwrap_or("Error");
        (status, crate::web::render::error_page(title, &self.to_string())).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
