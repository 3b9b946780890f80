//! Shared test utilities for `SkinCheck`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{allergen, user, user_allergy},
    entities::{self, Category},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with no email or date of birth.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, username, None, None).await
}

/// Records an allergy with sensible defaults.
///
/// # Defaults
/// * `severity_level`: None
/// * `is_confirmed`: false
/// * `source_info`: None
pub async fn create_test_allergy(
    db: &DatabaseConnection,
    user_id: i64,
    allergen_id: i64,
) -> Result<entities::user_allergy::Model> {
    user_allergy::create_user_allergy(
        db,
        user_allergy::NewUserAllergy {
            user_id,
            allergen_id,
            ..Default::default()
        },
    )
    .await
}

/// Sets up a database with user "alice" and one allergen.
/// Returns (db, user, allergen) for allergy-related tests.
pub async fn setup_with_allergen(
    category: Category,
    key: &str,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::allergen::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "alice").await?;
    let allergen = allergen::create_allergen(&db, category, key).await?;
    Ok((db, user, allergen))
}

/// Sets up a database with the full catalog seeded and user "alice".
pub async fn setup_with_catalog() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    allergen::seed_catalog(&db, &[]).await?;
    let user = create_test_user(&db, "alice").await?;
    Ok((db, user))
}
