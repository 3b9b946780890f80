//! User business logic - creation and lookups.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};

/// Creates a user. The username is trimmed and must be non-empty and unique.
///
/// # Errors
/// Returns an error if:
/// - The username is empty or whitespace-only
/// - The username is already taken
/// - The date of birth is in the future
/// - The database insert operation fails
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: Option<String>,
    date_of_birth: Option<NaiveDate>,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    if username.chars().count() > 150 {
        return Err(Error::validation("Username must be at most 150 characters"));
    }
    if date_of_birth.is_some_and(|dob| dob > chrono::Utc::now().date_naive()) {
        return Err(Error::validation("Date of birth cannot be in the future"));
    }

    let email = email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email),
        date_of_birth: Set(date_of_birth),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = user.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateUser {
            username: username.to_string(),
        },
        _ => e.into(),
    })?;

    tracing::info!("Created user {} ({})", created.id, created.username);
    Ok(created)
}

/// Retrieves a user by ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by exact username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all users ordered alphabetically by username.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}
