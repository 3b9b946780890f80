//! Database configuration module for `SkinCheck`.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! and the composite uniqueness constraints are added as unique indexes.

use crate::entities::{Allergen, User, UserAllergy, allergen, user_allergy};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, Schema,
    sea_query::{Index, IndexCreateStatement},
};

/// Default location of the local `SQLite` database file.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/skincheck.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {}", database_url);

    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory that must exist before `SQLite` can create the database file.
fn sqlite_parent_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    std::path::Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Unique `(category, allergen_key)` on allergens.
fn allergen_unique_index() -> IndexCreateStatement {
    Index::create()
        .name("uniq_category_allergen")
        .table(Allergen)
        .col(allergen::Column::Category)
        .col(allergen::Column::AllergenKey)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// Unique `(user_id, allergen_id)` on user allergies.
fn user_allergy_unique_index() -> IndexCreateStatement {
    Index::create()
        .name("uniq_user_allergen")
        .table(UserAllergy)
        .col(user_allergy::Column::UserId)
        .col(user_allergy::Column::AllergenId)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// Lookup index used by the matcher query.
fn user_allergy_active_index() -> IndexCreateStatement {
    Index::create()
        .name("userallergy_user_active_idx")
        .table(UserAllergy)
        .col(user_allergy::Column::UserId)
        .col(user_allergy::Column::IsActive)
        .if_not_exists()
        .to_owned()
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Tables are created parents first so the foreign keys generated from the
/// `belongs_to` relations resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User).if_not_exists().to_owned();
    let allergen_table = schema
        .create_table_from_entity(Allergen)
        .if_not_exists()
        .to_owned();
    let user_allergy_table = schema
        .create_table_from_entity(UserAllergy)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&allergen_table)).await?;
    db.execute(builder.build(&user_allergy_table)).await?;

    db.execute(builder.build(&allergen_unique_index())).await?;
    db.execute(builder.build(&user_allergy_unique_index())).await?;
    db.execute(builder.build(&user_allergy_active_index())).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AllergenModel, UserAllergyModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<AllergenModel> = Allergen::find().limit(1).all(&db).await?;
        let _: Vec<UserAllergyModel> = UserAllergy::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir(DEFAULT_DATABASE_URL),
            Some(std::path::Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://local.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }
}
