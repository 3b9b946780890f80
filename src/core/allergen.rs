//! Allergen business logic - Catalog seeding, lookups and activation.
//!
//! Allergens are identified by their `(category, allergen_key)` pair which never
//! changes after creation. The only mutation allowed is toggling `is_active`.

use crate::{
    core::catalog,
    entities::{Allergen, Category, allergen},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};

/// Display form of an allergen: `"<Category label>: <Allergen label>"`.
#[must_use]
pub fn display_name(allergen: &allergen::Model) -> String {
    if allergen.allergen_key.is_empty() {
        return format!("{}: [No Allergen Selected]", catalog::category_label(allergen.category));
    }
    format!(
        "{}: {}",
        catalog::category_label(allergen.category),
        catalog::allergen_label(&allergen.allergen_key)
    )
}

/// Inserts every catalog entry that is not in the database yet.
///
/// Keys listed in `disabled_keys` are inserted as inactive. Existing rows are
/// left untouched, so toggles made at runtime survive a restart. Returns the
/// number of rows inserted.
pub async fn seed_catalog(db: &DatabaseConnection, disabled_keys: &[String]) -> Result<usize> {
    let existing: Vec<(Category, String)> = Allergen::find()
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.category, a.allergen_key))
        .collect();

    let now = chrono::Utc::now();
    let missing: Vec<allergen::ActiveModel> = catalog::all_entries()
        .filter(|(category, key)| !existing.iter().any(|(c, k)| c == category && k == key))
        .map(|(category, key)| allergen::ActiveModel {
            category: Set(category),
            allergen_key: Set(key.to_string()),
            is_active: Set(!disabled_keys.iter().any(|d| d == key)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    let inserted = missing.len();
    if inserted > 0 {
        Allergen::insert_many(missing).exec(db).await?;
    }

    tracing::info!("Seeded {} allergen catalog entries", inserted);
    Ok(inserted)
}

/// Creates a single allergen after checking the category/key combination
/// against the catalog.
///
/// # Errors
/// Returns an error if:
/// - The key is not a catalog entry of the category
/// - The pair already exists
/// - The database insert operation fails
pub async fn create_allergen(
    db: &DatabaseConnection,
    category: Category,
    allergen_key: &str,
) -> Result<allergen::Model> {
    let key = allergen_key.trim();
    if !catalog::is_valid_combination(category, key) {
        return Err(Error::InvalidAllergen {
            category: category.to_value(),
            key: key.to_string(),
        });
    }

    let now = chrono::Utc::now();
    let allergen = allergen::ActiveModel {
        category: Set(category),
        allergen_key: Set(key.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    allergen.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateAllergen {
            category: category.to_value(),
            key: key.to_string(),
        },
        _ => e.into(),
    })
}

/// Retrieves an allergen by its unique ID.
pub async fn get_allergen_by_id(
    db: &DatabaseConnection,
    allergen_id: i64,
) -> Result<Option<allergen::Model>> {
    Allergen::find_by_id(allergen_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an allergen by its identifying pair.
pub async fn get_allergen_by_category_and_key(
    db: &DatabaseConnection,
    category: Category,
    allergen_key: &str,
) -> Result<Option<allergen::Model>> {
    Allergen::find()
        .filter(allergen::Column::Category.eq(category))
        .filter(allergen::Column::AllergenKey.eq(allergen_key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every active allergen, ordered by category then key.
/// This is the list users pick from.
pub async fn get_active_allergens(db: &DatabaseConnection) -> Result<Vec<allergen::Model>> {
    Allergen::find()
        .filter(allergen::Column::IsActive.eq(true))
        .order_by_asc(allergen::Column::Category)
        .order_by_asc(allergen::Column::AllergenKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every allergen including inactive ones, ordered by category then key.
pub async fn get_all_allergens(db: &DatabaseConnection) -> Result<Vec<allergen::Model>> {
    Allergen::find()
        .order_by_asc(allergen::Column::Category)
        .order_by_asc(allergen::Column::AllergenKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the active flag of an allergen. Records referencing it are kept; an
/// inactive allergen is simply excluded from selection and matching.
///
/// # Errors
/// Returns an error if the allergen does not exist or the update fails.
pub async fn set_allergen_active(
    db: &DatabaseConnection,
    allergen_id: i64,
    is_active: bool,
) -> Result<allergen::Model> {
    let mut allergen: allergen::ActiveModel = Allergen::find_by_id(allergen_id)
        .one(db)
        .await?
        .ok_or(Error::AllergenNotFound { id: allergen_id })?
        .into();

    allergen.is_active = Set(is_active);
    allergen.updated_at = Set(chrono::Utc::now());

    let updated = allergen.update(db).await?;
    tracing::info!(
        "Allergen {} ({}) is now {}",
        updated.id,
        updated.allergen_key,
        if is_active { "active" } else { "inactive" }
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_allergen_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Food category has no "sls" entry
        let result = create_allergen(&db, Category::Food, "sls").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAllergen { category, key } if category == "food" && key == "sls"
        ));

        // Unknown key
        let result = create_allergen(&db, Category::Contact, "peanuts").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAllergen { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_allergen_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let allergen = create_allergen(&db, Category::Contact, " sls ").await?;
        assert_eq!(allergen.category, Category::Contact);
        assert_eq!(allergen.allergen_key, "sls");
        assert!(allergen.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_allergen_fails() -> Result<()> {
        let db = setup_test_db().await?;

        create_allergen(&db, Category::Food, "peanut").await?;
        let result = create_allergen(&db, Category::Food, "peanut").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateAllergen { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_display_name() -> Result<()> {
        let db = setup_test_db().await?;

        let contact = create_allergen(&db, Category::Contact, "sls").await?;
        let food = create_allergen(&db, Category::Food, "peanut").await?;

        assert_eq!(
            display_name(&contact),
            "Contact/Topical Allergens: Sodium Lauryl Sulfate (SLS)"
        );
        assert_eq!(display_name(&food), "Food Allergens: Peanut");

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let first = seed_catalog(&db, &[]).await?;
        assert_eq!(first, catalog::all_entries().count());

        let second = seed_catalog(&db, &[]).await?;
        assert_eq!(second, 0);

        let all = get_all_allergens(&db).await?;
        assert_eq!(all.len(), first);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_disabled_keys() -> Result<()> {
        let db = setup_test_db().await?;

        seed_catalog(&db, &["mica".to_string()]).await?;

        let mica = get_allergen_by_category_and_key(&db, Category::Contact, "mica")
            .await?
            .unwrap();
        assert!(!mica.is_active);

        let active = get_active_allergens(&db).await?;
        assert!(!active.iter().any(|a| a.allergen_key == "mica"));
        assert_eq!(active.len(), catalog::all_entries().count() - 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_allergen_active_toggles() -> Result<()> {
        let db = setup_test_db().await?;
        let allergen = create_allergen(&db, Category::Contact, "nickel").await?;

        let deactivated = set_allergen_active(&db, allergen.id, false).await?;
        assert!(!deactivated.is_active);
        assert_eq!(deactivated.allergen_key, "nickel");
        assert!(get_active_allergens(&db).await?.is_empty());

        let reactivated = set_allergen_active(&db, allergen.id, true).await?;
        assert!(reactivated.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_allergen_active_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_allergen_active(&db, 999, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AllergenNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_allergen_by_id() -> Result<()> {
        let db = setup_test_db().await?;
        let allergen = create_allergen(&db, Category::Inhalant, "ragweed").await?;

        let found = get_allergen_by_id(&db, allergen.id).await?;
        assert_eq!(found, Some(allergen));
        assert!(get_allergen_by_id(&db, 999).await?.is_none());

        Ok(())
    }
}
