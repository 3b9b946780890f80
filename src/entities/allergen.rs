//! Allergen entity - Pre-defined catalog of allergens and ingredients.
//!
//! Each allergen is identified by its `(category, allergen_key)` pair, which is
//! unique and never changes once created. Only the `is_active` flag may toggle;
//! inactive allergens are hidden from selection and ignored by the matcher.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Broad allergen category stored as a short string.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Food allergens
    #[sea_orm(string_value = "food")]
    Food,
    /// Contact/topical allergens
    #[sea_orm(string_value = "contact")]
    Contact,
    /// Inhalant allergens
    #[sea_orm(string_value = "inhalant")]
    Inhalant,
    /// Everything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Allergen database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allergens")]
pub struct Model {
    /// Unique identifier for the allergen
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Generic allergen category
    pub category: Category,
    /// Specific allergen key within the category (e.g., "sls", "peanut")
    pub allergen_key: String,
    /// Inactive allergens are not offered for selection and never match
    pub is_active: bool,
    /// When the allergen was created
    pub created_at: DateTimeUtc,
    /// When the allergen was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Allergen and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One allergen is referenced by many user allergy records
    #[sea_orm(has_many = "super::user_allergy::Entity")]
    UserAllergies,
}

impl Related<super::user_allergy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAllergies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
