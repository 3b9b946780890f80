//! User entity - Minimal user identity that allergy records hang off.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login/display name
    #[sea_orm(unique)]
    pub username: String,
    /// Optional contact email
    pub email: Option<String>,
    /// Optional date of birth
    pub date_of_birth: Option<Date>,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many allergy records
    #[sea_orm(has_many = "super::user_allergy::Entity")]
    UserAllergies,
}

impl Related<super::user_allergy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAllergies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
