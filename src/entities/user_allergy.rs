//! User allergy entity - Links a user to an allergen with clinical metadata.
//!
//! A user has at most one record per allergen. Records are deactivated rather
//! than deleted so that history is preserved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How severe the user's reaction is.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    /// Mild
    #[sea_orm(string_value = "mild")]
    Mild,
    /// Moderate
    #[sea_orm(string_value = "moderate")]
    Moderate,
    /// Severe
    #[sea_orm(string_value = "severe")]
    Severe,
    /// Life-threatening
    #[sea_orm(string_value = "life_threatening")]
    LifeThreatening,
}

/// Where the allergy information comes from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SourceInfo {
    /// Reported by the user
    #[sea_orm(string_value = "self_reported")]
    SelfReported,
    /// Diagnosed by a doctor
    #[sea_orm(string_value = "doctor_diagnosed")]
    DoctorDiagnosed,
    /// Confirmed by an allergy test
    #[sea_orm(string_value = "allergy_test")]
    AllergyTest,
    /// Known from family history
    #[sea_orm(string_value = "family_history")]
    FamilyHistory,
}

/// User allergy database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_allergies")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The user who has this allergy
    pub user_id: i64,
    /// The allergen this user is allergic to
    pub allergen_id: i64,
    /// Optional severity level
    pub severity_level: Option<SeverityLevel>,
    /// Clinically confirmed
    pub is_confirmed: bool,
    /// Date when symptoms first appeared, never in the future
    pub symptom_onset_date: Option<Date>,
    /// Optional source of the allergy information
    pub source_info: Option<SourceInfo>,
    /// Past reactions as a JSON object (`symptom`, `severity`, `date`)
    pub user_reaction_details: Json,
    /// Internal notes as a JSON object (`verified_by`, `verification_date`)
    pub admin_notes: Json,
    /// Inactive records are kept for history but ignored by the matcher
    pub is_active: bool,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// When the record was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `UserAllergy` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each record points at one allergen
    #[sea_orm(
        belongs_to = "super::allergen::Entity",
        from = "Column::AllergenId",
        to = "super::allergen::Column::Id"
    )]
    Allergen,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::allergen::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allergen.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
