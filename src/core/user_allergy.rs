//! User allergy business logic - recording, updating and deactivating allergies.
//!
//! A user has at most one record per allergen, enforced both by a lookup inside
//! the creating transaction and by the unique index on `(user_id, allergen_id)`.
//! Records are never hard-deleted; deactivation keeps the history around.

use crate::{
    entities::{Allergen, User, UserAllergy, allergen, user_allergy, SeverityLevel, SourceInfo},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// Past reaction details stored in `user_reaction_details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionDetails {
    /// What happened (e.g., "hives")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
    /// How bad it was, in the user's own words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// When it happened, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Internal verification notes stored in `admin_notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminNotes {
    /// Who verified the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    /// When it was verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<NaiveDate>,
}

/// Input for [`create_user_allergy`].
#[derive(Debug, Clone, Default)]
pub struct NewUserAllergy {
    /// Owner of the record
    pub user_id: i64,
    /// Allergen being recorded
    pub allergen_id: i64,
    /// Optional severity
    pub severity_level: Option<SeverityLevel>,
    /// Clinically confirmed
    pub is_confirmed: bool,
    /// First appearance of symptoms
    pub symptom_onset_date: Option<NaiveDate>,
    /// Optional information source
    pub source_info: Option<SourceInfo>,
    /// Past reactions
    pub reaction_details: ReactionDetails,
}

/// Input for [`update_user_allergy`]. Every field replaces the stored value.
#[derive(Debug, Clone, Default)]
pub struct AllergyUpdate {
    /// New severity
    pub severity_level: Option<SeverityLevel>,
    /// New confirmation flag
    pub is_confirmed: bool,
    /// New onset date
    pub symptom_onset_date: Option<NaiveDate>,
    /// New source
    pub source_info: Option<SourceInfo>,
    /// New reaction details
    pub reaction_details: ReactionDetails,
}

/// An allergy record joined with its allergen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllergyRecord {
    /// The user's record
    pub allergy: user_allergy::Model,
    /// The allergen it points at
    pub allergen: allergen::Model,
}

impl AllergyRecord {
    /// Reaction details decoded from the JSON column. Malformed JSON reads as empty.
    #[must_use]
    pub fn reaction_details(&self) -> ReactionDetails {
        serde_json::from_value(self.allergy.user_reaction_details.clone()).unwrap_or_default()
    }

    /// Admin notes decoded from the JSON column. Malformed JSON reads as empty.
    #[must_use]
    pub fn admin_notes(&self) -> AdminNotes {
        serde_json::from_value(self.allergy.admin_notes.clone()).unwrap_or_default()
    }
}

fn ensure_onset_not_future(onset: Option<NaiveDate>) -> Result<()> {
    match onset {
        Some(date) if date > chrono::Utc::now().date_naive() => Err(Error::FutureOnsetDate),
        _ => Ok(()),
    }
}

/// Records a new allergy for a user.
///
/// # Errors
/// Returns an error if:
/// - The symptom onset date is in the future
/// - The user or allergen does not exist
/// - The allergen is inactive
/// - The user already has a record for this allergen (active or not)
/// - The database operation fails
pub async fn create_user_allergy(
    db: &DatabaseConnection,
    input: NewUserAllergy,
) -> Result<user_allergy::Model> {
    ensure_onset_not_future(input.symptom_onset_date)?;
    let reaction_details = serde_json::to_value(&input.reaction_details)?;

    let txn = db.begin().await?;

    User::find_by_id(input.user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: input.user_id })?;

    let allergen = Allergen::find_by_id(input.allergen_id)
        .one(&txn)
        .await?
        .ok_or(Error::AllergenNotFound {
            id: input.allergen_id,
        })?;

    if !allergen.is_active {
        return Err(Error::InactiveAllergen { id: allergen.id });
    }

    let existing = UserAllergy::find()
        .filter(user_allergy::Column::UserId.eq(input.user_id))
        .filter(user_allergy::Column::AllergenId.eq(input.allergen_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateAllergy {
            user_id: input.user_id,
            allergen_id: input.allergen_id,
        });
    }

    let now = chrono::Utc::now();
    let record = user_allergy::ActiveModel {
        user_id: Set(input.user_id),
        allergen_id: Set(input.allergen_id),
        severity_level: Set(input.severity_level),
        is_confirmed: Set(input.is_confirmed),
        symptom_onset_date: Set(input.symptom_onset_date),
        source_info: Set(input.source_info),
        user_reaction_details: Set(reaction_details),
        admin_notes: Set(serde_json::json!({})),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = record.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateAllergy {
            user_id: input.user_id,
            allergen_id: input.allergen_id,
        },
        _ => e.into(),
    })?;

    txn.commit().await?;

    tracing::info!(
        "User {} recorded allergy to {} (record {})",
        created.user_id,
        allergen.allergen_key,
        created.id
    );
    Ok(created)
}

/// Retrieves an allergy record by ID.
pub async fn get_user_allergy_by_id(
    db: &DatabaseConnection,
    allergy_id: i64,
) -> Result<Option<user_allergy::Model>> {
    UserAllergy::find_by_id(allergy_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_existing(db: &DatabaseConnection, allergy_id: i64) -> Result<user_allergy::Model> {
    UserAllergy::find_by_id(allergy_id)
        .one(db)
        .await?
        .ok_or(Error::AllergyNotFound { id: allergy_id })
}

/// Replaces the user-editable fields of a record.
///
/// # Errors
/// Returns an error if the onset date is in the future, the record does not
/// exist or the update fails.
pub async fn update_user_allergy(
    db: &DatabaseConnection,
    allergy_id: i64,
    update: AllergyUpdate,
) -> Result<user_allergy::Model> {
    ensure_onset_not_future(update.symptom_onset_date)?;
    let reaction_details = serde_json::to_value(&update.reaction_details)?;

    let mut record: user_allergy::ActiveModel = find_existing(db, allergy_id).await?.into();
    record.severity_level = Set(update.severity_level);
    record.is_confirmed = Set(update.is_confirmed);
    record.symptom_onset_date = Set(update.symptom_onset_date);
    record.source_info = Set(update.source_info);
    record.user_reaction_details = Set(reaction_details);
    record.updated_at = Set(chrono::Utc::now());

    record.update(db).await.map_err(Into::into)
}

/// Replaces the internal notes of a record.
pub async fn set_admin_notes(
    db: &DatabaseConnection,
    allergy_id: i64,
    notes: &AdminNotes,
) -> Result<user_allergy::Model> {
    let notes = serde_json::to_value(notes)?;

    let mut record: user_allergy::ActiveModel = find_existing(db, allergy_id).await?.into();
    record.admin_notes = Set(notes);
    record.updated_at = Set(chrono::Utc::now());

    record.update(db).await.map_err(Into::into)
}

/// Logically deletes a record. It stays in the table but is ignored by matching.
///
/// # Errors
/// Returns an error if the record does not exist or the update fails.
pub async fn deactivate_user_allergy(
    db: &DatabaseConnection,
    allergy_id: i64,
) -> Result<user_allergy::Model> {
    let mut record: user_allergy::ActiveModel = find_existing(db, allergy_id).await?.into();
    record.is_active = Set(false);
    record.updated_at = Set(chrono::Utc::now());

    let updated = record.update(db).await?;
    tracing::info!("Deactivated allergy record {}", updated.id);
    Ok(updated)
}

/// Reactivates a previously deactivated record.
///
/// # Errors
/// Returns an error if the record does not exist, its allergen has been
/// deactivated, or the update fails.
pub async fn reactivate_user_allergy(
    db: &DatabaseConnection,
    allergy_id: i64,
) -> Result<user_allergy::Model> {
    let existing = find_existing(db, allergy_id).await?;

    let allergen = Allergen::find_by_id(existing.allergen_id)
        .one(db)
        .await?
        .ok_or(Error::AllergenNotFound {
            id: existing.allergen_id,
        })?;
    if !allergen.is_active {
        return Err(Error::InactiveAllergen { id: allergen.id });
    }

    let mut record: user_allergy::ActiveModel = existing.into();
    record.is_active = Set(true);
    record.updated_at = Set(chrono::Utc::now());

    let updated = record.update(db).await?;
    tracing::info!("Reactivated allergy record {}", updated.id);
    Ok(updated)
}

fn join_records(rows: Vec<(user_allergy::Model, Option<allergen::Model>)>) -> Vec<AllergyRecord> {
    rows.into_iter()
        .filter_map(|(allergy, allergen)| {
            allergen.map(|allergen| AllergyRecord { allergy, allergen })
        })
        .collect()
}

/// Every record of a user, active or not, ordered by allergen category then key.
pub async fn get_allergies_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<AllergyRecord>> {
    let rows = UserAllergy::find()
        .find_also_related(Allergen)
        .filter(user_allergy::Column::UserId.eq(user_id))
        .order_by_asc(allergen::Column::Category)
        .order_by_asc(allergen::Column::AllergenKey)
        .all(db)
        .await?;

    Ok(join_records(rows))
}

/// Records that take part in matching: the record is active and so is its allergen.
pub async fn get_active_allergies_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<AllergyRecord>> {
    let rows = UserAllergy::find()
        .find_also_related(Allergen)
        .filter(user_allergy::Column::UserId.eq(user_id))
        .filter(user_allergy::Column::IsActive.eq(true))
        .filter(allergen::Column::IsActive.eq(true))
        .order_by_asc(allergen::Column::Category)
        .order_by_asc(allergen::Column::AllergenKey)
        .all(db)
        .await?;

    Ok(join_records(rows))
}
