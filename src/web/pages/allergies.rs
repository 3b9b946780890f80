//! Allergy pages - list a user's allergy records, record new ones, edit them,
//! and deactivate or reactivate existing ones.

use crate::{
    core::{
        allergen, catalog, user,
        user_allergy::{
            self, AdminNotes, AllergyRecord, AllergyUpdate, NewUserAllergy, ReactionDetails,
        },
    },
    entities::{SeverityLevel, SourceInfo, user as user_entity},
    errors::{Error, Result},
    web::{
        AppState,
        pages::{
            non_empty, parse_optional_choice, parse_optional_date, parse_optional_id,
            parse_required_id,
        },
        render::{self, escape},
    },
};
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{ActiveEnum, DatabaseConnection};
use serde::Deserialize;
use std::fmt::Write;

/// Query string of GET /allergies
#[derive(Debug, Default, Deserialize)]
pub struct AllergiesQuery {
    /// Whose allergies to show
    pub user_id: Option<String>,
}

/// Editable details of a record. Body of POST /allergies/:id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailsForm {
    /// Optional severity value
    pub severity_level: String,
    /// Optional source value
    pub source_info: String,
    /// Present when the checkbox is ticked
    pub is_confirmed: Option<String>,
    /// Optional `YYYY-MM-DD`
    pub symptom_onset_date: String,
    /// Optional reaction symptom
    pub reaction_symptom: String,
    /// Optional reaction severity, free text
    pub reaction_severity: String,
    /// Optional reaction date, free text
    pub reaction_date: String,
}

impl DetailsForm {
    fn from_record(record: &AllergyRecord) -> Self {
        let allergy = &record.allergy;
        let reaction = record.reaction_details();
        Self {
            severity_level: allergy.severity_level.map(|s| s.to_value()).unwrap_or_default(),
            source_info: allergy.source_info.map(|s| s.to_value()).unwrap_or_default(),
            is_confirmed: allergy.is_confirmed.then(|| "on".to_string()),
            symptom_onset_date: allergy
                .symptom_onset_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            reaction_symptom: reaction.symptom.unwrap_or_default(),
            reaction_severity: reaction.severity.unwrap_or_default(),
            reaction_date: reaction.date.unwrap_or_default(),
        }
    }

    fn to_update(&self) -> Result<AllergyUpdate> {
        Ok(AllergyUpdate {
            severity_level: parse_optional_choice(&self.severity_level, "severity level")?,
            is_confirmed: self.is_confirmed.is_some(),
            symptom_onset_date: parse_optional_date(
                &self.symptom_onset_date,
                "symptom onset date",
            )?,
            source_info: parse_optional_choice(&self.source_info, "source")?,
            reaction_details: ReactionDetails {
                symptom: non_empty(&self.reaction_symptom),
                severity: non_empty(&self.reaction_severity),
                date: non_empty(&self.reaction_date),
            },
        })
    }

    fn fields(&self) -> String {
        let severity = SeverityLevel::try_from_value(&self.severity_level).ok();
        let source = SourceInfo::try_from_value(&self.source_info).ok();
        format!(
            "<label>Severity <select name=\"severity_level\">{}</select></label>\
             <label>Source <select name=\"source_info\">{}</select></label>\
             <label><input type=\"checkbox\" name=\"is_confirmed\"{}> Clinically confirmed</label>\
             <label>Symptom onset \
             <input type=\"date\" name=\"symptom_onset_date\" value=\"{}\"></label>\
             <label>Reaction symptom <input name=\"reaction_symptom\" value=\"{}\"></label>\
             <label>Reaction severity <input name=\"reaction_severity\" value=\"{}\"></label>\
             <label>Reaction date <input name=\"reaction_date\" value=\"{}\"></label>",
            render::choice_options(&catalog::SEVERITY_LEVELS, severity, catalog::severity_label),
            render::choice_options(&catalog::SOURCES, source, catalog::source_label),
            if self.is_confirmed.is_some() { " checked" } else { "" },
            escape(&self.symptom_onset_date),
            escape(&self.reaction_symptom),
            escape(&self.reaction_severity),
            escape(&self.reaction_date),
        )
    }
}

/// Body of POST /allergies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllergyForm {
    /// Owner of the new record
    pub user_id: String,
    /// Allergen being recorded
    pub allergen_id: String,
    /// Optional severity value
    pub severity_level: String,
    /// Optional source value
    pub source_info: String,
    /// Present when the checkbox is ticked
    pub is_confirmed: Option<String>,
    /// Optional `YYYY-MM-DD`
    pub symptom_onset_date: String,
    /// Optional reaction symptom
    pub reaction_symptom: String,
    /// Optional reaction severity, free text
    pub reaction_severity: String,
    /// Optional reaction date, free text
    pub reaction_date: String,
}

impl AllergyForm {
    fn details(&self) -> DetailsForm {
        DetailsForm {
            severity_level: self.severity_level.clone(),
            source_info: self.source_info.clone(),
            is_confirmed: self.is_confirmed.clone(),
            symptom_onset_date: self.symptom_onset_date.clone(),
            reaction_symptom: self.reaction_symptom.clone(),
            reaction_severity: self.reaction_severity.clone(),
            reaction_date: self.reaction_date.clone(),
        }
    }

    fn to_new_allergy(&self) -> Result<NewUserAllergy> {
        let user_id = parse_required_id(&self.user_id, "user")?;
        let allergen_id = parse_required_id(&self.allergen_id, "allergen")?;
        let details = self.details().to_update()?;

        Ok(NewUserAllergy {
            user_id,
            allergen_id,
            severity_level: details.severity_level,
            is_confirmed: details.is_confirmed,
            symptom_onset_date: details.symptom_onset_date,
            source_info: details.source_info,
            reaction_details: details.reaction_details,
        })
    }
}

/// Body of POST /allergies/:id/notes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotesForm {
    /// Who verified the record
    pub verified_by: String,
    /// Optional `YYYY-MM-DD`
    pub verification_date: String,
}

impl NotesForm {
    fn from_notes(notes: &AdminNotes) -> Self {
        Self {
            verified_by: notes.verified_by.clone().unwrap_or_default(),
            verification_date: notes
                .verification_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }

    fn to_notes(&self) -> Result<AdminNotes> {
        Ok(AdminNotes {
            verified_by: non_empty(&self.verified_by),
            verification_date: parse_optional_date(&self.verification_date, "verification date")?,
        })
    }
}

fn records_table(records: &[AllergyRecord]) -> String {
    if records.is_empty() {
        return "<p>No allergies recorded yet.</p>".to_string();
    }

    let mut html = String::from(
        "<table><tr><th>Allergen</th><th>Severity</th><th>Confirmed</th><th>Source</th>\
         <th>Onset</th><th>Reaction</th><th>Status</th><th></th></tr>",
    );
    for record in records {
        let allergy = &record.allergy;
        let inactive = !allergy.is_active || !record.allergen.is_active;
        let status = match (allergy.is_active, record.allergen.is_active) {
            (true, true) => "active",
            (false, _) => "inactive",
            (true, false) => "allergen withdrawn",
        };
        let action = if allergy.is_active { "deactivate" } else { "reactivate" };
        let reaction = record.reaction_details().symptom.unwrap_or_default();

        let _ = write!(
            html,
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/allergies/{id}\">edit</a> \
             <form method=\"post\" action=\"/allergies/{id}/{action}\">\
             <button type=\"submit\">{action}</button></form></td></tr>",
            if inactive { " class=\"inactive\"" } else { "" },
            escape(&allergen::display_name(&record.allergen)),
            allergy.severity_level.map_or("-", catalog::severity_label),
            if allergy.is_confirmed { "yes" } else { "no" },
            allergy.source_info.map_or("-", catalog::source_label),
            allergy
                .symptom_onset_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            escape(&reaction),
            status,
            id = allergy.id,
        );
    }
    html.push_str("</table>");
    html
}

async fn add_form(
    db: &DatabaseConnection,
    user_id: i64,
    form: Option<&AllergyForm>,
) -> Result<String> {
    let allergens = allergen::get_active_allergens(db).await?;
    let selected_allergen =
        form.and_then(|f| parse_optional_id(Some(&f.allergen_id), "allergen").ok().flatten());
    let details = form.map(AllergyForm::details).unwrap_or_default();

    Ok(format!(
        "<h2>Record an allergy</h2><form method=\"post\" action=\"/allergies\">\
         <input type=\"hidden\" name=\"user_id\" value=\"{user_id}\">\
         <label>Allergen <select name=\"allergen_id\" required>{}</select></label>{}\
         <button type=\"submit\">Save</button></form>",
        render::allergen_options(&allergens, selected_allergen),
        details.fields(),
    ))
}

async fn user_page(
    db: &DatabaseConnection,
    user: &user_entity::Model,
    error: Option<&str>,
    form: Option<&AllergyForm>,
) -> Result<Html<String>> {
    let records = user_allergy::get_allergies_for_user(db, user.id).await?;
    let body = format!(
        "{}<p>Allergies recorded for <a href=\"/users/{}\">{}</a>. \
         <a href=\"/product?user_id={}\">Check a product</a></p>{}{}",
        error.map(render::error_banner).unwrap_or_default(),
        user.id,
        escape(&user.username),
        user.id,
        records_table(&records),
        add_form(db, user.id, form).await?,
    );
    Ok(render::page("Allergies", &body))
}

async fn load_user(db: &DatabaseConnection, user_id: i64) -> Result<user_entity::Model> {
    user::get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

async fn load_record(db: &DatabaseConnection, allergy_id: i64) -> Result<AllergyRecord> {
    let allergy = user_allergy::get_user_allergy_by_id(db, allergy_id)
        .await?
        .ok_or(Error::AllergyNotFound { id: allergy_id })?;
    let allergen = allergen::get_allergen_by_id(db, allergy.allergen_id)
        .await?
        .ok_or(Error::AllergenNotFound { id: allergy.allergen_id })?;
    Ok(AllergyRecord { allergy, allergen })
}

fn edit_page(
    record: &AllergyRecord,
    error: Option<&str>,
    details: &DetailsForm,
    notes: &NotesForm,
) -> Html<String> {
    let id = record.allergy.id;
    let body = format!(
        "{}<p>{} <a href=\"/allergies?user_id={}\">Back to allergies</a></p>\
         <form method=\"post\" action=\"/allergies/{id}\">{}\
         <button type=\"submit\">Update</button></form>\
         <h2>Admin notes</h2><form method=\"post\" action=\"/allergies/{id}/notes\">\
         <label>Verified by <input name=\"verified_by\" value=\"{}\"></label>\
         <label>Verification date \
         <input type=\"date\" name=\"verification_date\" value=\"{}\"></label>\
         <button type=\"submit\">Save notes</button></form>",
        error.map(render::error_banner).unwrap_or_default(),
        escape(&allergen::display_name(&record.allergen)),
        record.allergy.user_id,
        details.fields(),
        escape(&notes.verified_by),
        escape(&notes.verification_date),
    );
    render::page("Edit allergy", &body)
}

/// GET /allergies?user_id=N - a user's records plus the add form
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AllergiesQuery>,
) -> Result<Response> {
    let db = state.database.as_ref();

    let Some(user_id) = parse_optional_id(query.user_id.as_deref(), "user")? else {
        let users = user::get_all_users(db).await?;
        let body = format!(
            "<form method=\"get\" action=\"/allergies\">\
             <label>User <select name=\"user_id\" required>{}</select></label>\
             <button type=\"submit\">Show allergies</button></form>",
            render::user_options(&users, None)
        );
        return Ok(render::page("Allergies", &body).into_response());
    };

    let user = load_user(db, user_id).await?;
    Ok(user_page(db, &user, None, None).await?.into_response())
}

/// POST /allergies - record a new allergy, re-rendering the page on validation errors
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<AllergyForm>,
) -> Result<Response> {
    let db = state.database.as_ref();
    let user_id = parse_required_id(&form.user_id, "user")?;
    let user = load_user(db, user_id).await?;

    let result = match form.to_new_allergy() {
        Ok(input) => user_allergy::create_user_allergy(db, input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Ok(Redirect::to(&format!("/allergies?user_id={user_id}")).into_response()),
        Err(e) if e.is_user_error() || matches!(e, Error::AllergenNotFound { .. }) => {
            tracing::warn!("Rejected allergy for user {}: {}", user_id, e);
            let message = match &e {
                Error::AllergenNotFound { .. } => {
                    "Please select an allergen from the list".to_string()
                }
                other => other.to_string(),
            };
            let page = user_page(db, &user, Some(&message), Some(&form)).await?;
            Ok((e.status_code(), page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /allergies/:id - edit form for one record plus its admin notes
pub async fn edit(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    let record = load_record(state.database.as_ref(), id).await?;
    Ok(edit_page(
        &record,
        None,
        &DetailsForm::from_record(&record),
        &NotesForm::from_notes(&record.admin_notes()),
    ))
}

/// POST /allergies/:id - replace the editable details of a record
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DetailsForm>,
) -> Result<Response> {
    let db = state.database.as_ref();
    let record = load_record(db, id).await?;

    let result = match form.to_update() {
        Ok(changes) => user_allergy::update_user_allergy(db, id, changes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(updated) => {
            tracing::info!("Updated allergy record {}", updated.id);
            Ok(Redirect::to(&format!("/allergies?user_id={}", updated.user_id)).into_response())
        }
        Err(e) if e.is_user_error() => {
            tracing::warn!("Rejected update of allergy record {}: {}", id, e);
            let notes = NotesForm::from_notes(&record.admin_notes());
            let page = edit_page(&record, Some(&e.to_string()), &form, &notes);
            Ok((e.status_code(), page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// POST /allergies/:id/notes - replace the admin notes of a record
pub async fn notes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<NotesForm>,
) -> Result<Response> {
    let db = state.database.as_ref();
    let record = load_record(db, id).await?;

    let result = match form.to_notes() {
        Ok(notes) => user_allergy::set_admin_notes(db, id, &notes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Ok(Redirect::to(&format!("/allergies/{id}")).into_response()),
        Err(e) if e.is_user_error() => {
            tracing::warn!("Rejected admin notes for allergy record {}: {}", id, e);
            let details = DetailsForm::from_record(&record);
            let page = edit_page(&record, Some(&e.to_string()), &details, &form);
            Ok((e.status_code(), page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// POST /allergies/:id/deactivate
pub async fn deactivate(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Redirect> {
    let record = user_allergy::deactivate_user_allergy(state.database.as_ref(), id).await?;
    Ok(Redirect::to(&format!("/allergies?user_id={}", record.user_id)))
}

/// POST /allergies/:id/reactivate
pub async fn reactivate(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Redirect> {
    let record = user_allergy::reactivate_user_allergy(state.database.as_ref(), id).await?;
    Ok(Redirect::to(&format!("/allergies?user_id={}", record.user_id)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        core::{
            allergen,
            user_allergy::{self, AdminNotes},
        },
        entities::{Category, SeverityLevel, SourceInfo},
        errors::Result,
        test_utils::*,
        web::test_support::*,
    };
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_list_requires_user_selection() -> Result<()> {
        let db = setup_test_db().await?;
        let db = shared(db);
        create_test_user(&db, "alice").await?;

        let response = get(app(&db), "/allergies").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Show allergies"));

        let response = get(app(&db), "/allergies?user_id=999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_allergy_via_form() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);

        let form = format!(
            "user_id={}&allergen_id={}&severity_level=severe&source_info=allergy_test\
             &is_confirmed=on&symptom_onset_date=2021-06-01&reaction_symptom=hives",
            user.id, sls.id
        );
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/allergies?user_id={}", user.id));

        let records = user_allergy::get_allergies_for_user(&db, user.id).await?;
        assert_eq!(records.len(), 1);
        let allergy = &records[0].allergy;
        assert_eq!(allergy.severity_level, Some(SeverityLevel::Severe));
        assert_eq!(allergy.source_info, Some(SourceInfo::AllergyTest));
        assert!(allergy.is_confirmed);
        assert_eq!(records[0].reaction_details().symptom.as_deref(), Some("hives"));

        let response = get(app(&db), &format!("/allergies?user_id={}", user.id)).await;
        let body = body_text(response).await;
        assert!(body.contains("Contact/Topical Allergens: Sodium Lauryl Sulfate (SLS)"));
        assert!(body.contains("Severe"));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_allergy_is_form_error() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        create_test_allergy(&db, user.id, sls.id).await?;

        let form = format!("user_id={}&allergen_id={}", user.id, sls.id);
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already recorded"));

        assert_eq!(user_allergy::get_allergies_for_user(&db, user.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_form_values() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);

        let form = format!("user_id={}&allergen_id={}&severity_level=extreme", user.id, sls.id);
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Unknown severity level"));

        let form = format!(
            "user_id={}&allergen_id={}&symptom_onset_date=2999-01-01",
            user.id, sls.id
        );
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("cannot be in the future"));

        let form = format!("user_id={}&allergen_id=999", user.id);
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Please select an allergen"));

        allergen::set_allergen_active(&db, sls.id, false).await?;
        let form = format!("user_id={}&allergen_id={}", user.id, sls.id);
        let response = post_form(app(&db), "/allergies", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("inactive allergen"));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_and_reactivate_via_form() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        let record = create_test_allergy(&db, user.id, sls.id).await?;

        let uri = format!("/allergies/{}/deactivate", record.id);
        let response = post_form(app(&db), &uri, "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(user_allergy::get_active_allergies_for_user(&db, user.id).await?.is_empty());

        let uri = format!("/allergies/{}/reactivate", record.id);
        let response = post_form(app(&db), &uri, "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(user_allergy::get_active_allergies_for_user(&db, user.id).await?.len(), 1);

        let response = post_form(app(&db), "/allergies/999/deactivate", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_page_shows_current_values() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        let form = format!(
            "user_id={}&allergen_id={}&severity_level=moderate&reaction_symptom=itching",
            user.id, sls.id
        );
        post_form(app(&db), "/allergies", &form).await;
        let record = &user_allergy::get_allergies_for_user(&db, user.id).await?[0];

        let list_uri = format!("/allergies?user_id={}", user.id);
        let body = body_text(get(app(&db), &list_uri).await).await;
        let edit_link = format!("<a href=\"/allergies/{}\">edit</a>", record.allergy.id);
        assert!(body.contains(&edit_link));

        let response = get(app(&db), &format!("/allergies/{}", record.allergy.id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Sodium Lauryl Sulfate (SLS)"));
        assert!(body.contains("<option value=\"moderate\" selected>"));
        assert!(body.contains("value=\"itching\""));
        let notes_action = format!("action=\"/allergies/{}/notes\"", record.allergy.id);
        assert!(body.contains(&notes_action));

        let response = get(app(&db), "/allergies/999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_via_form() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        let record = create_test_allergy(&db, user.id, sls.id).await?;
        let uri = format!("/allergies/{}", record.id);

        let form = "severity_level=mild&source_info=self_reported&is_confirmed=on\
                    &symptom_onset_date=2020-02-03&reaction_symptom=redness";
        let response = post_form(app(&db), &uri, form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/allergies?user_id={}", user.id));

        let stored = user_allergy::get_user_allergy_by_id(&db, record.id).await?.unwrap();
        assert_eq!(stored.severity_level, Some(SeverityLevel::Mild));
        assert_eq!(stored.source_info, Some(SourceInfo::SelfReported));
        assert!(stored.is_confirmed);
        assert_eq!(stored.symptom_onset_date, NaiveDate::from_ymd_opt(2020, 2, 3));

        // Unticked checkbox and blank selects clear the stored values
        let response = post_form(app(&db), &uri, "severity_level=&source_info=").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let stored = user_allergy::get_user_allergy_by_id(&db, record.id).await?.unwrap();
        assert_eq!(stored.severity_level, None);
        assert!(!stored.is_confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_errors_rerender_edit_page() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        let record = create_test_allergy(&db, user.id, sls.id).await?;
        let uri = format!("/allergies/{}", record.id);

        let form = "symptom_onset_date=2999-01-01&reaction_symptom=rash";
        let response = post_form(app(&db), &uri, form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("cannot be in the future"));
        assert!(body.contains("value=\"rash\""));

        let response = post_form(app(&db), &uri, "source_info=rumour").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Unknown source"));

        let stored = user_allergy::get_user_allergy_by_id(&db, record.id).await?.unwrap();
        assert_eq!(stored.symptom_onset_date, None);

        let response = post_form(app(&db), "/allergies/999", "severity_level=mild").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_notes_via_form() -> Result<()> {
        let (db, user, sls) = setup_with_allergen(Category::Contact, "sls").await?;
        let db = shared(db);
        let record = create_test_allergy(&db, user.id, sls.id).await?;
        let uri = format!("/allergies/{}/notes", record.id);

        let form = "verified_by=Dr+Lee&verification_date=2024-05-06";
        let response = post_form(app(&db), &uri, form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/allergies/{}", record.id));

        let records = user_allergy::get_allergies_for_user(&db, user.id).await?;
        assert_eq!(
            records[0].admin_notes(),
            AdminNotes {
                verified_by: Some("Dr Lee".to_string()),
                verification_date: NaiveDate::from_ymd_opt(2024, 5, 6),
            }
        );

        let body = body_text(get(app(&db), &format!("/allergies/{}", record.id)).await).await;
        assert!(body.contains("value=\"Dr Lee\""));
        assert!(body.contains("value=\"2024-05-06\""));

        let response = post_form(app(&db), &uri, "verification_date=yesterday").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Invalid verification date"));

        let response = post_form(app(&db), "/allergies/999/notes", "verified_by=x").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }
}
