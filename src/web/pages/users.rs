//! User pages - list, create, and a per-user summary.

use crate::{
    core::{allergen, catalog, user, user_allergy},
    entities::user as user_entity,
    errors::{Error, Result},
    web::{
        AppState,
        pages::{non_empty, parse_optional_date},
        render::{self, escape},
    },
};
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::fmt::Write;

/// Body of POST /users
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    /// Requested username
    pub username: String,
    /// Optional email
    pub email: String,
    /// Optional `YYYY-MM-DD`
    pub date_of_birth: String,
}

fn users_body(users: &[user_entity::Model], error: Option<&str>, form: &UserForm) -> String {
    let mut html = error.map(render::error_banner).unwrap_or_default();

    if users.is_empty() {
        html.push_str("<p>No users yet.</p>");
    } else {
        html.push_str("<ul>");
        for user in users {
            let _ = write!(
                html,
                "<li><a href=\"/users/{}\">{}</a></li>",
                user.id,
                escape(&user.username)
            );
        }
        html.push_str("</ul>");
    }

    let _ = write!(
        html,
        "<h2>Add a user</h2><form method=\"post\" action=\"/users\">\
         <label>Username <input name=\"username\" value=\"{}\" maxlength=\"150\" required></label>\
         <label>Email <input type=\"email\" name=\"email\" value=\"{}\"></label>\
         <label>Date of birth <input type=\"date\" name=\"date_of_birth\" value=\"{}\"></label>\
         <button type=\"submit\">Create</button></form>",
        escape(&form.username),
        escape(&form.email),
        escape(&form.date_of_birth),
    );
    html
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> Result<Html<String>> {
    let users = user::get_all_users(state.database.as_ref()).await?;
    Ok(render::page("Users", &users_body(&users, None, &UserForm::default())))
}

/// POST /users - create a user and go to their page
pub async fn create(State(state): State<AppState>, Form(form): Form<UserForm>) -> Result<Response> {
    let db = state.database.as_ref();

    let result = match parse_optional_date(&form.date_of_birth, "date of birth") {
        Ok(date_of_birth) => {
            user::create_user(db, &form.username, non_empty(&form.email), date_of_birth).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(created) => Ok(Redirect::to(&format!("/users/{}", created.id)).into_response()),
        Err(e) if e.is_user_error() => {
            tracing::warn!("Rejected user creation: {}", e);
            let users = user::get_all_users(db).await?;
            let page = render::page("Users", &users_body(&users, Some(&e.to_string()), &form));
            Ok((e.status_code(), page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /users/:id - profile plus a summary of recorded allergies
pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    let db = state.database.as_ref();
    let user = user::get_user_by_id(db, id)
        .await?
        .ok_or(Error::UserNotFound { id })?;
    let records = user_allergy::get_allergies_for_user(db, id).await?;
    let active = records
        .iter()
        .filter(|r| r.allergy.is_active && r.allergen.is_active)
        .count();

    let mut body = format!(
        "<dl><dt>Email</dt><dd>{}</dd><dt>Date of birth</dt><dd>{}</dd>\
         <dt>Member since</dt><dd>{}</dd></dl>\
         <p>{active} active of {} recorded allergies. \
         <a href=\"/allergies?user_id={id}\">Manage allergies</a> | \
         <a href=\"/product?user_id={id}\">Check a product</a></p>",
        user.email.as_deref().map_or_else(|| "-".to_string(), escape),
        user.date_of_birth.map_or_else(|| "-".to_string(), |d| d.to_string()),
        user.created_at.format("%Y-%m-%d"),
        records.len(),
    );

    if active > 0 {
        body.push_str("<ul>");
        for record in records.iter().filter(|r| r.allergy.is_active && r.allergen.is_active) {
            let _ = write!(
                body,
                "<li>{} ({})</li>",
                escape(&allergen::display_name(&record.allergen)),
                record
                    .allergy
                    .severity_level
                    .map_or("severity not set", catalog::severity_label),
            );
        }
        body.push_str("</ul>");
    }

    Ok(render::page(&user.username, &body))
}
