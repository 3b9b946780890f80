//! Product check pages - submit an ingredient list, get a safe/unsafe verdict.

use crate::{
    core::{
        catalog,
        matcher::{self, IngredientMatch, ProductCheck, Verdict},
        user,
    },
    entities::user as user_entity,
    errors::{Error, Result},
    web::{
        AppState,
        pages::{parse_optional_id, parse_required_id},
        render::{self, escape},
    },
};
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::fmt::Write;

/// Query string of GET /product
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Preselected user
    pub user_id: Option<String>,
}

/// Body of POST /product
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    /// User whose allergies are checked
    #[serde(default)]
    pub user_id: String,
    /// Free-form ingredient list
    #[serde(default)]
    pub ingredients: String,
}

fn check_form(users: &[user_entity::Model], selected: Option<i64>, ingredients: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/product\">\
         <label>User <select name=\"user_id\" required>{}</select></label>\
         <label>Ingredients (comma or newline separated)\
         <textarea name=\"ingredients\" rows=\"8\" required>{}</textarea></label>\
         <button type=\"submit\">Check</button></form>",
        render::user_options(users, selected),
        escape(ingredients)
    )
}

fn verdict_section(check: &ProductCheck) -> String {
    let mut html = String::new();
    match check.verdict {
        Verdict::Safe => {
            let _ = write!(
                html,
                "<h2 class=\"safe\">Verdict: safe</h2>\
                 <p>None of the {} ingredients match your active allergies.</p>",
                check.ingredients.len()
            );
        }
        Verdict::Unsafe => {
            let _ = write!(
                html,
                "<h2 class=\"unsafe\">Verdict: unsafe</h2>\
                 <p>{} of {} ingredients match your allergies.</p>\
                 <table><tr><th>Ingredient</th><th>Allergen</th>\
                 <th>Severity</th><th>Source</th></tr>",
                check.matches.len(),
                check.ingredients.len()
            );
            for IngredientMatch { ingredient, allergies } in &check.matches {
                for allergy in allergies {
                    let _ = write!(
                        html,
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        escape(ingredient),
                        escape(&allergy.label),
                        allergy.severity.map_or("-", catalog::severity_label),
                        allergy.source.map_or("-", catalog::source_label),
                    );
                }
            }
            html.push_str("</table>");
        }
    }
    html
}

/// GET /product - the ingredient check form
pub async fn form(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Html<String>> {
    let db = state.database.as_ref();
    let selected = parse_optional_id(query.user_id.as_deref(), "user").unwrap_or(None);
    let users = user::get_all_users(db).await?;

    Ok(render::page("Check a product", &check_form(&users, selected, "")))
}

/// POST /product - run the check and render the verdict
pub async fn check(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let db = state.database.as_ref();
    let users = user::get_all_users(db).await?;

    let result = match parse_required_id(&form.user_id, "user") {
        Ok(user_id) => matcher::check_product(db, user_id, &form.ingredients).await,
        Err(e) => Err(e),
    };
    let selected = parse_optional_id(Some(&form.user_id), "user").unwrap_or(None);

    match result {
        Ok(check) => {
            let body = format!(
                "{}{}",
                verdict_section(&check),
                check_form(&users, selected, &form.ingredients)
            );
            Ok(render::page("Check a product", &body).into_response())
        }
        Err(e @ Error::UserNotFound { .. }) => {
            tracing::warn!("Product check for unknown user: {}", e);
            let body = format!(
                "{}{}",
                render::error_banner("Please select an existing user"),
                check_form(&users, None, &form.ingredients)
            );
            Ok((e.status_code(), render::page("Check a product", &body)).into_response())
        }
        Err(e) if e.is_user_error() => {
            tracing::warn!("Rejected product check: {}", e);
            let body = format!(
                "{}{}",
                render::error_banner(&e.to_string()),
                check_form(&users, selected, &form.ingredients)
            );
            Ok((e.status_code(), render::page("Check a product", &body)).into_response())
        }
        Err(e) => Err(e),
    }
}
