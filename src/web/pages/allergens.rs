//! Allergen catalog administration.

use crate::{
    core::{allergen, catalog},
    entities::allergen as allergen_entity,
    errors::{Error, Result},
    web::{
        AppState,
        render::{self, escape},
    },
};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use std::fmt::Write;

fn allergen_row(html: &mut String, allergen: &allergen_entity::Model) {
    let (status, action) = if allergen.is_active {
        ("active", "Deactivate")
    } else {
        ("inactive", "Activate")
    };
    let _ = write!(
        html,
        "<tr><td>{}</td><td><code>{}</code></td><td>{status}</td>\
         <td><form method=\"post\" action=\"/allergens/{}/toggle\">\
         <button type=\"submit\">{action}</button></form></td></tr>",
        escape(&allergen::display_name(allergen)),
        escape(&allergen.allergen_key),
        allergen.id,
    );
}

/// GET /allergens - every allergen grouped as in the catalog, with its active flag
pub async fn list(State(state): State<AppState>) -> Result<Html<String>> {
    let allergens = allergen::get_all_allergens(state.database.as_ref()).await?;
    let mut shown = vec![false; allergens.len()];

    let mut body = String::from(
        "<p>Inactive allergens cannot be linked to users and are ignored by product checks.</p>",
    );
    for (category, label, entries) in catalog::grouped_choices() {
        let _ = write!(
            body,
            "<h2>{}</h2><table><tr><th>Allergen</th><th>Key</th><th>Status</th><th></th></tr>",
            escape(label)
        );
        for (key, _) in entries {
            if let Some(index) = allergens
                .iter()
                .position(|a| a.category == category && a.allergen_key == *key)
            {
                shown[index] = true;
                allergen_row(&mut body, &allergens[index]);
            }
        }
        body.push_str("</table>");
    }

    let others: Vec<_> = allergens
        .iter()
        .zip(&shown)
        .filter(|(_, shown)| !**shown)
        .map(|(a, _)| a)
        .collect();
    if !others.is_empty() {
        body.push_str(
            "<h2>Other</h2><table><tr><th>Allergen</th><th>Key</th><th>Status</th><th></th></tr>",
        );
        for allergen in others {
            allergen_row(&mut body, allergen);
        }
        body.push_str("</table>");
    }

    Ok(render::page("Allergens", &body))
}

/// POST /allergens/:id/toggle - flip the active flag
pub async fn toggle(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Redirect> {
    let db = state.database.as_ref();
    let current = allergen::get_allergen_by_id(db, id)
        .await?
        .ok_or(Error::AllergenNotFound { id })?;

    allergen::set_allergen_active(db, id, !current.is_active).await?;
    Ok(Redirect::to("/allergens"))
}
