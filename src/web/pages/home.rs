//! Home page and health check.

use crate::web::render;
use axum::response::{Html, IntoResponse};

/// GET / - landing page linking to the main workflows
pub async fn index() -> Html<String> {
    render::page(
        "SkinCheck",
        "<p>Record your allergens, then check whether a skincare product's \
         ingredient list contains any of them.</p>\
         <ul>\
         <li><a href=\"/product\">Check a product's ingredients</a></li>\
         <li><a href=\"/users\">Manage users and their allergies</a></li>\
         <li><a href=\"/allergens\">Browse the allergen catalog</a></li>\
         </ul>",
    )
}

/// GET /health - liveness check
pub async fn health() -> impl IntoResponse {
    "OK"
}
