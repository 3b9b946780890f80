//! HTML rendering helpers shared by all pages.
//!
//! Pages are plain strings assembled with `format!`. Every piece of user or
//! database text goes through [`escape`] before it is embedded.

use crate::{
    core::catalog,
    entities::{allergen, user},
};
use axum::response::Html;
use sea_orm::ActiveEnum;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;max-width:56rem;margin:2rem auto;padding:0 1rem}\
    nav a{margin-right:1rem}table{border-collapse:collapse}\
    td,th{padding:.25rem .5rem;border-bottom:1px solid #ddd;text-align:left}\
    .error{color:#a00;border:1px solid #a00;padding:.5rem}\
    .safe{color:#070}.unsafe{color:#a00}.inactive{color:#888}\
    label{display:block;margin:.5rem 0}textarea{width:100%}";

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a page body in the shared layout.
#[must_use]
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} - SkinCheck</title><style>{STYLE}</style></head><body>\
         <nav><a href=\"/\">Home</a><a href=\"/product\">Check a product</a>\
         <a href=\"/users\">Users</a><a href=\"/allergens\">Allergens</a></nav>\
         <h1>{title}</h1>{body}</body></html>",
        title = escape(title),
    ))
}

/// Error box shown above a form.
#[must_use]
pub fn error_banner(message: &str) -> String {
    format!("<p class=\"error\" role=\"alert\">{}</p>", escape(message))
}

/// Renders an error message as a full page.
#[must_use]
pub fn error_page(title: &str, message: &str) -> Html<String> {
    page(title, &error_banner(message))
}

fn selected(is_selected: bool) -> &'static str {
    if is_selected { " selected" } else { "" }
}

/// `<option>` list of users.
#[must_use]
pub fn user_options(users: &[user::Model], selected_id: Option<i64>) -> String {
    let mut html = String::from("<option value=\"\">Select a user</option>");
    for user in users {
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            user.id,
            selected(selected_id == Some(user.id)),
            escape(&user.username)
        );
    }
    html
}

/// `<optgroup>`s of the given allergens in catalog display order. Allergens
/// missing from the catalog are collected under a trailing "Other" group.
#[must_use]
pub fn allergen_options(allergens: &[allergen::Model], selected_id: Option<i64>) -> String {
    let mut html = String::from("<option value=\"\">Select an allergen</option>");
    let mut placed = Vec::new();

    for (category, label, entries) in catalog::grouped_choices() {
        let members: Vec<&allergen::Model> = entries
            .iter()
            .filter_map(|(key, _)| {
                allergens
                    .iter()
                    .find(|a| a.category == category && a.allergen_key == *key)
            })
            .collect();
        if members.is_empty() {
            continue;
        }

        let _ = write!(html, "<optgroup label=\"{}\">", escape(label));
        for allergen in members {
            placed.push(allergen.id);
            let _ = write!(
                html,
                "<option value=\"{}\"{}>{}</option>",
                allergen.id,
                selected(selected_id == Some(allergen.id)),
                escape(catalog::allergen_label(&allergen.allergen_key))
            );
        }
        html.push_str("</optgroup>");
    }

    let rest: Vec<&allergen::Model> = allergens
        .iter()
        .filter(|a| !placed.contains(&a.id))
        .collect();
    if !rest.is_empty() {
        html.push_str("<optgroup label=\"Other\">");
        for allergen in rest {
            let _ = write!(
                html,
                "<option value=\"{}\"{}>{}</option>",
                allergen.id,
                selected(selected_id == Some(allergen.id)),
                escape(&allergen.allergen_key)
            );
        }
        html.push_str("</optgroup>");
    }

    html
}

/// `<option>` list for an optional enum field: a blank entry plus one per value.
/// Option values are the enum's stored database strings.
#[must_use]
pub fn choice_options<T: ActiveEnum<Value = String> + Copy + PartialEq>(
    values: &[T],
    current: Option<T>,
    label_of: fn(T) -> &'static str,
) -> String {
    let mut html = String::from("<option value=\"\">-</option>");
    for value in values {
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            value.to_value(),
            selected(current == Some(*value)),
            label_of(*value)
        );
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape("Glycerin"), "Glycerin");
    }

    #[test]
    fn test_page_escapes_title() {
        let Html(html) = page("<b>", "<p>body</p>");
        assert!(html.contains("<h1>&lt;b&gt;</h1>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_choice_options_marks_selected() {
        use crate::entities::SeverityLevel;
        let html = choice_options(
            &catalog::SEVERITY_LEVELS,
            Some(SeverityLevel::Severe),
            catalog::severity_label,
        );
        assert!(html.contains("<option value=\"severe\" selected>Severe</option>"));
        assert!(html.contains("<option value=\"mild\">Mild</option>"));
    }
}
