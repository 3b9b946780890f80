//! Page handlers organized by area.

/// Allergen catalog administration
pub mod allergens;
/// A user's allergy records
pub mod allergies;
/// Home and health endpoints
pub mod home;
/// Product ingredient check
pub mod product;
/// User list, detail and creation
pub mod users;

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use sea_orm::ActiveEnum;

/// Parses an optional id field from a form or query string. Blank means `None`.
pub(crate) fn parse_optional_id(value: Option<&str>, field: &str) -> Result<Option<i64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| Error::validation(format!("Invalid {field}: '{v}'"))),
    }
}

/// Parses a required id field.
pub(crate) fn parse_required_id(value: &str, field: &str) -> Result<i64> {
    parse_optional_id(Some(value), field)?
        .ok_or_else(|| Error::validation(format!("Please select a {field}")))
}

/// Parses an optional `YYYY-MM-DD` date field. Blank means `None`.
pub(crate) fn parse_optional_date(value: &str, field: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid {field}: expected YYYY-MM-DD")))
}

/// Parses an optional enum field by its stored database value. Blank means `None`.
pub(crate) fn parse_optional_choice<E: ActiveEnum<Value = String>>(
    value: &str,
    field: &str,
) -> Result<Option<E>> {
    match value.trim() {
        "" => Ok(None),
        v => E::try_from_value(&v.to_string())
            .map(Some)
            .map_err(|_| Error::validation(format!("Unknown {field} '{v}'"))),
    }
}

/// Blank form fields become `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_optional_id(None, "user").unwrap(), None);
        assert_eq!(parse_optional_id(Some("  "), "user").unwrap(), None);
        assert_eq!(parse_optional_id(Some(" 12 "), "user").unwrap(), Some(12));
        assert!(parse_optional_id(Some("abc"), "user").is_err());
        assert!(matches!(
            parse_required_id("", "user").unwrap_err(),
            Error::Validation { message } if message == "Please select a user"
        ));
    }

    #[test]
    fn test_parse_choices() {
        use crate::entities::{SeverityLevel, SourceInfo};

        assert_eq!(
            parse_optional_choice::<SeverityLevel>(" life_threatening ", "severity level").unwrap(),
            Some(SeverityLevel::LifeThreatening)
        );
        assert_eq!(parse_optional_choice::<SourceInfo>("", "source").unwrap(), None);
        assert!(matches!(
            parse_optional_choice::<SeverityLevel>("extreme", "severity level").unwrap_err(),
            Error::Validation { message } if message == "Unknown severity level 'extreme'"
        ));
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(parse_optional_date("", "date").unwrap(), None);
        assert_eq!(
            parse_optional_date("2021-02-03", "date").unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 3)
        );
        assert!(parse_optional_date("03/02/2021", "date").is_err());
    }
}
