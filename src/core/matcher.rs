//! Ingredient matching - checks a product's ingredient list against a user's allergies.
//!
//! Matching is a linear scan over the submitted ingredients. Text is normalised to
//! lowercase words separated by single spaces, and an ingredient matches an
//! allergen when one of the allergen's names is a substring of it, so "Peanuts"
//! hits `peanut` and "Glycine Soja (Soybean) Oil" hits `soy`. Short abbreviations
//! taken from a label's parenthetical ("MI", "SLS") only match whole words.

use crate::{
    core::{catalog, user, user_allergy},
    entities::{SeverityLevel, SourceInfo},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;

/// Longest accepted ingredient entry, in characters.
pub const MAX_INGREDIENT_LEN: usize = 200;

/// Most ingredients accepted in one submission.
pub const MAX_INGREDIENTS: usize = 500;

/// One allergen the user is currently allergic to, in the shape the matcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAllergy {
    /// Allergen key (e.g., "sls")
    pub allergen_key: String,
    /// Human-readable label
    pub label: String,
    /// Severity from the user's record
    pub severity: Option<SeverityLevel>,
    /// Source from the user's record
    pub source: Option<SourceInfo>,
}

impl ActiveAllergy {
    /// Builds an entry whose label comes from the catalog.
    #[must_use]
    pub fn from_key(
        allergen_key: &str,
        severity: Option<SeverityLevel>,
        source: Option<SourceInfo>,
    ) -> Self {
        Self {
            allergen_key: allergen_key.to_string(),
            label: catalog::allergen_label(allergen_key).to_string(),
            severity,
            source,
        }
    }
}

impl From<&user_allergy::AllergyRecord> for ActiveAllergy {
    fn from(record: &user_allergy::AllergyRecord) -> Self {
        Self::from_key(
            &record.allergen.allergen_key,
            record.allergy.severity_level,
            record.allergy.source_info,
        )
    }
}

/// A submitted ingredient together with the allergies it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientMatch {
    /// Ingredient as submitted (trimmed)
    pub ingredient: String,
    /// Allergies matched by this ingredient, in the order they were supplied
    pub allergies: Vec<ActiveAllergy>,
}

/// Outcome of a product check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No ingredient matched
    Safe,
    /// At least one ingredient matched
    Unsafe,
}

impl Verdict {
    /// Lowercase name used in page output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
        }
    }
}

/// Full result of [`check_product`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCheck {
    /// Parsed ingredients in submitted order
    pub ingredients: Vec<String>,
    /// Matching ingredients in submitted order
    pub matches: Vec<IngredientMatch>,
    /// Safe when `matches` is empty
    pub verdict: Verdict,
}

/// Aliases shorter than this only match a whole word, so "MI" never hits "Dimethicone".
const MIN_SUBSTRING_ALIAS_LEN: usize = 4;

/// Parentheticals that describe an allergen rather than name it.
const DESCRIPTOR_ALIASES: &[&str] = &["general", "color index"];

/// Lowercase alphanumeric tokens of `text`.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `text` lowercased, with every run of punctuation and whitespace collapsed to one space.
fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Whether `needle` occurs as a contiguous run inside `haystack`.
fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

/// A normalized name of an allergen.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchTerm {
    /// Normalized text
    text: String,
    /// Match only as whole words instead of anywhere in the ingredient
    whole_word: bool,
}

impl MatchTerm {
    fn substring(text: &str) -> Self {
        Self {
            text: normalize(text),
            whole_word: false,
        }
    }

    fn alias(text: &str) -> Self {
        let text = normalize(text);
        let whole_word =
            text.chars().filter(char::is_ascii_alphanumeric).count() < MIN_SUBSTRING_ALIAS_LEN;
        Self { text, whole_word }
    }

    fn matches(&self, ingredient: &str, tokens: &[String]) -> bool {
        if self.whole_word {
            let needle: Vec<String> = self.text.split(' ').map(str::to_string).collect();
            contains_run(tokens, &needle)
        } else {
            ingredient.contains(&self.text)
        }
    }
}

/// Names that identify an allergen. The key, the label, the label without its
/// parenthetical and each `/` part of it match anywhere in an ingredient.
/// Aliases listed inside the parenthetical are added too, minus descriptors.
fn allergen_terms(allergy: &ActiveAllergy) -> Vec<MatchTerm> {
    let label = allergy.label.as_str();
    let mut terms = vec![
        MatchTerm::substring(&allergy.allergen_key.replace('_', " ")),
        MatchTerm::substring(label),
    ];

    let (head, parenthetical) = match label.split_once('(') {
        Some((head, rest)) => (head, Some(rest.trim_end_matches(')'))),
        None => (label, None),
    };
    terms.push(MatchTerm::substring(head));
    terms.extend(head.split('/').map(MatchTerm::substring));

    if let Some(inner) = parenthetical {
        terms.extend(
            inner
                .split([',', '/'])
                .map(normalize)
                .filter(|alias| alias != "etc" && !DESCRIPTOR_ALIASES.contains(&alias.as_str()))
                .map(|alias| MatchTerm::alias(&alias)),
        );
    }

    let mut unique: Vec<MatchTerm> = Vec::with_capacity(terms.len());
    for term in terms {
        if !term.text.is_empty() && !unique.iter().any(|t| t.text == term.text) {
            unique.push(term);
        }
    }
    unique
}

/// Splits ingredient text on commas, semicolons and line breaks. A comma between
/// two digits belongs to the name, as in "1,2-Hexanediol".
fn split_entries(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut entries = Vec::new();
    let mut start = 0;

    for (i, &(offset, c)) in chars.iter().enumerate() {
        let is_separator = match c {
            ';' | '\n' | '\r' => true,
            ',' => {
                let digit_before = i > 0 && chars[i - 1].1.is_ascii_digit();
                let digit_after = chars.get(i + 1).is_some_and(|(_, next)| next.is_ascii_digit());
                !(digit_before && digit_after)
            }
            _ => false,
        };
        if is_separator {
            entries.push(&text[start..offset]);
            start = offset + c.len_utf8();
        }
    }
    entries.push(&text[start..]);
    entries
}

/// Parses free-form ingredient text into an ordered, de-duplicated list.
///
/// Entries are separated by commas, semicolons or newlines and trimmed. Empty
/// entries are dropped and repeated entries (compared case-insensitively) keep
/// their first occurrence.
///
/// # Errors
/// Returns a validation error when the list is empty, an entry is longer than
/// [`MAX_INGREDIENT_LEN`] characters, or there are more than [`MAX_INGREDIENTS`]
/// entries.
pub fn parse_ingredient_list(text: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut ingredients = Vec::new();

    for entry in split_entries(text) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if entry.chars().count() > MAX_INGREDIENT_LEN {
            return Err(Error::validation(format!(
                "Ingredient entries must be at most {MAX_INGREDIENT_LEN} characters"
            )));
        }
        if seen.insert(entry.to_lowercase()) {
            ingredients.push(entry.to_string());
        }
    }

    if ingredients.is_empty() {
        return Err(Error::validation("Please enter at least one ingredient"));
    }
    if ingredients.len() > MAX_INGREDIENTS {
        return Err(Error::validation(format!(
            "At most {MAX_INGREDIENTS} ingredients can be checked at once"
        )));
    }

    Ok(ingredients)
}

/// Returns the submitted ingredients that match any of `allergies`, preserving
/// submission order.
#[must_use]
pub fn match_ingredients<S: AsRef<str>>(
    ingredients: &[S],
    allergies: &[ActiveAllergy],
) -> Vec<IngredientMatch> {
    let terms: Vec<(&ActiveAllergy, Vec<MatchTerm>)> = allergies
        .iter()
        .map(|allergy| (allergy, allergen_terms(allergy)))
        .collect();

    ingredients
        .iter()
        .filter_map(|ingredient| {
            let ingredient = ingredient.as_ref().trim();
            let tokens = tokenize(ingredient);
            let normalized = tokens.join(" ");
            let matched: Vec<ActiveAllergy> = terms
                .iter()
                .filter(|(_, allergy_terms)| {
                    allergy_terms.iter().any(|t| t.matches(&normalized, &tokens))
                })
                .map(|(allergy, _)| ActiveAllergy::clone(allergy))
                .collect();

            (!matched.is_empty()).then(|| IngredientMatch {
                ingredient: ingredient.to_string(),
                allergies: matched,
            })
        })
        .collect()
}

/// Verdict for a list of matches.
#[must_use]
pub fn verdict_for(matches: &[IngredientMatch]) -> Verdict {
    if matches.is_empty() {
        Verdict::Safe
    } else {
        Verdict::Unsafe
    }
}

/// Parses `ingredient_text`, loads the user's active allergies and matches them.
///
/// # Errors
/// Returns an error if the ingredient text is malformed, the user does not
/// exist, or the database query fails.
pub async fn check_product(
    db: &DatabaseConnection,
    user_id: i64,
    ingredient_text: &str,
) -> Result<ProductCheck> {
    let ingredients = parse_ingredient_list(ingredient_text)?;

    user::get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let allergies: Vec<ActiveAllergy> = user_allergy::get_active_allergies_for_user(db, user_id)
        .await?
        .iter()
        .map(ActiveAllergy::from)
        .collect();

    let matches = match_ingredients(&ingredients, &allergies);
    let verdict = verdict_for(&matches);

    tracing::info!(
        "Checked {} ingredients for user {} against {} allergies: {}",
        ingredients.len(),
        user_id,
        allergies.len(),
        verdict.as_str()
    );

    Ok(ProductCheck {
        ingredients,
        matches,
        verdict,
    })
}
