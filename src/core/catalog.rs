//! Static allergen catalog.
//!
//! The catalog is organised in display groups (used for `<optgroup>` rendering).
//! Several groups share one database category: every cosmetic group is stored as
//! `contact`, for instance. The lookup maps are built once on first use.

use crate::entities::{Category, SeverityLevel, SourceInfo};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// `(allergen_key, human_readable_label)`
pub type ChoiceItem = (&'static str, &'static str);

/// A display group of allergens that share one category.
#[derive(Debug, Clone, Copy)]
pub struct AllergenGroup {
    /// Category every entry of the group is stored under
    pub category: Category,
    /// Group heading shown in forms
    pub label: &'static str,
    /// Entries of the group
    pub entries: &'static [ChoiceItem],
}

const ACID_ALLERGENS: &[ChoiceItem] = &[
    ("glycolic_acid", "Glycolic Acid"),
    ("salicylic_acid", "Salicylic Acid"),
    ("lactic_acid", "Lactic Acid"),
    ("citric_acid", "Citric Acid"),
    ("benzoic_acid", "Benzoic Acid"),
    ("sorbic_acid", "Sorbic Acid"),
];

const BOTANICAL_ALLERGENS: &[ChoiceItem] = &[
    ("tea_tree_oil", "Tea Tree Oil"),
    ("lavender_oil", "Lavender Oil"),
    ("peppermint_oil", "Peppermint Oil"),
    ("eucalyptus_oil", "Eucalyptus Oil"),
    ("rose_oil", "Rose Oil"),
    ("chamomile", "Chamomile"),
    ("ylang_ylang", "Ylang Ylang"),
    ("sandalwood", "Sandalwood"),
    ("bergamot", "Bergamot Oil"),
    ("lemongrass", "Lemongrass Oil"),
];

const COLORANT_ALLERGENS: &[ChoiceItem] = &[
    ("ci_dyes", "CI Dyes (Color Index)"),
    ("fd_c_dyes", "FD&C Dyes"),
    ("carmine", "Carmine (CI 75470)"),
    ("iron_oxides", "Iron Oxides"),
    ("mica", "Mica"),
];

const CONTACT_ALLERGENS: &[ChoiceItem] = &[
    ("nickel", "Nickel"),
    ("latex", "Latex"),
    ("lanolin", "Lanolin"),
];

const DUST_ALLERGENS: &[ChoiceItem] = &[
    ("dust_mite", "Dust Mite"),
    ("mold_spores", "Mold Spores"),
    ("pet_dander", "Pet Dander"),
];

const FRAGRANCE_ALLERGENS: &[ChoiceItem] = &[
    ("fragrance", "Fragrance (Parfum)"),
    ("linalool", "Linalool"),
    ("limonene", "Limonene"),
    ("geraniol", "Geraniol"),
    ("citronellol", "Citronellol"),
    ("eugenol", "Eugenol"),
];

const FOOD_ALLERGENS: &[ChoiceItem] = &[
    ("peanut", "Peanut"),
    ("tree_nut", "Tree Nut (General)"),
    ("gluten", "Gluten / Wheat"),
    ("dairy", "Dairy / Milk"),
    ("soy", "Soy"),
    ("shellfish", "Shellfish"),
];

const OTHER_ALLERGENS: &[ChoiceItem] = &[
    ("retinol", "Retinol/Retinoids"),
    ("vitamin_c", "Vitamin C (L-Ascorbic Acid)"),
    ("niacinamide", "Niacinamide"),
    ("propylene_glycol", "Propylene Glycol"),
    ("butylene_glycol", "Butylene Glycol"),
    ("dimethicone", "Dimethicone"),
    ("tocopherol", "Tocopherol (Vitamin E)"),
    ("alcohol_denat", "Alcohol Denat"),
    ("isopropyl_alcohol", "Isopropyl Alcohol"),
];

const POLLEN_ALLERGENS: &[ChoiceItem] = &[
    ("birch_pollen", "Birch Pollen"),
    ("chrysanthemum", "Chrysanthemum"),
    ("goldenrod", "Goldenrod"),
    ("grass_pollen", "Grass Pollen"),
    ("humulus_japonicus", "Humulus Japonicus"),
    ("lambs_quarters", "Lamb's Quarters"),
    ("mulberry", "Mulberry"),
    ("locust", "Locust"),
    ("oak_pollen", "Oak Pollen"),
    ("pine", "Pine"),
    ("plane_tree", "Plane Tree"),
    ("ragweed", "Ragweed Pollen"),
    ("rape", "Rape"),
    ("spruce", "Spruce"),
    ("tree_pollen", "Tree Pollen"),
    ("queen_palm", "Queen Palm"),
];

const PRESERVATIVE_ALLERGENS: &[ChoiceItem] = &[
    ("parabens", "Parabens (Methylparaben, Propylparaben, etc.)"),
    ("formaldehyde", "Formaldehyde"),
    ("formaldehyde_releasers", "Formaldehyde Releasers"),
    ("methylisothiazolinone", "Methylisothiazolinone (MI)"),
    ("methylchloroisothiazolinone", "Methylchloroisothiazolinone (MCI)"),
    ("phenoxyethanol", "Phenoxyethanol"),
    ("benzalkonium_chloride", "Benzalkonium Chloride"),
    ("bronopol", "Bronopol"),
    ("iodopropynyl_butylcarbamate", "Iodopropynyl Butylcarbamate"),
];

const PROTEIN_ALLERGENS: &[ChoiceItem] = &[
    ("collagen", "Collagen"),
    ("keratin", "Keratin"),
    ("silk_protein", "Silk Protein"),
    ("wheat_protein", "Wheat Protein"),
    ("soy_protein", "Soy Protein"),
    ("beeswax", "Beeswax"),
    ("propolis", "Propolis"),
    ("royal_jelly", "Royal Jelly"),
];

const SUNSCREEN_ALLERGENS: &[ChoiceItem] = &[
    ("oxybenzone", "Oxybenzone (Benzophenone-3)"),
    ("octinoxate", "Octinoxate (Octyl Methoxycinnamate)"),
    ("avobenzone", "Avobenzone"),
    ("octocrylene", "Octocrylene"),
    ("homosalate", "Homosalate"),
    ("titanium_dioxide", "Titanium Dioxide"),
    ("zinc_oxide", "Zinc Oxide"),
];

const SURFACTANT_ALLERGENS: &[ChoiceItem] = &[
    ("sls", "Sodium Lauryl Sulfate (SLS)"),
    ("sles", "Sodium Laureth Sulfate (SLES)"),
    ("cocamidopropyl_betaine", "Cocamidopropyl Betaine"),
    ("peg_compounds", "PEG Compounds (Polyethylene Glycol)"),
    ("polysorbates", "Polysorbates"),
    ("sodium_lauroyl_sarcosinate", "Sodium Lauroyl Sarcosinate"),
];

/// Display groups in the order they appear in forms.
pub const ALLERGEN_GROUPS: &[AllergenGroup] = &[
    AllergenGroup {
        category: Category::Contact,
        label: "Acids & Exfoliants",
        entries: ACID_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Botanicals & Essential Oils",
        entries: BOTANICAL_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Colorants & Dyes",
        entries: COLORANT_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "General Contact Allergens",
        entries: CONTACT_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Cosmetic Fragrances",
        entries: FRAGRANCE_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Cosmetic Preservatives",
        entries: PRESERVATIVE_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Proteins & Extracts",
        entries: PROTEIN_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Sunscreen Ingredients",
        entries: SUNSCREEN_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Contact,
        label: "Surfactants & Emulsifiers",
        entries: SURFACTANT_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Food,
        label: "Major Food Allergens",
        entries: FOOD_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Inhalant,
        label: "Environmental Inhalants",
        entries: DUST_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Inhalant,
        label: "Pollen Allergens",
        entries: POLLEN_ALLERGENS,
    },
    AllergenGroup {
        category: Category::Other,
        label: "Other General Contact",
        entries: OTHER_ALLERGENS,
    },
];

static CATEGORY_TO_ALLERGENS: LazyLock<BTreeMap<Category, Vec<ChoiceItem>>> = LazyLock::new(|| {
    let mut map: BTreeMap<Category, Vec<ChoiceItem>> = BTreeMap::new();
    for group in ALLERGEN_GROUPS {
        map.entry(group.category)
            .or_default()
            .extend_from_slice(group.entries);
    }
    map
});

static FLAT_LABELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    ALLERGEN_GROUPS
        .iter()
        .flat_map(|group| group.entries.iter().copied())
        .collect()
});

/// Every category in display order.
pub const CATEGORIES: [Category; 4] = [
    Category::Food,
    Category::Contact,
    Category::Inhalant,
    Category::Other,
];

/// Every severity level in display order.
pub const SEVERITY_LEVELS: [SeverityLevel; 4] = [
    SeverityLevel::Mild,
    SeverityLevel::Moderate,
    SeverityLevel::Severe,
    SeverityLevel::LifeThreatening,
];

/// Every source in display order.
pub const SOURCES: [SourceInfo; 4] = [
    SourceInfo::SelfReported,
    SourceInfo::DoctorDiagnosed,
    SourceInfo::AllergyTest,
    SourceInfo::FamilyHistory,
];

/// Human-readable label of a category.
#[must_use]
pub const fn category_label(category: Category) -> &'static str {
    match category {
        Category::Food => "Food Allergens",
        Category::Contact => "Contact/Topical Allergens",
        Category::Inhalant => "Inhalant Allergens",
        Category::Other => "Other Allergens",
    }
}

/// Human-readable label of a severity level.
#[must_use]
pub const fn severity_label(severity: SeverityLevel) -> &'static str {
    match severity {
        SeverityLevel::Mild => "Mild",
        SeverityLevel::Moderate => "Moderate",
        SeverityLevel::Severe => "Severe",
        SeverityLevel::LifeThreatening => "Life-Threatening",
    }
}

/// Human-readable label of an information source.
#[must_use]
pub const fn source_label(source: SourceInfo) -> &'static str {
    match source {
        SourceInfo::SelfReported => "Self-Reported",
        SourceInfo::DoctorDiagnosed => "Doctor Diagnosed",
        SourceInfo::AllergyTest => "Allergy Test",
        SourceInfo::FamilyHistory => "Family History",
    }
}

/// Maps each category to all of its `(key, label)` entries across groups.
#[must_use]
pub fn category_to_allergens() -> &'static BTreeMap<Category, Vec<ChoiceItem>> {
    &CATEGORY_TO_ALLERGENS
}

/// Label for an allergen key, falling back to the key itself for unknown keys.
#[must_use]
pub fn allergen_label(key: &str) -> &str {
    FLAT_LABELS.get(key).copied().unwrap_or(key)
}

/// Whether `key` is a catalog entry of `category`.
#[must_use]
pub fn is_valid_combination(category: Category, key: &str) -> bool {
    CATEGORY_TO_ALLERGENS
        .get(&category)
        .is_some_and(|entries| entries.iter().any(|(k, _)| *k == key))
}

/// Form choice groups in display order: `(category, group label, entries)`.
pub fn grouped_choices() -> impl Iterator<Item = (Category, &'static str, &'static [ChoiceItem])> {
    ALLERGEN_GROUPS
        .iter()
        .map(|group| (group.category, group.label, group.entries))
}

/// Iterates every `(category, key)` pair in the catalog, in display order.
pub fn all_entries() -> impl Iterator<Item = (Category, &'static str)> {
    ALLERGEN_GROUPS
        .iter()
        .flat_map(|group| group.entries.iter().map(move |(key, _)| (group.category, *key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_to_allergens_map() {
        let map = category_to_allergens();
        let contact = &map[&Category::Contact];
        let food = &map[&Category::Food];

        assert!(contact.contains(&("sls", "Sodium Lauryl Sulfate (SLS)")));
        assert!(food.contains(&("peanut", "Peanut")));
        assert!(!food.iter().any(|(key, _)| *key == "sls"));
    }

    #[test]
    fn test_allergen_label_lookup() {
        assert_eq!(allergen_label("tea_tree_oil"), "Tea Tree Oil");
        assert_eq!(allergen_label("linalool"), "Linalool");
        assert_eq!(allergen_label("unknown_thing"), "unknown_thing");
    }

    #[test]
    fn test_valid_combination() {
        assert!(is_valid_combination(Category::Contact, "sls"));
        assert!(is_valid_combination(Category::Food, "peanut"));
        assert!(is_valid_combination(Category::Other, "retinol"));
        assert!(!is_valid_combination(Category::Food, "sls"));
        assert!(!is_valid_combination(Category::Contact, "peanuts"));
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let total: usize = ALLERGEN_GROUPS.iter().map(|g| g.entries.len()).sum();
        assert_eq!(FLAT_LABELS.len(), total);
        assert_eq!(all_entries().count(), total);
    }

    #[test]
    fn test_grouped_choices_follow_display_order() {
        let groups: Vec<_> = grouped_choices().collect();
        assert_eq!(groups.len(), ALLERGEN_GROUPS.len());
        assert_eq!(groups[0].1, "Acids & Exfoliants");
        assert!(groups.iter().any(|(category, label, entries)| {
            *category == Category::Food
                && *label == "Major Food Allergens"
                && entries.contains(&("peanut", "Peanut"))
        }));
    }

    #[test]
    fn test_keys_fit_column_width() {
        assert!(all_entries().all(|(_, key)| !key.is_empty() && key.len() <= 50));
    }

    #[test]
    fn test_labels() {
        assert_eq!(category_label(Category::Contact), "Contact/Topical Allergens");
        assert_eq!(severity_label(SeverityLevel::LifeThreatening), "Life-Threatening");
        assert_eq!(source_label(SourceInfo::AllergyTest), "Allergy Test");
    }
}
