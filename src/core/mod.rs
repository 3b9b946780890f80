//! Core business logic, independent of the web layer.

/// Allergen seeding, lookups and activation
pub mod allergen;
/// Static allergen catalog and choice labels
pub mod catalog;
/// Ingredient list parsing and allergen matching
pub mod matcher;
/// User creation and lookups
pub mod user;
/// User allergy records
pub mod user_allergy;
