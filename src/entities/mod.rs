//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod allergen;
pub mod user;
pub mod user_allergy;

// Re-export specific types to avoid conflicts
pub use allergen::{Category, Column as AllergenColumn, Entity as Allergen, Model as AllergenModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_allergy::{
    Column as UserAllergyColumn, Entity as UserAllergy, Model as UserAllergyModel, SeverityLevel,
    SourceInfo,
};
