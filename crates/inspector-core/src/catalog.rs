//! Per-category seed ingredients.
//!
//! The catalog is read-only configuration. It is built once (either the
//! built-in data or a YAML/JSON file) and handed to whatever needs it.
//! A valid catalog always has a non-empty `food` entry, which is what
//! unknown categories resolve to.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::category::Category;
use crate::types::{Ingredient, Status};

/// Errors that can occur when loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog validation failed: {0}")]
    ValidationError(String),
}

/// Static per-category ingredient catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<Category, Vec<Ingredient>>,
}

lazy_static! {
    static ref BUILTIN: Catalog = Catalog {
        categories: builtin_entries(),
    };
}

impl Catalog {
    /// The catalog the app ships with.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Build a catalog from `(category, ingredients)` pairs.
    pub fn from_entries<I, C>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (C, Vec<Ingredient>)>,
        C: Into<Category>,
    {
        let mut categories: BTreeMap<Category, Vec<Ingredient>> = BTreeMap::new();
        for (category, ingredients) in entries {
            categories.entry(category.into()).or_default().extend(ingredients);
        }
        Self { categories }.validated()
    }

    /// Parse a catalog from a YAML string.
    ///
    /// Keys naming the same category (`Food` and `food`) are merged in
    /// file order, as with [`Catalog::from_entries`].
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let raw: Vec<(String, Vec<Ingredient>)> =
            serde_yaml::from_str::<serde_yaml::Mapping>(yaml)?
                .into_iter()
                .map(|(key, value)| -> Result<_, serde_yaml::Error> {
                    Ok((
                        serde_yaml::from_value::<String>(key)?,
                        serde_yaml::from_value::<Vec<Ingredient>>(value)?,
                    ))
                })
                .collect::<Result<_, _>>()?;
        Self::from_entries(raw)
    }

    /// Parse a catalog from a JSON string. Keys naming the same category are merged.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<(String, Vec<Ingredient>)> =
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json)?
                .into_iter()
                .map(|(key, value)| -> Result<_, serde_json::Error> {
                    Ok((key, serde_json::from_value::<Vec<Ingredient>>(value)?))
                })
                .collect::<Result<_, _>>()?;
        Self::from_entries(raw)
    }

    /// Parse a catalog from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a catalog file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    /// Normalize every entry and check structural requirements.
    fn validated(mut self) -> Result<Self, CatalogError> {
        for (category, ingredients) in self.categories.iter_mut() {
            let normalized: Vec<Ingredient> =
                ingredients.drain(..).map(Ingredient::normalize).collect();

            if let Some(position) = normalized.iter().position(|i| i.name.is_empty()) {
                return Err(CatalogError::ValidationError(format!(
                    "ingredient #{} in '{}' has an empty name",
                    position + 1,
                    category
                )));
            }

            *ingredients = normalized;
        }

        match self.categories.get(&Category::food()) {
            Some(food) if !food.is_empty() => Ok(self),
            _ => Err(CatalogError::ValidationError(
                "catalog must define a non-empty 'food' category".to_string(),
            )),
        }
    }

    /// Resolve a category to its entry, falling back to `food`.
    ///
    /// Returns the category actually used alongside its ingredients.
    pub fn resolve<'a>(&'a self, category: &Category) -> (&'a Category, &'a [Ingredient]) {
        if let Some((key, ingredients)) = self.categories.get_key_value(category) {
            return (key, ingredients.as_slice());
        }

        tracing::debug!(category = %category, "Unknown category, using food catalog");
        match self.categories.get_key_value(&Category::food()) {
            Some((key, ingredients)) => (key, ingredients.as_slice()),
            None => {
                let empty: &'a [Ingredient] = &[];
                (&*FALLBACK_KEY, empty)
            }
        }
    }

    /// Ingredients for a category (food if unknown).
    pub fn ingredients(&self, category: &Category) -> &[Ingredient] {
        self.resolve(category).1
    }

    /// Whether the category has its own entry.
    pub fn contains(&self, category: &Category) -> bool {
        self.categories.contains_key(category)
    }

    /// All categories with an entry, in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

lazy_static! {
    static ref FALLBACK_KEY: Category = Category::food();
}

fn builtin_entries() -> BTreeMap<Category, Vec<Ingredient>> {
    let mut entries = BTreeMap::new();

    entries.insert(
        Category::food(),
        vec![
            Ingredient::new("Water", Status::Safe, "Essential for hydration."),
            Ingredient::new("Sugar", Status::Moderate, "High consumption linked to health issues."),
            Ingredient::new(
                "Sodium Benzoate",
                Status::Moderate,
                "Preservative. Some concerns when mixed with Vitamin C.",
            ),
            Ingredient::new(
                "Red 40",
                Status::Unsafe,
                "Artificial color linked to hyperactivity in children.",
            )
            .banned(
                ["Norway", "Austria"],
                "Linked to hyperactivity in children and potential genotoxicity concerns.",
            ),
            Ingredient::new("Whole Wheat Flour", Status::Safe, "Good source of fiber."),
            Ingredient::new(
                "High Fructose Corn Syrup",
                Status::Moderate,
                "Added sweetener. Calorie dense.",
            ),
            Ingredient::new("Potassium Bromate", Status::Unsafe, "Dough conditioner.").banned(
                ["EU", "Canada", "China"],
                "Classified as a category 2B carcinogen by the IARC. Linked to kidney and thyroid damage.",
            ),
        ],
    );

    entries.insert(
        Category::new(Category::COSMETICS),
        vec![
            Ingredient::new("Aqua", Status::Safe, "Water."),
            Ingredient::new(
                "Parabens",
                Status::Unsafe,
                "Preservative with potential endocrine disruption risks.",
            )
            .banned(
                ["EU"],
                "Long-chain parabens (Isopropylparaben, Isobutylparaben) are banned in the EU due to lack of data on safety and potential endocrine disrupting properties.",
            ),
            Ingredient::new(
                "Fragrance",
                Status::Moderate,
                "Common allergen. Exact composition often hidden.",
            ),
            Ingredient::new("Glycerin", Status::Safe, "Moisturizer."),
            Ingredient::new("Hydroquinone", Status::Unsafe, "Skin lightening agent.").banned(
                ["EU", "Japan", "Australia"],
                "Prohibited due to potential carcinogenicity and ochronosis (skin darkening/disfiguration).",
            ),
        ],
    );

    entries.insert(
        Category::new(Category::HOUSEHOLD),
        vec![
            Ingredient::new(
                "Sodium Hypochlorite",
                Status::Unsafe,
                "Bleach. Toxic if ingested or mixed with ammonia.",
            )
            .with_risk("Irritant"),
            Ingredient::new("Fragrance", Status::Moderate, "Respiratory irritant for some."),
        ],
    );

    entries.insert(
        Category::new(Category::BABY),
        vec![
            Ingredient::new(
                "Talc",
                Status::Moderate,
                "Powder base. Risk of contamination if not purified.",
            ),
            Ingredient::new("Chamomile Extract", Status::Safe, "Soothing agent."),
        ],
    );

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_all_categories() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 4);
        for key in ["food", "cosmetics", "household", "baby"] {
            assert!(catalog.contains(&Category::new(key)), "missing {key}");
        }
        assert_eq!(catalog.ingredients(&Category::food()).len(), 7);
        assert_eq!(catalog.ingredients(&Category::new("cosmetics")).len(), 5);
    }

    #[test]
    fn test_builtin_banned_entries_are_unsafe() {
        let catalog = Catalog::builtin();
        for category in catalog.categories() {
            for ingredient in catalog.ingredients(category) {
                if ingredient.is_banned() {
                    assert_eq!(ingredient.status, Status::Unsafe, "{}", ingredient.name);
                }
            }
        }
    }

    #[test]
    fn test_unknown_category_resolves_to_food() {
        let catalog = Catalog::builtin();
        let (resolved, ingredients) = catalog.resolve(&Category::new("garden"));
        assert!(resolved.is_food());
        assert_eq!(ingredients, catalog.ingredients(&Category::food()));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
food:
  - name: "Oats"
    status: safe
    description: "Whole grain."
pets:
  - name: "Xylitol"
    status: UNSAFE
    description: "Toxic to dogs."
    risk: "Toxic"
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        let pets = catalog.ingredients(&Category::new("Pets"));
        assert_eq!(pets[0].status, Status::Unsafe);
        assert_eq!(pets[0].risk.as_deref(), Some("Toxic"));
    }

    #[test]
    fn test_missing_food_is_rejected() {
        let json = r#"{ "baby": [ { "name": "Talc", "status": "moderate" } ] }"#;
        let result = Catalog::from_json(json);
        assert!(matches!(result, Err(CatalogError::ValidationError(_))));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let json = r#"{ "food": [ { "name": "  ", "status": "safe" } ] }"#;
        let result = Catalog::from_json(json);
        assert!(matches!(result, Err(CatalogError::ValidationError(_))));
    }

    #[test]
    fn test_loading_enforces_ban_status() {
        let json = r#"{ "food": [ { "name": "E171", "status": "moderate", "bannedIn": ["EU"] } ] }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.ingredients(&Category::food())[0].status, Status::Unsafe);
    }

    #[test]
    fn test_file_keys_differing_by_case_are_merged() {
        let yaml = r#"
Food:
  - name: "Oats"
    status: safe
food:
  - name: "Salt"
    status: moderate
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        let names: Vec<&str> = catalog
            .ingredients(&Category::food())
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Oats", "Salt"]);

        let json = r#"{ "food": [ { "name": "Oats", "status": "safe" } ], " FOOD ": [ { "name": "Salt", "status": "safe" } ] }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.ingredients(&Category::food()).len(), 2);
    }

    #[test]
    fn test_non_mapping_catalog_is_rejected() {
        assert!(matches!(Catalog::from_yaml("- food"), Err(CatalogError::YamlError(_))));
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::JsonError(_))));
    }

    #[test]
    fn test_from_entries_merges_duplicate_keys() {
        let catalog = Catalog::from_entries([
            ("food", vec![Ingredient::new("Water", Status::Safe, "")]),
            ("FOOD", vec![Ingredient::new("Salt", Status::Safe, "")]),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.ingredients(&Category::food()).len(), 2);
    }
}
