//! # inspector-core
//!
//! Deterministic ingredient safety scoring for Ingredient Inspector.
//!
//! This crate answers, for a list of detected ingredients:
//! - How safe is this product overall (0-100)?
//! - Which ingredients are concerning, and where are they banned?
//! - Does anything conflict with the user's allergies?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same ingredients and profile always produce the same report
//! 2. **No network calls**: Remote analysis lives in `inspector-runtime`
//! 3. **Total**: Unknown categories resolve to the `food` catalog instead of failing
//! 4. **Clamped**: Every score that leaves this crate is within `0..=100`
//!
//! ## Example
//!
//! ```rust
//! use inspector_core::{apply_profile, Catalog, Category, SafetyReport, UserProfile};
//!
//! let catalog = Catalog::builtin();
//! let (_, seeds) = catalog.resolve(&Category::new("household"));
//! let report = SafetyReport::from_ingredients(seeds.to_vec());
//!
//! let profile = UserProfile::new().with_allergies(["Bleach"]);
//! let report = apply_profile(report, Some(&profile));
//!
//! assert_eq!(report.score, 60);
//! assert!(report.conflicts.is_empty());
//! ```

pub mod catalog;
pub mod category;
pub mod overlay;
pub mod profile;
pub mod report;
pub mod scoring;
pub mod types;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogError};
pub use category::Category;
pub use overlay::apply_profile;
pub use profile::{NoProfile, ProfileError, ProfileSource, UserProfile};
pub use report::{parse_remote_report, strip_code_fences, ReportParseError};
pub use scoring::{base_score, clamp_score, summary_for, Verdict};
pub use types::{Ingredient, SafetyReport, Status, UnknownStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_bleach_scenario() {
        let catalog = Catalog::builtin();
        let (resolved, seeds) = catalog.resolve(&Category::new("household"));
        assert_eq!(resolved.as_str(), "household");

        let report = SafetyReport::from_ingredients(seeds.to_vec());
        let profile = UserProfile::new().with_allergies(["Bleach"]);
        let report = apply_profile(report, Some(&profile));

        assert_eq!(report.score, 60);
        assert_eq!(report.verdict(), Verdict::Moderate);
        assert_eq!(report.summary, Verdict::Moderate.summary());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_food_peanuts_uses_general_overlay_only() {
        let catalog = Catalog::builtin();
        let (_, seeds) = catalog.resolve(&Category::food());

        let report = SafetyReport::from_ingredients(seeds.to_vec());
        let profile = UserProfile::new().with_allergies(["Peanuts"]);
        let report = apply_profile(report, Some(&profile));

        // 2 unsafe, 3 moderate: 100 - 60 - 30
        assert_eq!(report.score, 10);
        assert_eq!(report.verdict(), Verdict::Caution);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.ingredients.len(), 7);
        assert!(!report.ingredients.iter().any(|i| i.name == "Peanut Oil"));
    }

    #[test]
    fn test_remote_payload_then_overlay() {
        let payload = r#"```json
{
  "score": 88,
  "summary": "Mostly fine.",
  "ingredients": [
    { "name": "Milk Powder", "status": "safe", "description": "Dairy solids." },
    { "name": "Salt", "status": "safe", "description": "Seasoning." }
  ]
}
```"#;

        let report = parse_remote_report(payload).unwrap();
        let profile = UserProfile::new().with_allergies(["milk"]);
        let report = apply_profile(report, Some(&profile));

        assert_eq!(report.score, 68);
        assert_eq!(report.conflicts, vec!["milk".to_string()]);
        assert_eq!(report.ingredients[0].status, Status::Unsafe);
        assert_eq!(report.ingredients[0].risk.as_deref(), Some("Allergen: milk"));
    }
}
