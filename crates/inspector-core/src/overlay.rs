//! Profile-conflict overlay.
//!
//! Applied identically to remote and fallback reports:
//! - An ingredient whose name contains an allergy label (case-insensitive)
//!   becomes unsafe with risk `"Allergen: <label>"`
//! - The label is recorded once in `conflicts`
//! - Every matching ingredient/label pair costs 20 points
//!
//! Sensitivities are informational and never change the score.

use crate::profile::UserProfile;
use crate::scoring::{clamp_score, summary_for, ALLERGEN_PENALTY};
use crate::types::{SafetyReport, Status};

/// Overlay the user's allergies onto a scored report.
///
/// With no profile (or no allergies) the report is returned unchanged.
pub fn apply_profile(mut report: SafetyReport, profile: Option<&UserProfile>) -> SafetyReport {
    let labels = match profile {
        Some(profile) => profile.allergy_labels(),
        None => return report,
    };
    if labels.is_empty() {
        return report;
    }

    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let mut matches: i64 = 0;

    for ingredient in report.ingredients.iter_mut() {
        let name = ingredient.name.to_lowercase();
        let mut first_match: Option<&str> = None;

        for (label, needle) in labels.iter().zip(&lowered) {
            if !name.contains(needle.as_str()) {
                continue;
            }

            matches += 1;
            if first_match.is_none() {
                first_match = Some(*label);
            }

            if !report.conflicts.iter().any(|c| c.to_lowercase() == *needle) {
                report.conflicts.push((*label).to_string());
            }
        }

        if let Some(label) = first_match {
            tracing::debug!(ingredient = %ingredient.name, allergy = label, "Allergen conflict");
            ingredient.status = Status::Unsafe;
            ingredient.risk = Some(format!("Allergen: {label}"));
        }
    }

    if matches > 0 {
        report.score = clamp_score(i64::from(report.score) - matches * ALLERGEN_PENALTY);
        report.summary = summary_for(report.score).to_string();
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ingredient;
    use proptest::prelude::*;

    fn report(names: &[(&str, Status)]) -> SafetyReport {
        SafetyReport::from_ingredients(
            names
                .iter()
                .map(|(name, status)| Ingredient::new(*name, *status, ""))
                .collect(),
        )
    }

    #[test]
    fn test_no_profile_is_identity() {
        let base = report(&[("Peanut Oil", Status::Safe)]);
        assert_eq!(apply_profile(base.clone(), None), base);
        assert_eq!(apply_profile(base.clone(), Some(&UserProfile::new())), base);
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let base = report(&[("Roasted PEANUT Oil", Status::Safe), ("Water", Status::Safe)]);
        let profile = UserProfile::new().with_allergies(["peanut"]);

        let out = apply_profile(base, Some(&profile));

        assert_eq!(out.score, 80);
        assert_eq!(out.conflicts, vec!["peanut".to_string()]);
        assert_eq!(out.ingredients[0].status, Status::Unsafe);
        assert_eq!(out.ingredients[0].risk.as_deref(), Some("Allergen: peanut"));
        assert_eq!(out.ingredients[1].status, Status::Safe);
    }

    #[test]
    fn test_penalty_per_matching_ingredient() {
        let base = report(&[("Milk", Status::Safe), ("Skim Milk Powder", Status::Safe)]);
        let profile = UserProfile::new().with_allergies(["Milk"]);

        let out = apply_profile(base, Some(&profile));

        assert_eq!(out.score, 60);
        assert_eq!(out.conflicts, vec!["Milk".to_string()]);
    }

    #[test]
    fn test_multiple_labels_on_one_ingredient() {
        let base = report(&[("Peanut Milk", Status::Safe)]);
        let profile = UserProfile::new().with_allergies(["Milk", "Peanut"]);

        let out = apply_profile(base, Some(&profile));

        // Two pairs, two penalties; risk names the first label in profile order
        assert_eq!(out.score, 60);
        assert_eq!(out.ingredients[0].risk.as_deref(), Some("Allergen: Milk"));
        assert_eq!(out.conflicts, vec!["Milk".to_string(), "Peanut".to_string()]);
    }

    #[test]
    fn test_score_clamps_at_zero_and_summary_follows() {
        let base = report(&[
            ("Wheat", Status::Unsafe),
            ("Wheat Starch", Status::Unsafe),
            ("Wheat Gluten", Status::Unsafe),
        ]);
        assert_eq!(base.score, 10);

        let profile = UserProfile::new().with_allergies(["wheat"]);
        let out = apply_profile(base, Some(&profile));

        assert_eq!(out.score, 0);
        assert_eq!(out.summary, summary_for(0));
    }

    #[test]
    fn test_summary_rederived_after_penalty() {
        let base = report(&[("Soy Lecithin", Status::Safe)]);
        assert_eq!(base.summary, summary_for(100));

        let out = apply_profile(base, Some(&UserProfile::new().with_allergies(["soy"])));
        assert_eq!(out.score, 80);
        assert_eq!(out.summary, summary_for(80));

        let out = apply_profile(out, Some(&UserProfile::new().with_allergies(["lecithin"])));
        assert_eq!(out.score, 60);
        assert_eq!(out.summary, summary_for(60));
    }

    #[test]
    fn test_blank_labels_match_nothing() {
        let base = report(&[("Water", Status::Safe)]);
        let profile = UserProfile::new().with_allergies(["", "   "]);
        assert_eq!(apply_profile(base.clone(), Some(&profile)), base);
    }

    fn status() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::Safe), Just(Status::Moderate), Just(Status::Unsafe)]
    }

    proptest! {
        #[test]
        fn prop_overlay_marks_every_match(
            items in proptest::collection::vec(("[a-z]{1,6}( [a-z]{1,6})?", status()), 0..8),
            allergy in "[a-z]{1,3}",
        ) {
            let names: Vec<(String, Status)> = items;
            let base = SafetyReport::from_ingredients(
                names.iter().map(|(n, s)| Ingredient::new(n.clone(), *s, "")).collect(),
            );
            let profile = UserProfile::new().with_allergies([allergy.to_uppercase()]);
            let label = allergy.to_uppercase();

            let out = apply_profile(base.clone(), Some(&profile));

            let matching = names.iter().filter(|(n, _)| n.contains(&allergy)).count() as i64;
            let expected = (i64::from(base.score) - 20 * matching).max(0);
            prop_assert_eq!(i64::from(out.score), expected);
            prop_assert!(out.score <= 100);
            prop_assert_eq!(out.conflicts.contains(&label), matching > 0);

            let expected_risk = format!("Allergen: {}", label);
            for (ingredient, (name, original)) in out.ingredients.iter().zip(&names) {
                if name.contains(&allergy) {
                    prop_assert_eq!(ingredient.status, Status::Unsafe);
                    prop_assert_eq!(ingredient.risk.as_deref(), Some(expected_risk.as_str()));
                } else {
                    prop_assert_eq!(ingredient.status, *original);
                }
            }
        }
    }
}
