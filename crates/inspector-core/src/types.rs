//! Core types for ingredient safety reports.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::scoring::{base_score, clamp_score, summary_for, Verdict};

/// Safety classification of a single ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No known concerns
    Safe,

    /// Fine in moderation or for most people
    Moderate,

    /// High risk, restricted, or a personal allergen
    Unsafe,
}

/// Returned when a status string is not one of the known labels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown ingredient status: '{0}'")]
pub struct UnknownStatus(pub String);

impl Status {
    /// Lowercase wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Safe => "safe",
            Status::Moderate => "moderate",
            Status::Unsafe => "unsafe",
        }
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(Status::Safe),
            "moderate" | "caution" | "warning" => Ok(Status::Moderate),
            "unsafe" | "danger" | "harmful" => Ok(Status::Unsafe),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Display name, also matched against allergy labels
    pub name: String,

    /// Safety classification
    pub status: Status,

    /// Short rationale (about ten words)
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Short risk tag (e.g. "Carcinogen", "Allergen: Peanuts")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,

    /// Jurisdictions where the ingredient is restricted, in display order
    #[serde(
        default,
        alias = "banned_in",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub banned_in: Vec<String>,

    /// Regulatory basis for the bans
    #[serde(default, alias = "ban_reason", skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
}

impl Ingredient {
    /// Create an ingredient without risk or ban information.
    pub fn new(name: impl Into<String>, status: Status, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            description: description.into(),
            risk: None,
            banned_in: Vec::new(),
            ban_reason: None,
        }
    }

    /// Attach a risk tag.
    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = Some(risk.into());
        self
    }

    /// Attach ban jurisdictions and the reason for them.
    pub fn banned<I, S>(mut self, jurisdictions: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned_in = jurisdictions.into_iter().map(Into::into).collect();
        self.ban_reason = Some(reason.into());
        self
    }

    /// Whether any jurisdiction restricts this ingredient.
    pub fn is_banned(&self) -> bool {
        !self.banned_in.is_empty()
    }

    /// Trim text fields, drop blank optionals and blank jurisdictions.
    ///
    /// A banned ingredient is always reported as unsafe.
    pub fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.risk = non_blank(self.risk);
        self.ban_reason = non_blank(self.ban_reason);
        self.banned_in = self
            .banned_in
            .into_iter()
            .map(|j| j.trim().to_string())
            .filter(|j| !j.is_empty())
            .collect();

        if self.is_banned() {
            self.status = Status::Unsafe;
        }

        self
    }
}

/// The scored result of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    /// Overall safety score, always within 0..=100
    pub score: u8,

    /// One-sentence verdict derived from `score`
    pub summary: String,

    /// Detected ingredients in presentation order (not a ranking)
    pub ingredients: Vec<Ingredient>,

    /// Profile labels that matched a detected ingredient
    #[serde(default)]
    pub conflicts: Vec<String>,
}

impl SafetyReport {
    /// Score the ingredients with the status-count formula.
    pub fn from_ingredients(ingredients: Vec<Ingredient>) -> Self {
        let score = base_score(&ingredients);
        Self::with_score(ingredients, i64::from(score))
    }

    /// Build a report with an externally supplied score (clamped).
    pub fn with_score(ingredients: Vec<Ingredient>, score: i64) -> Self {
        let score = clamp_score(score);
        Self {
            score,
            summary: summary_for(score).to_string(),
            ingredients,
            conflicts: Vec::new(),
        }
    }

    /// Verdict bucket for the current score.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_score(self.score)
    }

    /// Whether the user's profile conflicted with anything detected.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Count ingredients with the given status.
    pub fn count(&self, status: Status) -> usize {
        self.ingredients.iter().filter(|i| i.status == status).count()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("Safe".parse::<Status>().unwrap(), Status::Safe);
        assert_eq!("UNSAFE".parse::<Status>().unwrap(), Status::Unsafe);
        assert_eq!(" moderate ".parse::<Status>().unwrap(), Status::Moderate);
        assert_eq!("caution".parse::<Status>().unwrap(), Status::Moderate);
        assert!("toxic-ish".parse::<Status>().is_err());
    }

    #[test]
    fn test_ingredient_serializes_camel_case() {
        let ingredient = Ingredient::new("Red 40", Status::Unsafe, "Artificial color.")
            .banned(["Norway", "Austria"], "Hyperactivity concerns.");

        let json = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(json["status"], "unsafe");
        assert_eq!(json["bannedIn"][1], "Austria");
        assert_eq!(json["banReason"], "Hyperactivity concerns.");
        assert!(json.get("risk").is_none());
    }

    #[test]
    fn test_ingredient_tolerates_nulls() {
        let json = r#"{"name":"Water","status":"safe","description":null,"risk":null,"bannedIn":null}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.description, "");
        assert!(ingredient.risk.is_none());
        assert!(ingredient.banned_in.is_empty());
    }

    #[test]
    fn test_normalize_enforces_unsafe_when_banned() {
        let ingredient = Ingredient::new("  Potassium Bromate ", Status::Moderate, "Dough conditioner.")
            .banned(["EU", " "], "Carcinogen.")
            .normalize();

        assert_eq!(ingredient.name, "Potassium Bromate");
        assert_eq!(ingredient.status, Status::Unsafe);
        assert_eq!(ingredient.banned_in, vec!["EU".to_string()]);
    }

    #[test]
    fn test_normalize_drops_blank_risk() {
        let ingredient = Ingredient::new("Water", Status::Safe, "Hydration.")
            .with_risk("   ")
            .normalize();
        assert!(ingredient.risk.is_none());
    }

    #[test]
    fn test_report_from_ingredients() {
        let report = SafetyReport::from_ingredients(vec![
            Ingredient::new("Sodium Hypochlorite", Status::Unsafe, "Bleach."),
            Ingredient::new("Fragrance", Status::Moderate, "Irritant."),
        ]);

        assert_eq!(report.score, 60);
        assert_eq!(report.count(Status::Unsafe), 1);
        assert_eq!(report.verdict(), Verdict::Moderate);
        assert!(!report.has_conflicts());
    }

    #[test]
    fn test_report_with_score_clamps() {
        assert_eq!(SafetyReport::with_score(vec![], 140).score, 100);
        assert_eq!(SafetyReport::with_score(vec![], -5).score, 0);
    }
}
