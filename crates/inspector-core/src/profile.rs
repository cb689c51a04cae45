//! User health profiles and the read-only boundary they arrive through.
//!
//! Profiles are owned by the account layer. Analysis only ever sees a
//! snapshot, taken once per call through [`ProfileSource`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a profile file.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A user's declared allergies and sensitivities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Allergy labels (e.g. "Peanuts", "Milk")
    pub allergies: Vec<String>,

    /// Sensitivity labels (e.g. "Fragrance")
    pub sensitivities: Vec<String>,

    /// Free-form notes
    pub custom: String,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allergies<I, S>(mut self, allergies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allergies = allergies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sensitivities<I, S>(mut self, sensitivities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitivities = sensitivities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_custom(mut self, custom: impl Into<String>) -> Self {
        self.custom = custom.into();
        self
    }

    /// Allergy labels usable for matching.
    ///
    /// Trimmed, blanks removed, deduplicated case-insensitively keeping the
    /// first spelling, in profile order.
    pub fn allergy_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.allergies.iter().map(|a| a.trim()) {
            if label.is_empty() {
                continue;
            }
            let lowered = label.to_lowercase();
            if !labels.iter().any(|seen| seen.to_lowercase() == lowered) {
                labels.push(label);
            }
        }
        labels
    }

    /// No allergies, sensitivities or notes.
    pub fn is_empty(&self) -> bool {
        self.allergies.is_empty() && self.sensitivities.is_empty() && self.custom.trim().is_empty()
    }

    /// Parse a profile from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Parse a profile file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }
}

/// Read-only accessor for the active session's profile.
pub trait ProfileSource: Send + Sync {
    /// Snapshot of the current profile, if any.
    fn current_profile(&self) -> Option<UserProfile>;
}

/// A source that never has a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfile;

impl ProfileSource for NoProfile {
    fn current_profile(&self) -> Option<UserProfile> {
        None
    }
}

impl ProfileSource for UserProfile {
    fn current_profile(&self) -> Option<UserProfile> {
        Some(self.clone())
    }
}

impl ProfileSource for Option<UserProfile> {
    fn current_profile(&self) -> Option<UserProfile> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allergy_labels_are_cleaned() {
        let profile = UserProfile::new().with_allergies(["Peanuts", " ", "peanuts", " Milk "]);
        assert_eq!(profile.allergy_labels(), vec!["Peanuts", "Milk"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let profile = UserProfile::from_json(r#"{ "allergies": ["Soy"] }"#).unwrap();
        assert_eq!(profile.allergies, vec!["Soy".to_string()]);
        assert!(profile.sensitivities.is_empty());
        assert_eq!(profile.custom, "");
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
allergies: [Milk, Eggs]
sensitivities: [Fragrance]
custom: "Avoid sulfites"
"#;
        let profile = UserProfile::from_yaml(yaml).unwrap();
        assert_eq!(profile.allergies.len(), 2);
        assert_eq!(profile.sensitivities, vec!["Fragrance".to_string()]);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_profile_sources() {
        assert!(NoProfile.current_profile().is_none());

        let profile = UserProfile::new().with_allergies(["Milk"]);
        assert_eq!(profile.current_profile(), Some(profile.clone()));

        let maybe: Option<UserProfile> = None;
        assert!(maybe.current_profile().is_none());
    }
}
