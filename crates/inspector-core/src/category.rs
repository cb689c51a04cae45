//! Product categories.
//!
//! Categories are open-ended keys. Lookup against the catalog falls back
//! to `food`, so an unknown key is never an error.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Normalized (trimmed, lowercase) product category key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub const FOOD: &'static str = "food";
    pub const COSMETICS: &'static str = "cosmetics";
    pub const HOUSEHOLD: &'static str = "household";
    pub const BABY: &'static str = "baby";

    /// Normalize a raw key. Blank input becomes `food`.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let key = raw.as_ref().trim().to_lowercase();
        if key.is_empty() {
            Self::food()
        } else {
            Self(key)
        }
    }

    /// The universal default category.
    pub fn food() -> Self {
        Self(Self::FOOD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_food(&self) -> bool {
        self.0 == Self::FOOD
    }

    /// Whether this is one of the categories the app ships with.
    pub fn is_well_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::FOOD | Self::COSMETICS | Self::HOUSEHOLD | Self::BABY
        )
    }

    /// Human-readable name, e.g. "Household Products".
    pub fn display_name(&self) -> String {
        match self.0.as_str() {
            Self::FOOD => "Food Products".to_string(),
            Self::COSMETICS => "Cosmetics".to_string(),
            Self::HOUSEHOLD => "Household Products".to_string(),
            Self::BABY => "Baby Products".to_string(),
            other => {
                let mut chars = other.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::food()
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
