//! Canonical geographic tokens that raw location text is mapped onto.

use serde::{Deserialize, Serialize};

/// Canonical location key.
///
/// Serialized as the upper-case key string (e.g. `"UNITED STATES"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKey {
    #[serde(rename = "ANYWHERE")]
    Anywhere,
    #[serde(rename = "UNITED STATES")]
    UnitedStates,
    #[serde(rename = "CANADA")]
    Canada,
    #[serde(rename = "LATIN AMERICA")]
    LatinAmerica,
    #[serde(rename = "UNITED KINGDOM")]
    UnitedKingdom,
    #[serde(rename = "EUROPE")]
    Europe,
    #[serde(rename = "AFRICA")]
    Africa,
    #[serde(rename = "MIDDLE EAST")]
    MiddleEast,
    #[serde(rename = "INDIA")]
    India,
    #[serde(rename = "ASIA")]
    Asia,
    #[serde(rename = "AUSTRALIA")]
    Australia,
}

impl LocationKey {
    /// Every key, in candidate order. Fuzzy-match ties resolve to the earlier entry.
    pub const ALL: [LocationKey; 11] = [
        LocationKey::Anywhere,
        LocationKey::UnitedStates,
        LocationKey::Canada,
        LocationKey::LatinAmerica,
        LocationKey::UnitedKingdom,
        LocationKey::Europe,
        LocationKey::Africa,
        LocationKey::MiddleEast,
        LocationKey::India,
        LocationKey::Asia,
        LocationKey::Australia,
    ];

    /// The canonical upper-case key string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anywhere => "ANYWHERE",
            Self::UnitedStates => "UNITED STATES",
            Self::Canada => "CANADA",
            Self::LatinAmerica => "LATIN AMERICA",
            Self::UnitedKingdom => "UNITED KINGDOM",
            Self::Europe => "EUROPE",
            Self::Africa => "AFRICA",
            Self::MiddleEast => "MIDDLE EAST",
            Self::India => "INDIA",
            Self::Asia => "ASIA",
            Self::Australia => "AUSTRALIA",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anywhere => "Anywhere",
            Self::UnitedStates => "United States",
            Self::Canada => "Canada",
            Self::LatinAmerica => "Latin America",
            Self::UnitedKingdom => "United Kingdom",
            Self::Europe => "Europe",
            Self::Africa => "Africa",
            Self::MiddleEast => "Middle East",
            Self::India => "India",
            Self::Asia => "Asia",
            Self::Australia => "Australia",
        }
    }

    /// Exact lookup by key string. Expects already case-folded input.
    pub fn from_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_roundtrip() {
        for key in LocationKey::ALL {
            assert_eq!(LocationKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(LocationKey::from_key("united states"), None);
    }

    #[test]
    fn test_serializes_as_key_string() {
        let json = serde_json::to_string(&LocationKey::UnitedStates).unwrap();
        assert_eq!(json, "\"UNITED STATES\"");
    }
}
