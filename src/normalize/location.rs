//! Fuzzy mapping of free-form location text onto [`LocationKey`]s.
//!
//! Uses Jaro similarity with the Winkler common-prefix bonus. Scores below the
//! matcher threshold fall back to [`LocationKey::Anywhere`].

use serde::{Deserialize, Serialize};

use crate::models::LocationKey;

/// Minimum Jaro-Winkler score for a fuzzy match to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

/// Winkler prefix scaling factor.
const PREFIX_SCALE: f64 = 0.1;

/// Longest common prefix that earns the Winkler bonus.
const MAX_PREFIX: usize = 4;

/// Outcome of matching one location string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationMatch {
    pub key: LocationKey,
    /// Similarity of the best candidate (1.0 for exact matches).
    pub score: f64,
    pub exact: bool,
}

/// Matcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationMatcher {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

impl Default for LocationMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl LocationMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Resolve raw text to a key, falling back to `ANYWHERE`.
    pub fn resolve(&self, raw: &str) -> LocationKey {
        self.best_match(raw).key
    }

    /// Resolve raw text and report the winning score.
    pub fn best_match(&self, raw: &str) -> LocationMatch {
        let folded = raw.trim().to_uppercase();

        if let Some(key) = LocationKey::from_key(&folded) {
            return LocationMatch {
                key,
                score: 1.0,
                exact: true,
            };
        }

        let mut best_key = LocationKey::Anywhere;
        let mut best_score = 0.0;
        for candidate in LocationKey::ALL {
            let score = jaro_winkler(&folded, candidate.as_str());
            if score > best_score {
                best_score = score;
                best_key = candidate;
            }
        }

        let key = if best_score >= self.threshold {
            best_key
        } else {
            LocationKey::Anywhere
        };

        LocationMatch {
            key,
            score: best_score,
            exact: false,
        }
    }
}

/// Jaro similarity in `[0, 1]`. Empty input scores 0.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut b_taken = vec![false; b.len()];
    let mut a_matched: Vec<char> = Vec::new();

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_taken[j] && b[j] == *ca {
                b_taken[j] = true;
                a_matched.push(*ca);
                break;
            }
        }
    }

    if a_matched.is_empty() {
        return 0.0;
    }

    let b_matched = b
        .iter()
        .zip(&b_taken)
        .filter(|(_, taken)| **taken)
        .map(|(c, _)| *c);
    let half_transpositions = a_matched
        .iter()
        .zip(b_matched)
        .filter(|(x, y)| **x != *y)
        .count();

    let m = a_matched.len() as f64;
    let t = half_transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro similarity plus the Winkler bonus for a shared prefix of up to four characters.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let sim = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    sim + PREFIX_SCALE * prefix as f64 * (1.0 - sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_exact_match_short_circuits() {
        let m = LocationMatcher::default().best_match("UNITED STATES");
        assert_eq!(m.key, LocationKey::UnitedStates);
        assert!(m.exact);

        let m = LocationMatcher::default().best_match("  canada ");
        assert_eq!(m.key, LocationKey::Canada);
        assert!(m.exact);
    }

    #[test]
    fn test_typo_resolves() {
        let m = LocationMatcher::default().best_match("Untied States");
        assert_eq!(m.key, LocationKey::UnitedStates);
        assert!(!m.exact);
        assert!(m.score >= DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn test_unknown_falls_back_to_anywhere() {
        let matcher = LocationMatcher::default();
        assert_eq!(matcher.resolve("Mars"), LocationKey::Anywhere);
        assert_eq!(matcher.resolve(""), LocationKey::Anywhere);
        assert_eq!(matcher.resolve("   "), LocationKey::Anywhere);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = LocationMatcher::new(0.99);
        assert_eq!(strict.resolve("Untied States"), LocationKey::Anywhere);
        assert_eq!(strict.resolve("united states"), LocationKey::UnitedStates);
    }

    #[test]
    fn test_reference_values() {
        assert!(close(jaro("MARTHA", "MARHTA"), 0.9444));
        assert!(close(jaro_winkler("MARTHA", "MARHTA"), 0.9611));
        assert!(close(jaro("DWAYNE", "DUANE"), 0.8222));
        assert!(close(jaro_winkler("DWAYNE", "DUANE"), 0.84));
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(jaro("", "CANADA"), 0.0);
        assert_eq!(jaro("CANADA", ""), 0.0);
        assert_eq!(jaro_winkler("", ""), 0.0);
    }

    #[test]
    fn test_agrees_with_strsim() {
        let pairs = [
            ("UNTIED STATES", "UNITED STATES"),
            ("MARTHA", "MARHTA"),
            ("DIXON", "DICKSONX"),
            ("EUORPE", "EUROPE"),
            ("MARS", "ASIA"),
            ("CANDA", "CANADA"),
        ];
        for (a, b) in pairs {
            assert!(close(jaro(a, b), strsim::jaro(a, b)), "{a} vs {b}");
        }
        // strsim only applies the prefix bonus above 0.7 Jaro
        for (a, b) in [("UNTIED STATES", "UNITED STATES"), ("CANDA", "CANADA")] {
            assert!(close(jaro_winkler(a, b), strsim::jaro_winkler(a, b)), "{a} vs {b}");
        }
    }

    #[test]
    fn test_deterministic() {
        let matcher = LocationMatcher::default();
        let first = matcher.best_match("Eurpoe");
        for _ in 0..5 {
            assert_eq!(matcher.best_match("Eurpoe"), first);
        }
        assert_eq!(first.key, LocationKey::Europe);
    }
}
