//! Stop identity and records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical key for a stop name.
///
/// Stop names are compared trimmed and case-insensitively everywhere in the
/// engine. `StopKey` is the only way to produce a lookup key, so graph
/// construction and lookup always agree on the canonical form.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StopKey;
///
/// let a = StopKey::new("  Vashi Depot ");
/// let b = StopKey::new("VASHI DEPOT");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "vashi depot");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopKey(String);

impl StopKey {
    /// Canonicalize a display name into a key.
    pub fn new(name: &str) -> Self {
        StopKey(name.trim().to_lowercase())
    }

    /// Returns the canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the name was blank after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `name` canonicalizes to this key.
    pub fn matches(&self, name: &str) -> bool {
        self.0 == name.trim().to_lowercase()
    }
}

impl fmt::Debug for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopKey({})", self.0)
    }
}

impl fmt::Display for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named transit waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Stop {
    /// A stop with no known location.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// A stop at the given coordinates.
    pub fn located(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn key(&self) -> StopKey {
        StopKey::new(&self.name)
    }

    /// Coordinates, if both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_trims_and_lowercases() {
        assert_eq!(StopKey::new(" Nerul  ").as_str(), "nerul");
        assert_eq!(StopKey::new("CBD Belapur"), StopKey::new("cbd belapur"));
    }

    #[test]
    fn blank_key_is_empty() {
        assert!(StopKey::new("   ").is_empty());
        assert!(!StopKey::new("A").is_empty());
    }

    #[test]
    fn matches_raw_names() {
        let key = StopKey::new("Vashi");
        assert!(key.matches("VASHI "));
        assert!(!key.matches("Vashi Depot"));
    }

    #[test]
    fn display_and_debug() {
        let key = StopKey::new("Sanpada");
        assert_eq!(format!("{}", key), "sanpada");
        assert_eq!(format!("{:?}", key), "StopKey(sanpada)");
    }

    #[test]
    fn coordinates_need_both_values() {
        assert_eq!(Stop::located("A", 19.0, 73.0).coordinates(), Some((19.0, 73.0)));
        let mut half = Stop::named("B");
        half.latitude = Some(19.0);
        assert_eq!(half.coordinates(), None);
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let json = serde_json::to_string(&StopKey::new("Vashi")).unwrap();
        assert_eq!(json, "\"vashi\"");
    }
}
