//! Shared per-request types.
//!
//! A `FeatureRecord` is built fresh for every prediction and discarded after
//! use. The only value that outlives a request is the selected coordinate,
//! which lives in `SessionState` and is passed explicitly to whoever needs it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Default map location (New York City).
pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;

/// A single named input value: numeric or a categorical label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Category(label) => write!(f, "{label}"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

/// Raw named inputs for one request (feature name -> value).
///
/// `indicators` remembers every `<field>_<label>` column the encoder emitted
/// and the field it came from, so reconciliation can tell an inactive sibling
/// indicator or an unseen label apart from an ordinary column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    values: BTreeMap<String, FieldValue>,
    indicators: BTreeMap<String, String>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(crate) fn mark_indicator(&mut self, indicator: impl Into<String>, family: impl Into<String>) {
        self.indicators.insert(indicator.into(), family.into());
    }

    /// Field an emitted indicator column belongs to.
    pub fn indicator_family(&self, name: &str) -> Option<&str> {
        self.indicators.get(name).map(String::as_str)
    }

    /// `(indicator, field)` pairs emitted by the encoder.
    pub fn indicators(&self) -> impl Iterator<Item = (&str, &str)> {
        self.indicators.iter().map(|(i, f)| (i.as_str(), f.as_str()))
    }

    /// Distinct fields that were one-hot encoded.
    pub fn encoded_families(&self) -> BTreeSet<&str> {
        self.indicators.values().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FeatureRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = FeatureRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Clamp into the valid lat/lng range.
    pub fn clamped(self) -> Self {
        Self {
            latitude: self.latitude.clamp(-90.0, 90.0),
            longitude: self.longitude.clamp(-180.0, 180.0),
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

/// State retained between renders of the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    coordinate: Coordinate,
}

impl SessionState {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: coordinate.clamped(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Record a newly selected location (e.g. a map click).
    pub fn select(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_iter_overwrites_duplicates() {
        let record: FeatureRecord = [("a", 1.0), ("b", 2.0), ("a", 3.0)].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn session_select_clamps() {
        let mut session = SessionState::default();
        assert_eq!(session.coordinate(), Coordinate::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE));

        session.select(Coordinate::new(95.0, -200.0));
        assert_eq!(session.coordinate(), Coordinate::new(90.0, -180.0));
    }

    #[test]
    fn field_value_json_is_untagged() {
        let v: FieldValue = serde_json::from_str("7.5").unwrap();
        assert_eq!(v, FieldValue::Number(7.5));
        let v: FieldValue = serde_json::from_str("\"RL\"").unwrap();
        assert_eq!(v, FieldValue::Category("RL".to_string()));
    }
}
