//! Location-derived features.
//!
//! There is no geographic lookup yet: the default provider returns one fixed
//! neighbourhood profile for every coordinate. A different profile can be
//! supplied as JSON via `HPP_LOCATION_PROFILE`.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, FeatureRecord, NEIGHBORHOOD_FIELD};
use crate::error::AppError;

/// Source of features that depend on where the house is.
pub trait LocationFeatureProvider: Send + Sync {
    fn features(&self, coordinate: Coordinate) -> FeatureRecord;
}

/// A neighbourhood profile (one value per location feature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationProfile {
    pub neighborhood: String,
    pub crime_rate: f64,
    pub distance_to_school: f64,
    pub population_density: f64,
    pub median_income: f64,
    pub num_bedrooms: f64,
    pub num_bathrooms: f64,
    pub square_footage: f64,
}

impl Default for LocationProfile {
    fn default() -> Self {
        Self {
            neighborhood: "Downtown".to_string(),
            crime_rate: 0.05,
            distance_to_school: 2.5,
            population_density: 5000.0,
            median_income: 75000.0,
            num_bedrooms: 3.0,
            num_bathrooms: 2.0,
            square_footage: 1800.0,
        }
    }
}

impl LocationProfile {
    pub fn to_record(&self) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        record.insert(NEIGHBORHOOD_FIELD, self.neighborhood.as_str());
        record.insert("crime_rate", self.crime_rate);
        record.insert("distance_to_school", self.distance_to_school);
        record.insert("population_density", self.population_density);
        record.insert("median_income", self.median_income);
        record.insert("num_bedrooms", self.num_bedrooms);
        record.insert("num_bathrooms", self.num_bathrooms);
        record.insert("square_footage", self.square_footage);
        record
    }
}

/// Returns the same profile regardless of coordinate.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationFeatures {
    profile: LocationProfile,
}

impl StaticLocationFeatures {
    pub fn new(profile: LocationProfile) -> Self {
        Self { profile }
    }

    /// Load a profile from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open location profile '{}': {e}", path.display()))
        })?;
        let profile: LocationProfile = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid location profile JSON: {e}")))?;
        Ok(Self::new(profile))
    }
}

impl LocationFeatureProvider for StaticLocationFeatures {
    fn features(&self, _coordinate: Coordinate) -> FeatureRecord {
        self.profile.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[test]
    fn default_profile_features() {
        let provider = StaticLocationFeatures::default();
        let record = provider.features(Coordinate::default());
        assert_eq!(record.len(), 8);
        assert_eq!(record.get("neighborhood"), Some(&FieldValue::Category("Downtown".into())));
        assert_eq!(record.get("median_income"), Some(&FieldValue::Number(75000.0)));
    }

    #[test]
    fn profile_loads_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut profile = LocationProfile::default();
        profile.neighborhood = "Suburb".to_string();
        serde_json::to_writer(&mut file, &profile).unwrap();

        let provider = StaticLocationFeatures::from_file(file.path()).unwrap();
        let record = provider.features(Coordinate::default());
        assert_eq!(record.get("neighborhood"), Some(&FieldValue::Category("Suburb".into())));
    }

    #[test]
    fn missing_profile_is_input_error() {
        let err = StaticLocationFeatures::from_file(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
