//! Assemble the raw `FeatureRecord` for one request.

use crate::domain::{Categorical, FeatureRecord, Field, HouseInputs, SessionState};
use crate::features::location::LocationFeatureProvider;

/// Collect form inputs, the session's coordinate and location features into one record.
///
/// Categorical fields are stored as labels; call `encode::one_hot` before
/// reconciling against a schema. Location features never overwrite a form field.
pub fn collect(
    inputs: &HouseInputs,
    session: &SessionState,
    location: &dyn LocationFeatureProvider,
) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    for field in Field::FORM {
        if let Some(v) = inputs.numeric(field) {
            record.insert(field.as_str(), v);
        }
    }
    insert_choice(&mut record, inputs.ms_zoning);
    insert_choice(&mut record, inputs.lot_config);
    insert_choice(&mut record, inputs.house_style);

    let coordinate = session.coordinate();
    record.insert(Field::Latitude.as_str(), coordinate.latitude);
    record.insert(Field::Longitude.as_str(), coordinate.longitude);

    for (name, value) in location.features(coordinate).iter() {
        if !record.contains(name) {
            record.insert(name, value.clone());
        }
    }

    record
}

fn insert_choice<C: Categorical>(record: &mut FeatureRecord, value: C) {
    record.insert(C::FIELD.as_str(), value.label());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, FieldValue, HouseStyle};
    use crate::features::location::StaticLocationFeatures;

    #[test]
    fn collects_form_coordinate_and_location() {
        let inputs = HouseInputs {
            overall_qual: 7.0,
            house_style: HouseStyle::TwoStory,
            ..HouseInputs::default()
        };
        let session = SessionState::new(Coordinate::new(41.0, -73.5));
        let record = collect(&inputs, &session, &StaticLocationFeatures::default());

        assert_eq!(record.get("OverallQual"), Some(&FieldValue::Number(7.0)));
        assert_eq!(record.get("HouseStyle"), Some(&FieldValue::Category("2Story".into())));
        assert_eq!(record.get("MSZoning"), Some(&FieldValue::Category("RL".into())));
        assert_eq!(record.get("Latitude"), Some(&FieldValue::Number(41.0)));
        assert_eq!(record.get("Longitude"), Some(&FieldValue::Number(-73.5)));
        assert_eq!(record.get("crime_rate"), Some(&FieldValue::Number(0.05)));
        // 7 numeric + 3 categorical + 2 coordinate + 8 location
        assert_eq!(record.len(), 20);
    }
}
