//! One-hot expansion of categorical values.
//!
//! Every `Category(label)` value under `field` becomes a single indicator
//! column `<field>_<label> = 1.0`; the raw categorical entry is removed.
//! This is the only encoding the schema artifact supports.

use crate::domain::{FeatureRecord, FieldValue, indicator_name};

/// Expand categorical values into indicator columns.
pub fn one_hot(record: &FeatureRecord) -> FeatureRecord {
    let mut out = FeatureRecord::new();
    for (indicator, family) in record.indicators() {
        out.mark_indicator(indicator, family);
    }

    for (name, value) in record.iter() {
        match value {
            FieldValue::Number(v) => out.insert(name, *v),
            FieldValue::Category(label) => {
                let indicator = indicator_name(name, label);
                out.insert(indicator.as_str(), 1.0);
                out.mark_indicator(indicator, name);
            }
        }
    }

    out
}
