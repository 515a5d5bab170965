//! Schema reconciliation: reshape a `FeatureRecord` to exactly match an `ExpectedSchema`.
//!
//! For each expected column the record's value is used when present, otherwise
//! the fill default (`0.0`). Record columns the schema does not list are
//! dropped. The output order is the schema order.
//!
//! Reconciliation never fails, which makes mismatches easy to miss: a label
//! the model never saw, or a feature the form stopped supplying, still yields
//! a plausible price. `ReconcileReport` records what was defaulted and dropped
//! so callers can surface it.

use crate::domain::{ExpectedSchema, FeatureRecord, FieldValue};

/// Value used for expected columns the record does not supply.
pub const FILL_DEFAULT: f64 = 0.0;

/// A feature row whose columns are exactly the schema's, in schema order.
///
/// Only `reconcile` constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatureRow {
    schema: ExpectedSchema,
    values: Vec<f64>,
}

impl AlignedFeatureRow {
    pub fn schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// Values in schema order (what positional model inputs consume).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema.iter().zip(self.values.iter().copied())
    }

    /// Back to a plain record (all numeric).
    pub fn to_record(&self) -> FeatureRecord {
        self.iter().collect()
    }
}

/// What reconciliation had to change to fit the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Expected columns absent from the record (filled with the default).
    pub defaulted: Vec<String>,
    /// Indicator columns of an encoded family whose category was not selected.
    /// Zero is their correct value, so these are not warnings.
    pub inactive_indicators: Vec<String>,
    /// Record columns the schema does not list.
    pub dropped: Vec<String>,
    /// Dropped indicator columns of a family the model knows: a category label it was never trained on.
    pub unknown_categories: Vec<String>,
    /// Expected columns that arrived as raw (un-expanded) categorical labels.
    pub unencoded: Vec<String>,
}

impl ReconcileReport {
    /// True when nothing suspicious happened.
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
            && self.dropped.is_empty()
            && self.unknown_categories.is_empty()
            && self.unencoded.is_empty()
    }

    /// User-facing warning lines (empty when clean).
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.unknown_categories.is_empty() {
            out.push(format!(
                "Unrecognised category (model never saw it, treated as none): {}",
                self.unknown_categories.join(", ")
            ));
        }
        if !self.unencoded.is_empty() {
            out.push(format!(
                "Categorical input was not one-hot encoded, defaulted to 0: {}",
                self.unencoded.join(", ")
            ));
        }
        if !self.defaulted.is_empty() {
            out.push(format!(
                "{} expected feature(s) missing from input, defaulted to 0: {}",
                self.defaulted.len(),
                self.defaulted.join(", ")
            ));
        }
        if !self.dropped.is_empty() {
            out.push(format!(
                "{} input feature(s) not used by the model: {}",
                self.dropped.len(),
                self.dropped.join(", ")
            ));
        }
        out
    }
}

/// Output of `reconcile`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub row: AlignedFeatureRow,
    pub report: ReconcileReport,
}

/// Align `record` to `schema`.
pub fn reconcile(record: &FeatureRecord, schema: &ExpectedSchema) -> Reconciled {
    let encoded = record.encoded_families();

    let mut report = ReconcileReport::default();
    let mut values = Vec::with_capacity(schema.len());

    for name in schema.iter() {
        let value = match record.get(name) {
            Some(FieldValue::Number(v)) => *v,
            Some(FieldValue::Category(_)) => {
                report.unencoded.push(name.to_string());
                FILL_DEFAULT
            }
            None => {
                // A sibling of the selected category, not a missing feature.
                let inactive = schema
                    .indicator_family(name)
                    .is_some_and(|family| encoded.contains(family));
                if inactive {
                    report.inactive_indicators.push(name.to_string());
                } else {
                    report.defaulted.push(name.to_string());
                }
                FILL_DEFAULT
            }
        };
        values.push(value);
    }

    for name in record.names() {
        if schema.contains(name) {
            continue;
        }
        match record.indicator_family(name) {
            Some(family) if schema.has_family(family) => report.unknown_categories.push(name.to_string()),
            _ => report.dropped.push(name.to_string()),
        }
    }

    Reconciled {
        row: AlignedFeatureRow {
            schema: schema.clone(),
            values,
        },
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::one_hot;
    use std::collections::BTreeMap;

    fn schema(names: &[&str]) -> ExpectedSchema {
        ExpectedSchema::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn pads_and_drops_example() {
        let s = schema(&["OverallQual", "GarageCars", "MSZoning_RL"]);
        let r: FeatureRecord = [("OverallQual", 7.0), ("MSZoning_RM", 1.0)].into_iter().collect();

        let out = reconcile(&r, &s);
        let row: Vec<(&str, f64)> = out.row.iter().collect();
        assert_eq!(row, vec![("OverallQual", 7.0), ("GarageCars", 0.0), ("MSZoning_RL", 0.0)]);
        assert_eq!(out.report.dropped, vec!["MSZoning_RM"]);
        assert_eq!(out.report.defaulted, vec!["GarageCars", "MSZoning_RL"]);
    }

    #[test]
    fn key_set_always_matches_schema() {
        let s = schema(&["c", "a", "b"]);
        let records: Vec<FeatureRecord> = vec![
            FeatureRecord::new(),
            [("a", 1.0)].into_iter().collect(),
            [("x", 1.0), ("y", 2.0)].into_iter().collect(),
            [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)].into_iter().collect(),
        ];
        for r in &records {
            let out = reconcile(r, &s);
            let names: Vec<&str> = out.row.iter().map(|(n, _)| n).collect();
            assert_eq!(names, vec!["c", "a", "b"]);
            assert_eq!(out.row.len(), 3);
        }
    }

    #[test]
    fn empty_record_is_all_defaults() {
        let s = schema(&["a", "b"]);
        let out = reconcile(&FeatureRecord::new(), &s);
        assert_eq!(out.row.values(), &[FILL_DEFAULT, FILL_DEFAULT]);
        assert_eq!(out.report.defaulted, vec!["a", "b"]);
        assert!(!out.report.is_clean());
    }

    #[test]
    fn complete_record_passes_through() {
        let s = schema(&["b", "a"]);
        let r: FeatureRecord = [("a", 1.5), ("b", -2.0)].into_iter().collect();
        let out = reconcile(&r, &s);
        assert_eq!(out.row.values(), &[-2.0, 1.5]);
        assert!(out.report.is_clean());
        assert!(out.report.warnings().is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let s = schema(&["a", "b", "c"]);
        let r: FeatureRecord = [("a", 1.0), ("z", 9.0)].into_iter().collect();
        let first = reconcile(&r, &s);
        let second = reconcile(&first.row.to_record(), &s);
        assert_eq!(first.row, second.row);
        assert!(second.report.is_clean());
    }

    #[test]
    fn sibling_indicators_are_not_warnings() {
        let s = schema(&["OverallQual", "MSZoning_RL", "MSZoning_RM"]);
        let mut raw = FeatureRecord::new();
        raw.insert("OverallQual", 6.0);
        raw.insert("MSZoning", "RM");

        let out = reconcile(&one_hot(&raw), &s);
        assert_eq!(out.row.values(), &[6.0, 0.0, 1.0]);
        assert_eq!(out.report.inactive_indicators, vec!["MSZoning_RL"]);
        assert!(out.report.is_clean());
    }

    #[test]
    fn unseen_category_is_reported() {
        let s = schema(&["MSZoning_RL", "MSZoning_RM"]);
        let mut raw = FeatureRecord::new();
        raw.insert("MSZoning", "C (all)");

        let out = reconcile(&one_hot(&raw), &s);
        assert_eq!(out.row.values(), &[0.0, 0.0]);
        assert_eq!(out.report.unknown_categories, vec!["MSZoning_C (all)"]);
        assert!(out.report.warnings()[0].contains("MSZoning_C (all)"));
    }

    #[test]
    fn untrained_family_is_plain_drop() {
        let s = schema(&["OverallQual"]);
        let mut raw = FeatureRecord::new();
        raw.insert("LotConfig", "Corner");

        let out = reconcile(&one_hot(&raw), &s);
        assert_eq!(out.report.dropped, vec!["LotConfig_Corner"]);
        assert!(out.report.unknown_categories.is_empty());
    }

    #[test]
    fn column_sharing_a_field_prefix_is_not_an_indicator() {
        let categories: BTreeMap<String, Vec<String>> =
            [("Lot".to_string(), vec!["Inside".to_string()])].into_iter().collect();
        let s = schema(&["Lot_Frontage", "Lot_Inside"]).with_categories(&categories).unwrap();
        let mut raw = FeatureRecord::new();
        raw.insert("Lot", "Corner");
        raw.insert("Lot_Area", 8000.0);

        let out = reconcile(&one_hot(&raw), &s);
        assert_eq!(out.report.defaulted, vec!["Lot_Frontage"]);
        assert_eq!(out.report.inactive_indicators, vec!["Lot_Inside"]);
        assert_eq!(out.report.unknown_categories, vec!["Lot_Corner"]);
        assert_eq!(out.report.dropped, vec!["Lot_Area"]);
        assert!(!out.report.is_clean());
    }

    #[test]
    fn unencoded_category_defaults_and_warns() {
        let s = schema(&["MSZoning"]);
        let mut raw = FeatureRecord::new();
        raw.insert("MSZoning", "RL");

        let out = reconcile(&raw, &s);
        assert_eq!(out.row.get("MSZoning"), Some(0.0));
        assert_eq!(out.report.unencoded, vec!["MSZoning"]);
    }
}
