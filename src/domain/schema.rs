//! The ordered feature list a trained model expects.
//!
//! An `ExpectedSchema` is built once at start-up from the schema artifact and
//! never changes afterwards. Cloning is cheap (the name list is shared).
//!
//! Besides the names, a schema knows which of its columns are one-hot
//! indicators and which categorical field each one encodes. Trained artifacts
//! declare this explicitly; for a bare name list it is inferred for the
//! categorical fields the form and location provider supply.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::fields::{Field, NEIGHBORHOOD_FIELD};

/// Separator between a categorical field and its label in indicator columns.
pub const INDICATOR_SEPARATOR: &str = "_";

/// Indicator column name for `field = label` (e.g. `MSZoning_RL`).
pub fn indicator_name(field: &str, label: &str) -> String {
    format!("{field}{INDICATOR_SEPARATOR}{label}")
}

/// Split `name` into its label when it is an indicator of `family`.
fn indicator_label<'a>(name: &'a str, family: &str) -> Option<&'a str> {
    name.strip_prefix(family)?
        .strip_prefix(INDICATOR_SEPARATOR)
        .filter(|label| !label.is_empty())
}

fn known_families() -> [&'static str; 4] {
    [
        Field::MsZoning.as_str(),
        Field::LotConfig.as_str(),
        Field::HouseStyle.as_str(),
        NEIGHBORHOOD_FIELD,
    ]
}

/// Ordered, duplicate-free list of feature names.
#[derive(Debug, Clone)]
pub struct ExpectedSchema {
    names: Arc<[String]>,
    index: Arc<HashMap<String, usize>>,
    /// Indicator column -> categorical field it encodes.
    indicators: Arc<HashMap<String, String>>,
}

impl ExpectedSchema {
    /// Build a schema, rejecting empty lists, blank names and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SchemaError::BlankName { position: pos });
            }
            if let Some(first) = index.insert(name.clone(), pos) {
                return Err(SchemaError::Duplicate {
                    name: name.clone(),
                    first,
                    second: pos,
                });
            }
        }

        let mut indicators = HashMap::new();
        for name in &names {
            if let Some(family) = known_families()
                .into_iter()
                .find(|family| indicator_label(name, family).is_some())
            {
                indicators.insert(name.clone(), family.to_string());
            }
        }

        Ok(Self {
            names: names.into(),
            index: Arc::new(index),
            indicators: Arc::new(indicators),
        })
    }

    /// Replace the inferred indicator columns with an explicit
    /// `field -> labels` declaration. Every declared indicator must be listed.
    pub fn with_categories(mut self, categories: &BTreeMap<String, Vec<String>>) -> Result<Self, SchemaError> {
        let mut indicators = HashMap::new();
        for (family, labels) in categories {
            for label in labels {
                let name = indicator_name(family, label);
                if !self.contains(&name) {
                    return Err(SchemaError::UndeclaredIndicator(name));
                }
                indicators.insert(name, family.clone());
            }
        }
        self.indicators = Arc::new(indicators);
        Ok(self)
    }

    /// Categorical field encoded by an indicator column.
    pub fn indicator_family(&self, name: &str) -> Option<&str> {
        self.indicators.get(name).map(String::as_str)
    }

    /// True when the schema has at least one indicator for `family`.
    pub fn has_family(&self, family: &str) -> bool {
        self.indicators.values().any(|f| f == family)
    }

    /// Indicator labels per categorical field, in schema order.
    pub fn categories(&self) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in self.iter() {
            let Some(family) = self.indicator_family(name) else {
                continue;
            };
            if let Some(label) = indicator_label(name, family) {
                out.entry(family.to_string()).or_default().push(label.to_string());
            }
        }
        out
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed schema; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl PartialEq for ExpectedSchema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.names, &other.names) || self.names == other.names
    }
}

impl Eq for ExpectedSchema {}

/// Invalid schema artifact contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Empty,
    BlankName { position: usize },
    Duplicate { name: String, first: usize, second: usize },
    UnsupportedEncoding(String),
    UndeclaredIndicator(String),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "schema has no feature names"),
            Self::BlankName { position } => write!(f, "schema has a blank feature name at position {position}"),
            Self::Duplicate { name, first, second } => {
                write!(f, "schema lists '{name}' twice (positions {first} and {second})")
            }
            Self::UnsupportedEncoding(enc) => {
                write!(f, "unsupported categorical encoding '{enc}' (expected one-hot with '_' separator)")
            }
            Self::UndeclaredIndicator(name) => {
                write!(f, "categories declare '{name}' but the feature list does not")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_positions() {
        let schema = ExpectedSchema::new(["b", "a", "c"]).unwrap();
        assert_eq!(schema.names(), &["b", "a", "c"]);
        assert_eq!(schema.position("a"), Some(1));
        assert!(!schema.contains("d"));
    }

    #[test]
    fn rejects_duplicates() {
        let err = ExpectedSchema::new(["OverallQual", "GarageCars", "OverallQual"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Duplicate {
                name: "OverallQual".to_string(),
                first: 0,
                second: 2
            }
        );
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(ExpectedSchema::new(Vec::<String>::new()).unwrap_err(), SchemaError::Empty);
        assert_eq!(
            ExpectedSchema::new(["a", " "]).unwrap_err(),
            SchemaError::BlankName { position: 1 }
        );
    }

    #[test]
    fn infers_indicators_of_form_fields() {
        let schema = ExpectedSchema::new(["MSZoning_C (all)", "neighborhood_Downtown", "Lot_Frontage", "MSZoning"]).unwrap();
        assert_eq!(schema.indicator_family("MSZoning_C (all)"), Some("MSZoning"));
        assert_eq!(schema.indicator_family("neighborhood_Downtown"), Some("neighborhood"));
        assert_eq!(schema.indicator_family("Lot_Frontage"), None);
        assert_eq!(schema.indicator_family("MSZoning"), None);
        assert!(schema.has_family("MSZoning"));
        assert!(!schema.has_family("LotConfig"));
    }

    #[test]
    fn declared_categories_replace_inference() {
        let categories: BTreeMap<String, Vec<String>> =
            [("Lot".to_string(), vec!["Inside".to_string(), "FR2".to_string()])].into_iter().collect();
        let schema = ExpectedSchema::new(["Lot_Frontage", "Lot_FR2", "Lot_Inside", "MSZoning_RL"])
            .unwrap()
            .with_categories(&categories)
            .unwrap();
        assert_eq!(schema.indicator_family("Lot_Inside"), Some("Lot"));
        assert_eq!(schema.indicator_family("Lot_Frontage"), None);
        assert_eq!(schema.indicator_family("MSZoning_RL"), None);
        let back = schema.categories();
        assert_eq!(back["Lot"], vec!["FR2", "Inside"]);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn declared_indicator_must_be_listed() {
        let categories: BTreeMap<String, Vec<String>> =
            [("Lot".to_string(), vec!["Corner".to_string()])].into_iter().collect();
        let err = ExpectedSchema::new(["Lot_Inside"]).unwrap().with_categories(&categories).unwrap_err();
        assert_eq!(err, SchemaError::UndeclaredIndicator("Lot_Corner".to_string()));
    }

    #[test]
    fn indicator_uses_label_verbatim() {
        assert_eq!(indicator_name("MSZoning", "C (all)"), "MSZoning_C (all)");
    }
}
