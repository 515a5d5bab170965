//! Schema artifact (JSON).
//!
//! Two shapes are accepted:
//!
//! ```text
//! ["OverallQual", "GrLivArea", "MSZoning_RL", ...]
//! {"features": [...], "encoding": "one-hot", "separator": "_",
//!  "categories": {"MSZoning": ["RL", "RM"], ...}}
//! ```
//!
//! The object form is what `hpp train` writes; it records the categorical
//! encoding the column names assume so a mismatched artifact fails at load,
//! and which columns are indicators of which field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ExpectedSchema, INDICATOR_SEPARATOR, SchemaError};

pub const ENCODING_ONE_HOT: &str = "one-hot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub features: Vec<String>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Indicator labels per categorical field. Absent in bare lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, Vec<String>>>,
}

fn default_encoding() -> String {
    ENCODING_ONE_HOT.to_string()
}

fn default_separator() -> String {
    INDICATOR_SEPARATOR.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaShape {
    List(Vec<String>),
    Object(SchemaFile),
}

impl SchemaFile {
    pub fn from_schema(schema: &ExpectedSchema) -> Self {
        Self {
            features: schema.names().to_vec(),
            encoding: default_encoding(),
            separator: default_separator(),
            categories: Some(schema.categories()),
        }
    }

    /// Parse either accepted JSON shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let shape: SchemaShape = serde_json::from_str(json)?;
        Ok(match shape {
            SchemaShape::List(features) => Self {
                features,
                encoding: default_encoding(),
                separator: default_separator(),
                categories: None,
            },
            SchemaShape::Object(file) => file,
        })
    }

    /// Validate encoding and build the runtime schema.
    pub fn to_schema(&self) -> Result<ExpectedSchema, SchemaError> {
        if self.encoding != ENCODING_ONE_HOT || self.separator != INDICATOR_SEPARATOR {
            return Err(SchemaError::UnsupportedEncoding(format!(
                "{} (separator '{}')",
                self.encoding, self.separator
            )));
        }
        let schema = ExpectedSchema::new(self.features.iter().cloned())?;
        match &self.categories {
            Some(categories) => schema.with_categories(categories),
            None => Ok(schema),
        }
    }
}
