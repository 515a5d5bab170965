//! Input collection: form state -> `FeatureRecord`.
//!
//! - `collect`: typed form inputs + session coordinate + location features
//! - `encode`: categorical expansion into `<field>_<label>` indicator columns
//! - `location`: features derived from the selected coordinate

pub mod collect;
pub mod encode;
pub mod location;

pub use collect::*;
pub use encode::*;
pub use location::*;
