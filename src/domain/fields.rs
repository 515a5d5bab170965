//! The form's field catalogue.
//!
//! Field names are an enum rather than string literals so the collector,
//! the CLI and the TUI all agree on spelling at compile time. The string form
//! (`Field::as_str`) is the column name used in training data and schemas.

use clap::ValueEnum;

/// Column name of the categorical neighbourhood supplied by the location provider.
pub const NEIGHBORHOOD_FIELD: &str = "neighborhood";

/// Every raw input the collector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    OverallQual,
    GrLivArea,
    TotalBsmtSF,
    GarageCars,
    GarageArea,
    YearBuilt,
    YearRemodAdd,
    MsZoning,
    LotConfig,
    HouseStyle,
    Latitude,
    Longitude,
}

/// How a field is edited in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Slider,
    Number,
    Choice,
    Coordinate,
}

impl Field {
    /// Fields shown in the form, in display order. The coordinate is picked on the map.
    pub const FORM: [Field; 10] = [
        Field::OverallQual,
        Field::GrLivArea,
        Field::TotalBsmtSF,
        Field::GarageCars,
        Field::GarageArea,
        Field::YearBuilt,
        Field::YearRemodAdd,
        Field::MsZoning,
        Field::LotConfig,
        Field::HouseStyle,
    ];

    /// Column name used in records, training CSVs and schemas.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::OverallQual => "OverallQual",
            Field::GrLivArea => "GrLivArea",
            Field::TotalBsmtSF => "TotalBsmtSF",
            Field::GarageCars => "GarageCars",
            Field::GarageArea => "GarageArea",
            Field::YearBuilt => "YearBuilt",
            Field::YearRemodAdd => "YearRemodAdd",
            Field::MsZoning => "MSZoning",
            Field::LotConfig => "LotConfig",
            Field::HouseStyle => "HouseStyle",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
        }
    }

    /// Human-readable label for the form.
    pub fn label(self) -> &'static str {
        match self {
            Field::OverallQual => "Overall Quality (1-10)",
            Field::GrLivArea => "Above Ground Living Area (sqft)",
            Field::TotalBsmtSF => "Total Basement Area (sqft)",
            Field::GarageCars => "Garage Cars",
            Field::GarageArea => "Garage Area (sqft)",
            Field::YearBuilt => "Year Built",
            Field::YearRemodAdd => "Year Remodeled",
            Field::MsZoning => "MS Zoning",
            Field::LotConfig => "Lot Configuration",
            Field::HouseStyle => "House Style",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
        }
    }

    pub fn widget(self) -> WidgetKind {
        match self {
            Field::OverallQual | Field::GarageCars => WidgetKind::Slider,
            Field::GrLivArea
            | Field::TotalBsmtSF
            | Field::GarageArea
            | Field::YearBuilt
            | Field::YearRemodAdd => WidgetKind::Number,
            Field::MsZoning | Field::LotConfig | Field::HouseStyle => WidgetKind::Choice,
            Field::Latitude | Field::Longitude => WidgetKind::Coordinate,
        }
    }

    /// Range/step/default for numeric form fields (`None` for choices and coordinates).
    pub fn numeric_spec(self) -> Option<NumericSpec> {
        let spec = match self {
            Field::OverallQual => NumericSpec::bounded(1.0, 10.0, 1.0, 5.0),
            Field::GrLivArea => NumericSpec::unbounded(0.0, 50.0, 1500.0, 6000.0),
            Field::TotalBsmtSF => NumericSpec::unbounded(0.0, 50.0, 1000.0, 6000.0),
            Field::GarageCars => NumericSpec::bounded(0.0, 4.0, 1.0, 2.0),
            Field::GarageArea => NumericSpec::unbounded(0.0, 25.0, 500.0, 1500.0),
            Field::YearBuilt => NumericSpec::bounded(1800.0, 2023.0, 1.0, 2000.0),
            Field::YearRemodAdd => NumericSpec::bounded(1800.0, 2023.0, 1.0, 2000.0),
            _ => return None,
        };
        Some(spec)
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_spec().is_some()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds and stepping for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSpec {
    pub min: f64,
    /// Upper bound enforced on input (`None` = unbounded number field).
    pub max: Option<f64>,
    pub step: f64,
    pub default: f64,
    /// Upper end used when sweeping the field for the sensitivity chart.
    pub chart_max: f64,
}

impl NumericSpec {
    const fn bounded(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max: Some(max),
            step,
            default,
            chart_max: max,
        }
    }

    const fn unbounded(min: f64, step: f64, default: f64, chart_max: f64) -> Self {
        Self {
            min,
            max: None,
            step,
            default,
            chart_max,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let v = value.max(self.min);
        match self.max {
            Some(max) => v.min(max),
            None => v,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && self.max.is_none_or(|max| value <= max)
    }
}

/// A dropdown-style input with a fixed option list.
pub trait Categorical: Copy + PartialEq + 'static {
    const FIELD: Field;

    fn all() -> &'static [Self];

    /// Label as it appears in training data (and therefore in indicator column names).
    fn label(self) -> &'static str;

    fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|v| *v == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|v| *v == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// General zoning classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum MsZoning {
    #[default]
    #[value(name = "RL")]
    Rl,
    #[value(name = "RM")]
    Rm,
    #[value(name = "C (all)", alias = "C")]
    CAll,
    #[value(name = "FV")]
    Fv,
    #[value(name = "RH")]
    Rh,
}

impl Categorical for MsZoning {
    const FIELD: Field = Field::MsZoning;

    fn all() -> &'static [Self] {
        &[MsZoning::Rl, MsZoning::Rm, MsZoning::CAll, MsZoning::Fv, MsZoning::Rh]
    }

    fn label(self) -> &'static str {
        match self {
            MsZoning::Rl => "RL",
            MsZoning::Rm => "RM",
            MsZoning::CAll => "C (all)",
            MsZoning::Fv => "FV",
            MsZoning::Rh => "RH",
        }
    }
}

/// Lot configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum LotConfig {
    #[default]
    #[value(name = "Inside")]
    Inside,
    #[value(name = "Corner")]
    Corner,
    #[value(name = "CulDSac")]
    CulDSac,
    #[value(name = "FR2")]
    Fr2,
    #[value(name = "FR3")]
    Fr3,
}

impl Categorical for LotConfig {
    const FIELD: Field = Field::LotConfig;

    fn all() -> &'static [Self] {
        &[
            LotConfig::Inside,
            LotConfig::Corner,
            LotConfig::CulDSac,
            LotConfig::Fr2,
            LotConfig::Fr3,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            LotConfig::Inside => "Inside",
            LotConfig::Corner => "Corner",
            LotConfig::CulDSac => "CulDSac",
            LotConfig::Fr2 => "FR2",
            LotConfig::Fr3 => "FR3",
        }
    }
}

/// Style of dwelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum HouseStyle {
    #[default]
    #[value(name = "1Story")]
    OneStory,
    #[value(name = "2Story")]
    TwoStory,
    #[value(name = "1.5Fin")]
    OneHalfFin,
    #[value(name = "1.5Unf")]
    OneHalfUnf,
    #[value(name = "SFoyer")]
    SFoyer,
}

impl Categorical for HouseStyle {
    const FIELD: Field = Field::HouseStyle;

    fn all() -> &'static [Self] {
        &[
            HouseStyle::OneStory,
            HouseStyle::TwoStory,
            HouseStyle::OneHalfFin,
            HouseStyle::OneHalfUnf,
            HouseStyle::SFoyer,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            HouseStyle::OneStory => "1Story",
            HouseStyle::TwoStory => "2Story",
            HouseStyle::OneHalfFin => "1.5Fin",
            HouseStyle::OneHalfUnf => "1.5Unf",
            HouseStyle::SFoyer => "SFoyer",
        }
    }
}

/// The typed form state for one house.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseInputs {
    pub overall_qual: f64,
    pub gr_liv_area: f64,
    pub total_bsmt_sf: f64,
    pub garage_cars: f64,
    pub garage_area: f64,
    pub year_built: f64,
    pub year_remod_add: f64,
    pub ms_zoning: MsZoning,
    pub lot_config: LotConfig,
    pub house_style: HouseStyle,
}

impl Default for HouseInputs {
    fn default() -> Self {
        let d = |f: Field| f.numeric_spec().map(|s| s.default).unwrap_or(0.0);
        Self {
            overall_qual: d(Field::OverallQual),
            gr_liv_area: d(Field::GrLivArea),
            total_bsmt_sf: d(Field::TotalBsmtSF),
            garage_cars: d(Field::GarageCars),
            garage_area: d(Field::GarageArea),
            year_built: d(Field::YearBuilt),
            year_remod_add: d(Field::YearRemodAdd),
            ms_zoning: MsZoning::default(),
            lot_config: LotConfig::default(),
            house_style: HouseStyle::default(),
        }
    }
}

impl HouseInputs {
    /// Current value of a numeric field.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        let v = match field {
            Field::OverallQual => self.overall_qual,
            Field::GrLivArea => self.gr_liv_area,
            Field::TotalBsmtSF => self.total_bsmt_sf,
            Field::GarageCars => self.garage_cars,
            Field::GarageArea => self.garage_area,
            Field::YearBuilt => self.year_built,
            Field::YearRemodAdd => self.year_remod_add,
            _ => return None,
        };
        Some(v)
    }

    /// Set a numeric field, clamped into its allowed range. Non-numeric fields are ignored.
    pub fn set_numeric(&mut self, field: Field, value: f64) {
        let Some(spec) = field.numeric_spec() else {
            return;
        };
        if !value.is_finite() {
            return;
        }
        let v = spec.clamp(value);
        match field {
            Field::OverallQual => self.overall_qual = v,
            Field::GrLivArea => self.gr_liv_area = v,
            Field::TotalBsmtSF => self.total_bsmt_sf = v,
            Field::GarageCars => self.garage_cars = v,
            Field::GarageArea => self.garage_area = v,
            Field::YearBuilt => self.year_built = v,
            Field::YearRemodAdd => self.year_remod_add = v,
            _ => {}
        }
    }

    /// Step a field by `delta` notches (slider/number) or options (choice).
    pub fn step(&mut self, field: Field, delta: i32) {
        match field {
            Field::MsZoning => self.ms_zoning = cycle(self.ms_zoning, delta),
            Field::LotConfig => self.lot_config = cycle(self.lot_config, delta),
            Field::HouseStyle => self.house_style = cycle(self.house_style, delta),
            _ => {
                if let (Some(spec), Some(cur)) = (field.numeric_spec(), self.numeric(field)) {
                    self.set_numeric(field, cur + spec.step * f64::from(delta));
                }
            }
        }
    }

    /// Display value for the form.
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::MsZoning => self.ms_zoning.label().to_string(),
            Field::LotConfig => self.lot_config.label().to_string(),
            Field::HouseStyle => self.house_style.label().to_string(),
            _ => self
                .numeric(field)
                .map(|v| format!("{v:.0}"))
                .unwrap_or_default(),
        }
    }

    /// Range-check every numeric field.
    pub fn validate(&self) -> Result<(), InputError> {
        for field in Field::FORM {
            let (Some(spec), Some(value)) = (field.numeric_spec(), self.numeric(field)) else {
                continue;
            };
            if !value.is_finite() {
                return Err(InputError::NonFinite { field });
            }
            if !spec.contains(value) {
                return Err(InputError::OutOfRange {
                    field,
                    value,
                    min: spec.min,
                    max: spec.max,
                });
            }
            if spec.step >= 1.0 && value.fract() != 0.0 {
                return Err(InputError::NotWhole { field, value });
            }
        }
        Ok(())
    }
}

fn cycle<C: Categorical>(value: C, delta: i32) -> C {
    let mut v = value;
    for _ in 0..delta.unsigned_abs() {
        v = if delta >= 0 { v.next() } else { v.prev() };
    }
    v
}

/// Invalid form input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    NonFinite { field: Field },
    OutOfRange { field: Field, value: f64, min: f64, max: Option<f64> },
    NotWhole { field: Field, value: f64 },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{} must be a finite number", field.label()),
            Self::OutOfRange { field, value, min, max: Some(max) } => {
                write!(f, "{} = {value} is outside [{min}, {max}]", field.label())
            }
            Self::OutOfRange { field, value, min, max: None } => {
                write!(f, "{} = {value} must be >= {min}", field.label())
            }
            Self::NotWhole { field, value } => {
                write!(f, "{} = {value} must be a whole number", field.label())
            }
        }
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form() {
        let inputs = HouseInputs::default();
        assert_eq!(inputs.overall_qual, 5.0);
        assert_eq!(inputs.gr_liv_area, 1500.0);
        assert_eq!(inputs.year_remod_add, 2000.0);
        assert_eq!(inputs.ms_zoning, MsZoning::Rl);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn step_clamps_sliders() {
        let mut inputs = HouseInputs::default();
        inputs.step(Field::OverallQual, 10);
        assert_eq!(inputs.overall_qual, 10.0);
        inputs.step(Field::GarageCars, -5);
        assert_eq!(inputs.garage_cars, 0.0);
    }

    #[test]
    fn step_cycles_choices() {
        let mut inputs = HouseInputs::default();
        inputs.step(Field::MsZoning, -1);
        assert_eq!(inputs.ms_zoning, MsZoning::Rh);
        inputs.step(Field::MsZoning, 3);
        assert_eq!(inputs.ms_zoning, MsZoning::CAll);
    }

    #[test]
    fn validate_rejects_out_of_range_year() {
        let inputs = HouseInputs {
            year_built: 1700.0,
            ..HouseInputs::default()
        };
        let err = inputs.validate().unwrap_err();
        assert!(matches!(err, InputError::OutOfRange { field: Field::YearBuilt, .. }));
        assert!(err.to_string().contains("Year Built"));
    }

    #[test]
    fn validate_rejects_fractional_slider() {
        let inputs = HouseInputs {
            garage_cars: 1.5,
            ..HouseInputs::default()
        };
        assert!(matches!(
            inputs.validate(),
            Err(InputError::NotWhole { field: Field::GarageCars, .. })
        ));
    }

    #[test]
    fn labels_are_distinct() {
        let zoning: Vec<&str> = MsZoning::all().iter().map(|z| z.label()).collect();
        assert_eq!(zoning, vec!["RL", "RM", "C (all)", "FV", "RH"]);
        assert_eq!(HouseStyle::OneHalfFin.label(), "1.5Fin");
        assert_eq!(LotConfig::Fr3.next(), LotConfig::Inside);
    }
}
