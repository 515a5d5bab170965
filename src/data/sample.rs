//! Synthetic house sample generation.
//!
//! Prices follow a fixed linear rule (`price_rule`) plus Normal noise, so a
//! model trained on the output should recover roughly these effects.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{Categorical, Coordinate, Field, HouseInputs, HouseStyle, LotConfig, MsZoning, NEIGHBORHOOD_FIELD};
use crate::error::AppError;
use crate::features::LocationProfile;

/// Name of the price column written by the generator.
pub const TARGET_COLUMN: &str = "SalePrice";

/// Lowest price the generator will emit.
const PRICE_FLOOR: f64 = 10_000.0;

const NEIGHBORHOODS: [&str; 3] = ["Downtown", "Suburb", "Rural"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Standard deviation of the additive price noise (dollars).
    pub noise_sd: f64,
}

/// One generated house.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleHouse {
    pub inputs: HouseInputs,
    pub coordinate: Coordinate,
    pub location: LocationProfile,
    pub price: f64,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleHouse>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let area = Normal::<f64>::new(1500.0, 450.0).map_err(|e| AppError::new(4, format!("Area distribution error: {e}")))?;
    let basement =
        Normal::<f64>::new(1000.0, 350.0).map_err(|e| AppError::new(4, format!("Basement distribution error: {e}")))?;
    let income =
        Normal::<f64>::new(75_000.0, 20_000.0).map_err(|e| AppError::new(4, format!("Income distribution error: {e}")))?;

    let mut houses = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let garage_cars = f64::from(rng.gen_range(0..=4u8));
        let year_built = f64::from(rng.gen_range(1880..=2023u16));
        let year_remod_add = f64::from(rng.gen_range(year_built as u16..=2023u16));

        let inputs = HouseInputs {
            overall_qual: f64::from(rng.gen_range(1..=10u8)),
            gr_liv_area: area.sample(&mut rng).clamp(400.0, 5000.0).round(),
            total_bsmt_sf: basement.sample(&mut rng).clamp(0.0, 3000.0).round(),
            garage_cars,
            garage_area: (garage_cars * 250.0 + rng.gen_range(-60.0..60.0)).max(0.0).round(),
            year_built,
            year_remod_add,
            ms_zoning: pick(&mut rng),
            lot_config: pick(&mut rng),
            house_style: pick(&mut rng),
        };

        let coordinate = Coordinate::new(
            40.7128 + rng.gen_range(-0.3..0.3),
            -74.0060 + rng.gen_range(-0.3..0.3),
        );

        let bedrooms = f64::from(rng.gen_range(1..=6u8));
        let location = LocationProfile {
            neighborhood: NEIGHBORHOODS.choose(&mut rng).copied().unwrap_or("Downtown").to_string(),
            crime_rate: rng.gen_range(0.01..0.12),
            distance_to_school: rng.gen_range(0.2..8.0),
            population_density: rng.gen_range(200.0..15_000.0_f64).round(),
            median_income: income.sample(&mut rng).max(15_000.0).round(),
            num_bedrooms: bedrooms,
            num_bathrooms: f64::from(rng.gen_range(1..=4u8)).min(bedrooms),
            square_footage: inputs.gr_liv_area + (inputs.total_bsmt_sf * 0.3).round(),
        };

        let price = (price_rule(&inputs, &location) + noise.sample(&mut rng)).max(PRICE_FLOOR);
        houses.push(SampleHouse {
            inputs,
            coordinate,
            location,
            price,
        });
    }

    Ok(houses)
}

/// Noise-free price for a house.
pub fn price_rule(inputs: &HouseInputs, location: &LocationProfile) -> f64 {
    let zoning = match inputs.ms_zoning {
        MsZoning::Rl => 10_000.0,
        MsZoning::Rm => 0.0,
        MsZoning::CAll => -25_000.0,
        MsZoning::Fv => 15_000.0,
        MsZoning::Rh => -5_000.0,
    };
    let lot = match inputs.lot_config {
        LotConfig::Inside => 0.0,
        LotConfig::Corner => 3_000.0,
        LotConfig::CulDSac => 8_000.0,
        LotConfig::Fr2 => -2_000.0,
        LotConfig::Fr3 => -3_000.0,
    };
    let style = match inputs.house_style {
        HouseStyle::OneStory => 0.0,
        HouseStyle::TwoStory => 5_000.0,
        HouseStyle::OneHalfFin => -3_000.0,
        HouseStyle::OneHalfUnf => -8_000.0,
        HouseStyle::SFoyer => -5_000.0,
    };
    let neighborhood = match location.neighborhood.as_str() {
        "Downtown" => 20_000.0,
        "Suburb" => 5_000.0,
        _ => -15_000.0,
    };

    20_000.0
        + 15_000.0 * inputs.overall_qual
        + 60.0 * inputs.gr_liv_area
        + 25.0 * inputs.total_bsmt_sf
        + 8_000.0 * inputs.garage_cars
        + 20.0 * inputs.garage_area
        + 350.0 * (inputs.year_built - 1900.0)
        + 150.0 * (inputs.year_remod_add - 1900.0)
        + zoning
        + lot
        + style
        + neighborhood
        - 100_000.0 * location.crime_rate
        - 1_500.0 * location.distance_to_school
        + 0.5 * (location.median_income - 75_000.0)
}

fn pick<C: Categorical>(rng: &mut StdRng) -> C {
    let all = C::all();
    all[rng.gen_range(0..all.len())]
}

/// Column order of the generated CSV.
pub fn sample_header() -> Vec<&'static str> {
    let mut header: Vec<&'static str> = Field::FORM.iter().map(|f| f.as_str()).collect();
    header.push(Field::Latitude.as_str());
    header.push(Field::Longitude.as_str());
    header.extend([
        NEIGHBORHOOD_FIELD,
        "crime_rate",
        "distance_to_school",
        "population_density",
        "median_income",
        "num_bedrooms",
        "num_bathrooms",
        "square_footage",
        TARGET_COLUMN,
    ]);
    header
}

fn sample_row(house: &SampleHouse) -> Vec<String> {
    let mut row: Vec<String> = Field::FORM.iter().map(|f| house.inputs.display_value(*f)).collect();
    let loc = &house.location;
    row.extend([
        format!("{:.6}", house.coordinate.latitude),
        format!("{:.6}", house.coordinate.longitude),
        loc.neighborhood.clone(),
        format!("{:.4}", loc.crime_rate),
        format!("{:.3}", loc.distance_to_school),
        format!("{:.0}", loc.population_density),
        format!("{:.0}", loc.median_income),
        format!("{:.0}", loc.num_bedrooms),
        format!("{:.0}", loc.num_bathrooms),
        format!("{:.0}", loc.square_footage),
        format!("{:.2}", house.price),
    ]);
    row
}

/// Write houses as a training CSV.
pub fn write_sample_csv(path: &Path, houses: &[SampleHouse]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    writer
        .write_record(sample_header())
        .map_err(|e| AppError::new(4, format!("Failed to write sample CSV header: {e}")))?;
    for house in houses {
        writer
            .write_record(sample_row(house))
            .map_err(|e| AppError::new(4, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush sample CSV: {e}")))?;

    info!(rows = houses.len(), path = %path.display(), "sample written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_records;

    fn config(count: usize, seed: u64) -> SampleConfig {
        SampleConfig {
            count,
            seed,
            noise_sd: 15_000.0,
        }
    }

    #[test]
    fn same_seed_same_sample() {
        let a = generate_sample(&config(25, 7)).unwrap();
        let b = generate_sample(&config(25, 7)).unwrap();
        assert_eq!(a, b);
        let c = generate_sample(&config(25, 8)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn generated_inputs_are_valid() {
        for house in generate_sample(&config(200, 1)).unwrap() {
            house.inputs.validate().unwrap();
            assert!(house.coordinate.is_valid());
            assert!(house.price >= PRICE_FLOOR);
            assert!(house.inputs.year_remod_add >= house.inputs.year_built);
        }
    }

    #[test]
    fn zero_count_is_input_error() {
        assert_eq!(generate_sample(&config(0, 1)).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn price_rule_rewards_quality() {
        let loc = LocationProfile::default();
        let base = HouseInputs::default();
        let better = HouseInputs {
            overall_qual: base.overall_qual + 1.0,
            ..base.clone()
        };
        assert!((price_rule(&better, &loc) - price_rule(&base, &loc) - 15_000.0).abs() < 1e-9);
    }

    #[test]
    fn csv_round_trips_through_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("houses.csv");
        let houses = generate_sample(&config(30, 3)).unwrap();
        write_sample_csv(&path, &houses).unwrap();

        let data = load_records(&path, Some(TARGET_COLUMN)).unwrap();
        assert_eq!(data.rows_used(), 30);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.columns.len(), sample_header().len() - 1);
        assert!((data.rows[0].target.unwrap() - houses[0].price).abs() < 0.01);
    }
}
