use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

/// Embedded dataset backing the comparison table on the marketing site.
const VEHICLES_CSV: &str = include_str!("../data/vehicles.csv");

/// One row of the vehicle dataset with both the raw free-text cells and
/// the numbers extracted from them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpec {
    /// Slug of make-model-year, unique within the catalog.
    pub id: String,
    pub make: String,
    pub model: String,
    pub model_year: Option<String>,
    pub engine: String,
    pub displacement: String,
    pub horsepower_text: String,
    pub horsepower: Option<f64>,
    pub top_speed_text: String,
    pub top_speed: Option<f64>,
    pub zero_to_hundred_text: String,
    pub zero_to_hundred: Option<f64>,
    pub price_text: String,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub fuel_type: String,
    pub seats_text: String,
    pub seats: Option<u32>,
    pub torque_text: String,
    pub torque: Option<f64>,
}

/// Read-only vehicle catalog parsed once at startup.
pub struct VehicleCatalog {
    specs: Vec<VehicleSpec>,
}

/// Dataset column headers, as shipped in the CSV.
const COL_MAKE: &str = "Company Names";
const COL_MODEL: &str = "Cars Names";
const COL_ENGINE: &str = "Engines";
const COL_DISPLACEMENT: &str = "CC/Battery Capacity";
const COL_HORSEPOWER: &str = "HorsePower";
const COL_TOP_SPEED: &str = "Total Speed";
const COL_ACCELERATION: &str = "Performance(0 - 100 )KM/H";
const COL_PRICE: &str = "Cars Prices";
const COL_FUEL: &str = "Fuel Types";
const COL_SEATS: &str = "Seats";
const COL_TORQUE: &str = "Torque";

impl VehicleCatalog {
    /// Parses the embedded dataset.
    pub fn from_embedded() -> anyhow::Result<Self> {
        Self::parse(VEHICLES_CSV)
    }

    /// Parses a CSV dataset with the standard column headers. Rows shorter
    /// than the header are skipped rather than failing the whole catalog.
    pub fn parse(csv_text: &str) -> anyhow::Result<Self> {
        let numeric_re = Regex::new(r"-?\d+(?:\.\d+)?")?;
        let year_re = Regex::new(r"(19|20)\d{2}")?;
        let digits_re = Regex::new(r"\d+")?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let idx_make = column(COL_MAKE);
        let idx_model = column(COL_MODEL);
        let idx_engine = column(COL_ENGINE);
        let idx_displacement = column(COL_DISPLACEMENT);
        let idx_horsepower = column(COL_HORSEPOWER);
        let idx_top_speed = column(COL_TOP_SPEED);
        let idx_acceleration = column(COL_ACCELERATION);
        let idx_price = column(COL_PRICE);
        let idx_fuel = column(COL_FUEL);
        let idx_seats = column(COL_SEATS);
        let idx_torque = column(COL_TORQUE);

        // Explicit counter state, scoped to this parse, keeps slug ids
        // unique across duplicate make/model/year rows.
        let mut id_counts: HashMap<String, u32> = HashMap::new();
        let mut specs = Vec::new();

        for record in reader.records() {
            let record = record?;
            if record.len() < headers.len() {
                tracing::debug!("Skipping short dataset row: {:?}", record);
                continue;
            }

            let cell = |idx: Option<usize>| -> String {
                idx.and_then(|i| record.get(i))
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            };

            let make = non_empty_or(cell(idx_make), "Unknown");
            let model = non_empty_or(cell(idx_model), "Unknown");
            let model_year = year_re.find(&model).map(|m| m.as_str().to_string());

            let horsepower_text = cell(idx_horsepower);
            let top_speed_text = cell(idx_top_speed);
            let zero_to_hundred_text = cell(idx_acceleration);
            let torque_text = cell(idx_torque);
            let price_text = cell(idx_price);
            let seats_text = cell(idx_seats);

            let (price_min, price_max) = parse_price_range(&numeric_re, &price_text);

            let base_id = slug_id(&make, &model, model_year.as_deref());
            let id = ensure_unique_id(&mut id_counts, base_id);

            specs.push(VehicleSpec {
                id,
                horsepower: mean_of_numbers(&numeric_re, &horsepower_text),
                top_speed: mean_of_numbers(&numeric_re, &top_speed_text),
                zero_to_hundred: mean_of_numbers(&numeric_re, &zero_to_hundred_text),
                torque: mean_of_numbers(&numeric_re, &torque_text),
                seats: sum_of_digits(&digits_re, &seats_text),
                price_min,
                price_max,
                make,
                model,
                model_year,
                engine: cell(idx_engine),
                displacement: cell(idx_displacement),
                horsepower_text,
                top_speed_text,
                zero_to_hundred_text,
                price_text,
                fuel_type: cell(idx_fuel),
                seats_text,
                torque_text,
            });
        }

        tracing::info!("Vehicle catalog loaded: {} specs", specs.len());
        Ok(Self { specs })
    }

    pub fn all(&self) -> &[VehicleSpec] {
        &self.specs
    }

    /// Distinct makes, sorted.
    pub fn makes(&self) -> Vec<String> {
        let mut makes: Vec<String> = self.specs.iter().map(|s| s.make.clone()).collect();
        makes.sort();
        makes.dedup();
        makes
    }

    /// All specs for a make, sorted by model.
    pub fn by_make(&self, make: &str) -> Vec<&VehicleSpec> {
        let mut specs: Vec<&VehicleSpec> =
            self.specs.iter().filter(|s| s.make == make).collect();
        specs.sort_by(|a, b| a.model.cmp(&b.model));
        specs
    }

    pub fn by_id(&self, id: &str) -> Option<&VehicleSpec> {
        self.specs.iter().find(|s| s.id == id)
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Mean of every number found in a free-text cell ("153 - 197 hp" -> 175).
fn mean_of_numbers(numeric_re: &Regex, text: &str) -> Option<f64> {
    let numbers: Vec<f64> = numeric_re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if numbers.is_empty() {
        None
    } else {
        Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
    }
}

/// Min and max of the numbers in a price cell; a single number is both.
fn parse_price_range(numeric_re: &Regex, text: &str) -> (Option<f64>, Option<f64>) {
    let numbers: Vec<f64> = numeric_re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if numbers.is_empty() {
        (None, None)
    } else {
        (Some(min), Some(max))
    }
}

/// Total seats across configurations ("5+2" -> 7).
fn sum_of_digits(digits_re: &Regex, text: &str) -> Option<u32> {
    let total: u32 = digits_re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .sum();

    if total == 0 {
        None
    } else {
        Some(total)
    }
}

fn slug_id(make: &str, model: &str, model_year: Option<&str>) -> String {
    // The year is extracted from the model text, so appending it verbatim
    // would double it ("toyota-rav4-2024-2024"). Only append when the model
    // does not already carry it.
    let year = model_year.filter(|y| !model.contains(y));
    let joined = [Some(make), Some(model), year]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("-");

    let mut slug = String::with_capacity(joined.len());
    let mut last_dash = true;
    for c in joined.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn ensure_unique_id(id_counts: &mut HashMap<String, u32>, base_id: String) -> String {
    let count = id_counts.entry(base_id.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base_id
    } else {
        tracing::warn!("Duplicate vehicle id base: {} -> {}-{}", base_id, base_id, count);
        format!("{}-{}", base_id, count)
    }
}
