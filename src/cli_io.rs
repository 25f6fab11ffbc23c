//! CSV ingestion, JSON output, and table formatting for the CLI binary.
//!
//! None of this carries algorithmic content — it only parses rows into
//! [`crate::observation::ObservationRow`] and formats
//! [`crate::pattern::PredictionResult`] rows back out, mirroring how the
//! teacher's `data_fetcher`/`output` modules stick to CSV/JSON plumbing
//! around the simulation core.

use std::path::Path;

use crate::observation::{ObservationRow, MISSING, SLOT_COUNT};
use crate::pattern::{Pattern, PredictionResult};

/// One row of a batch CSV: 14 price columns (`slot_0`..`slot_13`, empty
/// cells are "missing"), plus optional `first_buy` and `previous_pattern`
/// columns.
#[derive(Debug, Clone)]
pub struct BatchRow {
    pub observations: ObservationRow,
    pub first_buy: bool,
    pub previous_pattern: Option<Pattern>,
}

fn parse_slot(cell: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        Ok(MISSING)
    } else {
        Ok(trimmed.parse::<f64>()?)
    }
}

fn parse_previous_pattern(cell: &str) -> Option<Pattern> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(idx) = trimmed.parse::<u8>() {
        return Pattern::from_index(idx);
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "FLUCTUATING" => Some(Pattern::Fluctuating),
        "LARGE_SPIKE" => Some(Pattern::LargeSpike),
        "DECREASING" => Some(Pattern::Decreasing),
        "SMALL_SPIKE" => Some(Pattern::SmallSpike),
        _ => None,
    }
}

/// Parses a single 14-slot observation row from individual price cells,
/// used by the CLI's single-week `Analyze` subcommand when prices are
/// passed as a comma-separated flag rather than a CSV file.
pub fn parse_price_list(raw: &str) -> Result<ObservationRow, Box<dyn std::error::Error>> {
    let cells: Vec<&str> = raw.split(',').collect();
    if cells.len() != SLOT_COUNT {
        return Err(format!(
            "expected {} comma-separated price slots, got {}",
            SLOT_COUNT,
            cells.len()
        )
        .into());
    }
    let mut slots = [MISSING; SLOT_COUNT];
    for (i, cell) in cells.iter().enumerate() {
        slots[i] = parse_slot(cell)?;
    }
    Ok(ObservationRow::new(slots)?)
}

/// Loads a batch of weekly observation rows from a CSV file. Expects a
/// header row with `slot_0..slot_13` plus optional `first_buy` /
/// `previous_pattern` columns; missing cells in the price columns are
/// treated as unobserved.
pub fn load_batch_csv(path: &Path) -> Result<Vec<BatchRow>, Box<dyn std::error::Error>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();

    let slot_cols: Vec<usize> = (0..SLOT_COUNT)
        .map(|i| {
            headers
                .iter()
                .position(|h| h == format!("slot_{}", i))
                .ok_or_else(|| format!("missing column slot_{}", i))
        })
        .collect::<Result<_, String>>()?;
    let first_buy_col = headers.iter().position(|h| h == "first_buy");
    let previous_pattern_col = headers.iter().position(|h| h == "previous_pattern");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut slots = [MISSING; SLOT_COUNT];
        for (i, &col) in slot_cols.iter().enumerate() {
            slots[i] = parse_slot(&record[col])?;
        }
        let first_buy = first_buy_col
            .map(|c| record[c].trim().eq_ignore_ascii_case("true") || record[c].trim() == "1")
            .unwrap_or(false);
        let previous_pattern = previous_pattern_col.and_then(|c| parse_previous_pattern(&record[c]));

        rows.push(BatchRow {
            observations: ObservationRow::new(slots)?,
            first_buy,
            previous_pattern,
        });
    }
    Ok(rows)
}

/// Serializes one week's ranked predictions as a JSON array.
pub fn to_json(results: &[PredictionResult]) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Saves one week's ranked predictions as a JSON file.
pub fn save_json(results: &[PredictionResult], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_json(results)?)?;
    Ok(())
}

/// Renders the ranked prediction list as an aligned text table: one row per
/// scenario, pattern name, probability, category total, and the week's
/// guaranteed-minimum/max envelope.
pub fn print_table(results: &[PredictionResult]) {
    println!(
        "{:<12} {:>10} {:>10} {:>8} {:>8}",
        "PATTERN", "PROB", "CATEGORY", "WK_MIN", "WK_MAX"
    );
    for r in results {
        println!(
            "{:<12} {:>10.6} {:>10.6} {:>8} {:>8}",
            r.pattern_name,
            r.probability,
            r.category_total_probability,
            r.week_guaranteed_minimum,
            r.week_max
        );
    }
}
