use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;

use turnip_oracle::cli_io;
use turnip_oracle::pattern::Pattern;

#[derive(Parser)]
#[command(name = "turnip-oracle", about = "Price-path inference engine for a week of in-game turnip prices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single week of observations
    Analyze {
        /// 14 comma-separated prices, empty cells are missing (e.g. "90,90,,120,,,,,,,,,,")
        #[arg(long)]
        prices: String,

        /// This is the player's first week (promotional-pattern constraint)
        #[arg(long, default_value_t = false)]
        first_buy: bool,

        /// Previous week's pattern: index 0-3 or name (FLUCTUATING, LARGE_SPIKE, DECREASING, SMALL_SPIKE)
        #[arg(long)]
        previous_pattern: Option<String>,

        /// Write the ranked predictions as JSON to this file instead of printing a table
        #[arg(long)]
        output: Option<String>,
    },

    /// Analyze a CSV of many weeks at once
    Batch {
        /// CSV file with slot_0..slot_13 columns plus optional first_buy/previous_pattern
        #[arg(long)]
        input: String,

        /// Output directory for one JSON file per input row
        #[arg(long, default_value = "output/batch")]
        output_dir: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            prices,
            first_buy,
            previous_pattern,
            output,
        } => {
            let observations = match cli_io::parse_price_list(&prices) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error parsing prices: {}", e);
                    return;
                }
            };
            let previous_pattern = previous_pattern
                .as_deref()
                .and_then(|s| {
                    s.parse::<u8>()
                        .ok()
                        .and_then(Pattern::from_index)
                        .or_else(|| match s.to_ascii_uppercase().as_str() {
                            "FLUCTUATING" => Some(Pattern::Fluctuating),
                            "LARGE_SPIKE" => Some(Pattern::LargeSpike),
                            "DECREASING" => Some(Pattern::Decreasing),
                            "SMALL_SPIKE" => Some(Pattern::SmallSpike),
                            _ => None,
                        })
                });

            println!(
                "Analyzing 14 slots (first_buy={}, previous_pattern={:?})...",
                first_buy, previous_pattern
            );
            let results = turnip_oracle::analyze_possibilities(&observations, first_buy, previous_pattern);

            match output {
                Some(path) => match cli_io::save_json(&results, &PathBuf::from(&path)) {
                    Ok(()) => println!("Saved {} scenarios to {}", results.len(), path),
                    Err(e) => eprintln!("Error saving JSON: {}", e),
                },
                None => cli_io::print_table(&results),
            }
        }

        Commands::Batch { input, output_dir } => {
            let rows = match cli_io::load_batch_csv(&PathBuf::from(&input)) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error loading {}: {}", input, e);
                    return;
                }
            };

            println!("Analyzing {} weeks from {}...", rows.len(), input);
            let bar = ProgressBar::new(rows.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap(),
            );

            let out_dir = PathBuf::from(&output_dir);
            let outcomes: Vec<Result<PathBuf, String>> = rows
                .par_iter()
                .enumerate()
                .map(|(i, row)| {
                    let results = turnip_oracle::analyze_possibilities(
                        &row.observations,
                        row.first_buy,
                        row.previous_pattern,
                    );
                    let path = out_dir.join(format!("week_{:04}.json", i));
                    let outcome = cli_io::save_json(&results, &path).map(|()| path).map_err(|e| e.to_string());
                    bar.inc(1);
                    outcome
                })
                .collect();
            bar.finish_and_clear();

            let mut failures = 0;
            for outcome in &outcomes {
                match outcome {
                    Ok(path) => println!("  {}", path.display()),
                    Err(e) => {
                        eprintln!("  Error: {}", e);
                        failures += 1;
                    }
                }
            }
            println!(
                "Wrote {}/{} weeks to {}",
                outcomes.len() - failures,
                outcomes.len(),
                output_dir
            );
        }
    }
}
