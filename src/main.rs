//! Calculate annual emissions for a directory of CSV tables.

use std::path::PathBuf;

use annual_emissions::schema::emissions;
use annual_emissions::{
    load_data_from_directory, logging, records_to_frame, write_csv, CalculatorConfig, DataSet,
    EmissionSummary, EmissionsCalculator, Row,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

/// Command-line overrides; unset flags fall back to `EMISSIONS_*` variables.
#[derive(Parser, Debug)]
#[command(name = "calculate-emissions", about = "Annual emissions calculator")]
struct Args {
    /// Directory containing the input CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output CSV path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// File stem of the operation data table.
    #[arg(long)]
    operations_table: Option<String>,

    /// Calendar year used for current-year fuel factors.
    #[arg(long)]
    current_year: Option<i32>,
}

const PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let mut config = CalculatorConfig::from_env()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if let Some(table) = args.operations_table {
        config.operations_table = table;
    }
    if args.current_year.is_some() {
        config.current_year = args.current_year;
    }

    info!("Loading CSV files from: {}", config.data_dir.display());
    let frames = load_data_from_directory(&config.data_dir)
        .with_context(|| format!("loading {}", config.data_dir.display()))?;
    info!("Loaded {} data files", frames.len());

    let data = DataSet::from_frames(frames, &config.operations_table)
        .context("Please ensure all required CSV files are in the data directory")?;

    let mut calculator = EmissionsCalculator::new(data.references);
    if let Some(year) = config.current_year {
        calculator = calculator.with_current_year(year);
    }

    let records = calculator.calculate_records(&data.operations)?;
    let mut table = records_to_frame(&records)?;
    write_csv(&mut table, &config.output_file)
        .with_context(|| format!("writing {}", config.output_file.display()))?;

    let summary = EmissionSummary::from_records(&records);
    println!("Calculation Summary");
    println!("Total operations processed: {}", summary.operations);
    println!("Total emissions (kg CO2e): {:.2}", summary.total_emissions);
    println!();
    println!("Results preview:");
    for row in Row::from_frame(&table.head(Some(PREVIEW_ROWS)))? {
        let cells: Vec<String> = row
            .iter()
            .map(|(name, value)| match value.to_number() {
                Some(v) if name != emissions::OPERATION_ID => {
                    format!("{name}={v:.2}")
                }
                _ => format!("{name}={value}"),
            })
            .collect();
        println!("  {}", cells.join(", "));
    }

    Ok(())
}
