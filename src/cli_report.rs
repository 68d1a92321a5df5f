use anyhow::{bail, Context, Result};
use clap::Parser;
use sparkify_etl::analytics::{plays_by_day, plays_by_level, plays_by_location};
use sparkify_etl::{QueryCatalog, Warehouse};
use std::path::PathBuf;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Prints the dashboard queries for a loaded warehouse.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite warehouse database file.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,

    /// Month (1-12) for the plays-per-day report. Requires --year.
    #[clap(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Year for the plays-per-day report. Requires --month.
    #[clap(long, requires = "month")]
    pub year: Option<i32>,

    /// Print the reports as JSON.
    #[clap(long)]
    pub json: bool,
}

fn label(value: Option<&str>) -> &str {
    value.unwrap_or("<unknown>")
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    if !cli_args.db_path.is_file() {
        bail!("Warehouse database not found: {:?}", cli_args.db_path);
    }

    let catalog = QueryCatalog::new()?;
    let warehouse = Warehouse::open(&cli_args.db_path)?;
    let conn = warehouse.connection();

    let by_location = plays_by_location(conn, &catalog).context("plays by location")?;
    let by_level = plays_by_level(conn, &catalog).context("plays by level")?;
    let by_day = match (cli_args.month, cli_args.year) {
        (Some(month), Some(year)) => {
            Some(plays_by_day(conn, &catalog, month, year).context("plays by day")?)
        }
        _ => None,
    };

    let counts = warehouse.counts()?;

    if cli_args.json {
        let report = serde_json::json!({
            "counts": counts,
            "plays_by_location": by_location,
            "plays_by_level": by_level,
            "plays_by_day": by_day,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Rows: {}", counts);

    println!();
    println!("Plays by location:");
    for row in &by_location {
        println!("  {:>6}  {}", row.plays, label(row.location.as_deref()));
    }

    println!();
    println!("Plays by level:");
    for row in &by_level {
        println!("  {:>6}  {}", row.plays, label(row.level.as_deref()));
    }

    if let (Some(rows), Some(month), Some(year)) = (by_day, cli_args.month, cli_args.year) {
        println!();
        println!("Plays by day, {:04}-{:02}:", year, month);
        for row in &rows {
            println!("  {:>6}  day {}", row.plays, row.day);
        }
    }

    Ok(())
}
