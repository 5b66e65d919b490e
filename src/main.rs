use std::path::PathBuf;

use anyhow::{Context, Result};
use aztro_chart::time::julian_day;
use aztro_chart::{compute_chart, sign_transit_aspects, BirthInput, ChartOptions, ZodiacSign};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aztro_chart", about = "Vedic natal chart calculator")]
struct Cli {
    /// TOML file with chart options (house system, ayanamsa, ...)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a natal chart
    Chart {
        /// Read the birth record from a JSON file instead of the flags below
        #[arg(long, conflicts_with_all = ["name", "date"])]
        input: Option<PathBuf>,
        #[arg(long, default_value = "")]
        name: String,
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Local birth time, HH:MM[:SS] or "unknown"
        #[arg(long, default_value = "unknown")]
        time: String,
        #[arg(long, default_value = "")]
        place: String,
        /// Latitude in degrees, north positive
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        lat: f64,
        /// Longitude in degrees, east positive
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        lon: f64,
        /// Offset of local time from UTC in minutes, east positive
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        tz: i32,
    },
    /// Aspects from a sign's ruler to the other bodies at an instant
    Transits {
        /// Zodiac sign, e.g. "leo"
        sign: String,
        /// RFC 3339 instant; defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => ChartOptions::from_toml_file(path)?,
        None => ChartOptions::default(),
    };

    let json = match cli.command {
        Commands::Chart {
            input,
            name,
            date,
            time,
            place,
            lat,
            lon,
            tz,
        } => {
            let birth = match input {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<BirthInput>(&text)
                        .with_context(|| format!("parsing birth record {}", path.display()))?
                }
                None => {
                    let date = date.context("--date or --input is required")?;
                    BirthInput::from_strings(&name, &date, &time, &place, lat, lon, tz)?
                }
            };
            let chart = compute_chart(&birth, &options)?;
            if cli.pretty {
                chart.to_json_pretty()?
            } else {
                chart.to_json()?
            }
        }
        Commands::Transits { sign, at } => {
            let sign: ZodiacSign = sign.parse()?;
            let instant = match at {
                Some(s) => DateTime::parse_from_rfc3339(&s)
                    .with_context(|| format!("parsing instant '{s}'"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let aspects = sign_transit_aspects(sign, julian_day(instant), &options)?;
            if cli.pretty {
                serde_json::to_string_pretty(&aspects)?
            } else {
                serde_json::to_string(&aspects)?
            }
        }
    };

    println!("{json}");
    Ok(())
}
