use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geodat::GeoDatabase;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "geodat")]
#[command(
    about = "IPv4 geolocation lookups over qqzeng-style binary .dat databases",
    long_about = "geodat - Fast IPv4 geolocation lookups\n\n\
    Query a binary geo-IP .dat database (as produced by the external qqzeng \n\
    database tool) for the location/ISP record of a dotted-quad IPv4 address. \n\
    Plain files are memory-mapped; .gz files are decompressed on load.\n\n\
    Examples:\n\
      geodat query ip.dat 1.2.3.4\n\
      geodat query ip.dat 1.2.3.4 --area\n\
      geodat query ip.dat 1.2.3.4 --quiet && echo found\n\
      geodat inspect ip.dat --json"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an IPv4 address in a database
    Query {
        /// Path to the .dat database (or .dat.gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Dotted-quad IPv4 address to look up
        #[arg(value_name = "IP")]
        ip: String,

        /// Print the coarse area/country code instead of the full record
        /// (defaults to "CN" when there is no match)
        #[arg(short, long)]
        area: bool,

        /// Quiet mode - no output, only exit code (0 = found, 1 = not found)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect a database file
    Inspect {
        /// Path to the .dat database (or .dat.gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Output statistics as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            database,
            ip,
            area,
            quiet,
        } => cmd_query(&database, &ip, area, quiet),
        Commands::Inspect { database, json } => cmd_inspect(&database, json),
    }
}

fn open_database(path: &Path) -> Result<GeoDatabase> {
    GeoDatabase::open(path).with_context(|| format!("failed to load database {}", path.display()))
}

fn cmd_query(path: &Path, ip: &str, area: bool, quiet: bool) -> Result<ExitCode> {
    let db = open_database(path)?;

    if area {
        // The area contract never fails; a miss is the "CN" default.
        if !quiet {
            println!("{}", db.area(ip));
        }
        return Ok(ExitCode::SUCCESS);
    }

    match db.lookup(ip) {
        Some(record) => {
            if !quiet {
                println!("{}", record);
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            if !quiet {
                eprintln!("no match for {}", ip);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_inspect(path: &Path, json: bool) -> Result<ExitCode> {
    let db = open_database(path)?;
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();

    // Octets whose window holds a single candidate range skip binary search
    // entirely on lookup.
    let single_entry_octets = (0u8..=255)
        .filter(|&octet| {
            let (first, last) = db.prefix_window(octet);
            first == last
        })
        .count();

    if json {
        let stats = serde_json::json!({
            "path": path.display().to_string(),
            "file_size_bytes": file_size,
            "record_count": db.record_count(),
            "single_entry_octets": single_entry_octets,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Database:            {}", path.display());
        println!("File size:           {} bytes", file_size);
        println!("IP ranges:           {}", db.record_count());
        println!("Single-entry octets: {}", single_entry_octets);
    }

    Ok(ExitCode::SUCCESS)
}
