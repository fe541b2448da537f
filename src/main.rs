// dxlookup command line
//
//   dxlookup --file cty.xml call KC6RJW --at 1997-05-01T00:00:00Z
//   dxlookup --type countryfile --mapping countryfilemapping.json prefix VP8F
//   CLUBLOG_APIKEY=... dxlookup --type clublogapi call DL1ABC
//
// Without --file the dataset is downloaded into the cache directory first.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use dxlookup::config::CLUBLOG_APIKEY_ENV;
use dxlookup::fetch::resolve_dataset;
use dxlookup::{parse_utc_timestamp, LookupConfig, LookupError, LookupLib, LookupType};

#[derive(Parser)]
#[command(name = "dxlookup")]
#[command(version)]
#[command(about = "Resolve amateur radio callsigns and prefixes to DXCC entities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend: clublogxml, countryfile or clublogapi
    #[arg(long = "type", short = 't', global = true)]
    lookup_type: Option<LookupType>,

    /// Local dataset file (skips the download)
    #[arg(long, short, global = true)]
    file: Option<PathBuf>,

    /// Country name to ADIF mapping (JSON) for the countryfile backend
    #[arg(long, short, global = true)]
    mapping: Option<PathBuf>,

    /// Club Log API key
    #[arg(long, global = true, env = CLUBLOG_APIKEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// JSON config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Point in time, RFC 3339 with offset or YYYY-MM-DD (default: now)
    #[arg(long, global = true, value_parser = parse_utc_timestamp)]
    at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Entity by ADIF number
    Entity { adif: u16 },
    /// Callsign exception
    Call { callsign: String },
    /// Prefix record
    Prefix { prefix: String },
    /// Check for a blacklisted operation
    Invalid { callsign: String },
    /// CQ zone exception
    Zone { callsign: String },
}

#[derive(Serialize)]
struct InvalidAnswer<'a> {
    callsign: &'a str,
    invalid: bool,
}

#[derive(Serialize)]
struct ZoneAnswer<'a> {
    callsign: &'a str,
    cq_zone: u8,
}

fn build_config(cli: &Cli) -> dxlookup::Result<LookupConfig> {
    let mut config = match &cli.config {
        Some(path) => LookupConfig::from_json_file(path)?,
        None => LookupConfig::default(),
    }
    .with_env_overrides();

    if let Some(lookup_type) = cli.lookup_type {
        config.lookup_type = lookup_type;
    }
    if let Some(file) = &cli.file {
        config.filename = Some(file.clone());
    }
    if let Some(mapping) = &cli.mapping {
        config.country_mapping = Some(mapping.clone());
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    Ok(config)
}

fn open_library(config: &LookupConfig) -> dxlookup::Result<LookupLib> {
    let dataset = if config.lookup_type == LookupType::ClublogApi || config.filename.is_some() {
        config.filename.clone()
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to start runtime: {}", e)))?;
        runtime.block_on(resolve_dataset(config))?
    };
    LookupLib::from_config(config, dataset.as_deref())
}

fn run(cli: &Cli) -> dxlookup::Result<String> {
    let config = build_config(cli)?;
    let lib = open_library(&config)?;
    let at = cli.at.unwrap_or_else(chrono::Utc::now);

    log::debug!("Using {} backend at {}", lib.lookup_type(), at);

    let json = match &cli.command {
        Commands::Entity { adif } => serde_json::to_string_pretty(&lib.lookup_entity(*adif)?),
        Commands::Call { callsign } => {
            serde_json::to_string_pretty(&lib.lookup_callsign(callsign, at)?)
        }
        Commands::Prefix { prefix } => {
            serde_json::to_string_pretty(&lib.lookup_prefix(prefix, at)?)
        }
        Commands::Invalid { callsign } => serde_json::to_string_pretty(&InvalidAnswer {
            callsign,
            invalid: lib.is_invalid_operation(callsign, at)?,
        }),
        Commands::Zone { callsign } => serde_json::to_string_pretty(&ZoneAnswer {
            callsign,
            cq_zone: lib.lookup_zone_exception(callsign, at)?,
        }),
    }?;
    Ok(json)
}

fn main() -> ExitCode {
    // Initialize logging - default to info level for our crate
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("dxlookup=info"))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(LookupError::NoMatch) => {
            eprintln!("No match");
            ExitCode::from(1)
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
