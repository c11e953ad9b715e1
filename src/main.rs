use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use placefinder::{
    FileConfig, GeocodeError, Location, Matches, PlacefinderClient, QueryOptions,
};

/// Geocode place names and coordinates through the PlaceFinder web service
///
/// Examples:
///   # Coordinates of the best match for a name
///   placefinder find "Marienplatz, München"
///
///   # Every match, reduced to woeid/city/zip/country/countrycode
///   placefinder find Berlin Bonn --all --mapped
///
///   # Reverse-geocode a coordinate pair
///   placefinder lookup 48.137 11.575
///
///   # Use a config file and an explicit app id
///   placefinder --config my-settings.toml --app-id abc123 find Hamburg
#[derive(Parser, Debug)]
#[command(name = "placefinder")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches placefinder.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Geocoding service host (e.g. where.yahooapis.com or http://localhost:8080)
    #[arg(long, env = "PLACEFINDER_HOST", global = true)]
    host: Option<String>,

    /// Application id sent with every request
    #[arg(long, env = "PLACEFINDER_APPID", global = true)]
    app_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find coordinates for one or more place names
    Find {
        /// Place names; several names are sent in one request
        #[arg(required = true)]
        names: Vec<String>,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Describe the place at a coordinate pair
    Lookup {
        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        lon: f64,

        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Print every match instead of only the best one
    #[arg(short = 'a', long)]
    all: bool,

    /// Reduce matches to woeid, city, zip, country and countrycode
    #[arg(short = 'm', long)]
    mapped: bool,

    /// Response locale (default de_DE)
    #[arg(long)]
    locale: Option<String>,

    /// Response flags (default JXTR)
    #[arg(long)]
    flags: Option<String>,

    /// Geocoding flags (default L for find, LR for lookup)
    #[arg(long)]
    gflags: Option<String>,
}

impl QueryArgs {
    fn options(&self, file_config: &FileConfig) -> QueryOptions {
        let mut options = file_config.query_options();
        if self.all {
            options = options.with_all(true);
        }
        if self.mapped {
            options = options.with_raw(false);
        }
        if let Some(ref locale) = self.locale {
            options = options.with_locale(locale);
        }
        if let Some(ref flags) = self.flags {
            options = options.with_flags(flags);
        }
        if let Some(ref gflags) = self.gflags {
            options = options.with_gflags(gflags);
        }
        options
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        FileConfig::from_path(config_path).context("Failed to load config file")?
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let mut service = file_config.service_config();
    if let Some(host) = args.host {
        service.host = host;
    }
    if let Some(app_id) = args.app_id {
        service.app_id = app_id;
    }
    if let Some(secs) = args.timeout {
        service.timeout = Duration::from_secs(secs);
    }

    if service.app_id.is_empty() {
        tracing::warn!("No app id configured; the service may reject the request");
    }

    let client =
        PlacefinderClient::new(&service).context("Failed to create geocoding client")?;
    tracing::debug!(endpoint = client.endpoint(), timeout = ?service.timeout, "client ready");

    let (label, matches) = match args.command {
        Command::Find { names, query } => {
            let label = names.join("; ");
            let options = query.options(&file_config);
            let matches = run_with_spinner(&label, || {
                client.find(location_from_names(names), options)
            })?;
            (label, matches)
        }
        Command::Lookup { lat, lon, query } => {
            let label = format!("({lat}, {lon})");
            let options = query.options(&file_config);
            let matches = run_with_spinner(&label, || client.lookup(lat, lon, options))?;
            (label, matches)
        }
    };

    if matches.is_empty() {
        bail!("No matching location found for {}", label);
    }

    let json = serde_json::to_string_pretty(&matches).context("Failed to serialize matches")?;
    println!("{json}");

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn location_from_names(mut names: Vec<String>) -> Location {
    if names.len() == 1 {
        Location::Name(names.remove(0))
    } else {
        Location::Names(names)
    }
}

fn run_with_spinner<F>(label: &str, query: F) -> Result<Matches>
where
    F: FnOnce() -> Result<Matches, GeocodeError>,
{
    let spinner = create_spinner(&format!("Geocoding {label}..."));
    let start = Instant::now();

    let matches = match query() {
        Ok(matches) => matches,
        Err(e) => {
            spinner.abandon_with_message(format!("Geocoding failed: {label}"));
            return Err(e).context("Geocoding request failed");
        }
    };

    let elapsed = start.elapsed().as_secs_f32();
    match matches.first().and_then(|place| place.coordinates()) {
        Some((lat, lon)) => spinner.finish_with_message(format!(
            "Geocoded: {} -> ({:.4}, {:.4}) [{:.1}s]",
            label, lat, lon, elapsed
        )),
        None => spinner.finish_with_message(format!(
            "Found {} match(es) for {} [{:.1}s]",
            matches.len(),
            label,
            elapsed
        )),
    }

    Ok(matches)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name_is_plain_location() {
        assert_eq!(
            location_from_names(vec!["Berlin".to_string()]),
            Location::Name("Berlin".to_string())
        );
        assert_eq!(
            location_from_names(vec!["Berlin".to_string(), "Bonn".to_string()]),
            Location::Names(vec!["Berlin".to_string(), "Bonn".to_string()])
        );
    }

    #[test]
    fn test_query_args_layer_over_file_config() {
        let file_config = FileConfig {
            locale: Some("en_US".to_string()),
            flags: Some("J".to_string()),
            ..FileConfig::default()
        };
        let args = QueryArgs {
            all: true,
            mapped: true,
            locale: None,
            flags: Some("JX".to_string()),
            gflags: None,
        };

        let options = args.options(&file_config);
        assert_eq!(options.all, Some(true));
        assert_eq!(options.raw, Some(false));
        assert_eq!(options.params.locale.as_deref(), Some("en_US"));
        assert_eq!(options.params.flags.as_deref(), Some("JX"));
        assert_eq!(options.params.gflags, None);
    }

    #[test]
    fn test_lookup_accepts_negative_coordinates() {
        let args = Args::try_parse_from(["placefinder", "lookup", "-33.8688", "151.2093"]).unwrap();
        match args.command {
            Command::Lookup { lat, lon, .. } => {
                assert!((lat + 33.8688).abs() < 1e-9);
                assert!((lon - 151.2093).abs() < 1e-9);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
