use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rail_extract::collect::StationLexicon;
use rail_extract::config::{ExtractConfig, RailwayPolicy, StationPolicy};
use rail_extract::domain::countries;
use rail_extract::overpass::HttpTransport;
use rail_extract::run::{Runner, parse_targets, select_countries};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Extract railway lines and stations from OpenStreetMap
struct Cli {
    /// Optional mode (`railways`, `stations` or `all`) followed by country keys
    targets: Vec<String>,

    /// Output directory
    #[clap(long, default_value = "data")]
    out: PathBuf,

    /// Include halts, stops and station buildings, naming unnamed ones after towns
    #[clap(long)]
    extended: bool,

    /// Include urban and historic track
    #[clap(long)]
    permissive: bool,

    /// Overpass endpoint; repeat to set several. Replaces the defaults.
    #[clap(long = "endpoint")]
    endpoints: Vec<String>,

    /// JSON file replacing the built-in station lexicon
    #[clap(long)]
    lexicon: Option<PathBuf>,

    /// Seconds to pause between queries
    #[clap(long)]
    delay_secs: Option<u64>,

    /// Print the country table and exit
    #[clap(long)]
    list: bool,
}

fn print_countries() {
    for country in countries() {
        println!(
            "{:<14} {:<14} {}  {:<11} {:?}",
            country.key,
            country.name,
            country.code,
            country.size.to_string(),
            country.bbox.to_array()
        );
    }
}

fn build_config(cli: &Cli) -> Result<ExtractConfig, String> {
    let mut config = ExtractConfig::new(&cli.out);

    if cli.extended {
        config = config.with_station_policy(StationPolicy::Extended);
    }
    if cli.permissive {
        config = config.with_railway_policy(RailwayPolicy::Permissive);
    }
    if let Some(secs) = cli.delay_secs {
        config = config.with_inter_query_delay(Duration::from_secs(secs));
    }
    if !cli.endpoints.is_empty() {
        let client = config.client.clone().with_endpoints(cli.endpoints.clone());
        config = config.with_client(client);
    }
    if let Some(path) = &cli.lexicon {
        let lexicon = StationLexicon::from_file(path)
            .map_err(|e| format!("Failed to load lexicon {}: {e}", path.display()))?;
        config = config.with_lexicon(lexicon);
    }

    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list {
        print_countries();
        return ExitCode::SUCCESS;
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpTransport::new(&config.user_agent, config.client.timeout) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (mode, keys) = parse_targets(&cli.targets);
    let selected = select_countries(&keys);
    println!(
        "Extracting {mode} for {} countr{} into {}",
        selected.len(),
        if selected.len() == 1 { "y" } else { "ies" },
        config.out_dir.display()
    );

    let runner = Runner::new(transport, config);
    match runner.run(mode, &selected).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write manifest: {e}");
            ExitCode::FAILURE
        }
    }
}
