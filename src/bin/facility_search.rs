use clap::Parser;
use eyecare_scout::adapters::{NominatimClient, OverpassClient};
use eyecare_scout::domain::model::SearchFilters;
use eyecare_scout::utils::{logger, validation::Validate};
use eyecare_scout::{FacilityAggregator, FacilityCatalog, ServiceConfig};

#[derive(Parser)]
#[command(name = "facility-search")]
#[command(about = "Search eye-care facilities from the command line and print them as JSON")]
struct Args {
    /// City or address to search around (e.g. "Lagos, Nigeria")
    location: String,

    /// Search radius in meters for the structured search
    #[arg(short, long)]
    radius: Option<u32>,

    /// Only keep facilities of this type (e.g. hospital, clinic)
    #[arg(short = 't', long = "type")]
    facility_type: Option<String>,

    /// Minimum rating (facilities without a rating are dropped)
    #[arg(long)]
    min_rating: Option<f64>,

    /// Maximum number of facilities to print (1-100)
    #[arg(short, long)]
    limit: Option<i64>,

    /// Path to TOML configuration file (auto-discovered when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => ServiceConfig::from_file(path),
        None => ServiceConfig::discover(),
    };

    // 初始化日誌
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    logger::init_logger(&logging, args.verbose);

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.apply_env_overrides().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let providers = &config.providers;
    let aggregator = FacilityAggregator::new(
        NominatimClient::new(providers.nominatim.clone(), &providers.user_agent)?,
        OverpassClient::new(providers.overpass.clone(), &providers.user_agent)?,
        FacilityCatalog::builtin(),
        config.search.clone(),
    );

    let filters = SearchFilters {
        location: args.location.trim().to_string(),
        radius: args.radius,
        facility_type: args.facility_type,
        min_rating: args.min_rating,
        limit: args.limit.map(SearchFilters::clamp_limit),
    };

    tracing::info!("🔍 Searching facilities near {}", filters.location);
    let facilities = aggregator.search(&filters).await;
    tracing::info!("✅ Found {} facilities", facilities.len());

    println!("{}", serde_json::to_string_pretty(&facilities)?);
    Ok(())
}
