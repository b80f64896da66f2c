use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use terra_dart::sampler;
use terra_dart::target::{
    Coordinate, FallbackCatalog, HabitabilityResolver, NominatimReverse, TargetSelector,
    DEFAULT_MAX_ATTEMPTS,
};

/// Terra Dart — weighted random target selection for the inhabited world.
///
/// Throws a dart at the map, biased toward latitudes people actually live in,
/// and keeps throwing until reverse geocoding confirms a named, land-based
/// place. Falls back to a curated catalog when the globe refuses to cooperate.
///
/// Examples:
///   terradart
///   terradart --count 3 --attempts 15
///   terradart --seed 42 --offline
///   terradart --lat 64.1466 --lon -21.9426
///   terradart --serve --port 8080
#[derive(Parser)]
#[command(name = "terradart", version, about, long_about = None)]
struct Cli {
    /// Number of targets to select.
    #[arg(long, short = 'n', default_value_t = 1)]
    count: u32,

    /// Attempt ceiling before falling back to the catalog.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,

    /// Seed the random source for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Offline mode: skip the geocoding oracle, pick from the catalog.
    #[arg(long)]
    offline: bool,

    /// Classify this latitude instead of selecting. Requires --lon.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Classify this longitude instead of selecting. Requires --lat.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Fallback catalog file (JSON array of {name, lat, lon}).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Country labeled with its administrative area instead of a country
    /// suffix (e.g. "Springfield, Illinois").
    #[arg(long)]
    home_country: Option<String>,

    /// Sample 10,000 latitudes offline and print the band distribution.
    #[arg(long)]
    debug_bands: bool,

    /// Run the HTTP server.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server bind port.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();

    if cli.attempts == 0 {
        eprintln!("Error: --attempts must be positive.");
        std::process::exit(1);
    }
    if cli.count == 0 {
        eprintln!("Error: --count must be positive.");
        std::process::exit(1);
    }
    if cli.lat.is_some() != cli.lon.is_some() {
        eprintln!("Error: --lat and --lon must be given together.");
        std::process::exit(1);
    }

    // ── Assemble the selector ───────────────────────────────────

    let catalog = FallbackCatalog::load(cli.catalog.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let resolver = match &cli.home_country {
        Some(home) => HabitabilityResolver::with_home_country(home),
        None => HabitabilityResolver::new(),
    };

    let selector = TargetSelector::new(NominatimReverse::new(), resolver, catalog)
        .with_max_attempts(cli.attempts);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // ── Band distribution probe ─────────────────────────────────

    if cli.debug_bands {
        let dist = sampler::band_distribution(&mut rng, 10_000);
        eprintln!("  Latitude band distribution over 10000 samples:");
        eprintln!("    temperate [-40, 60]:     {:5.1}%", dist.temperate * 100.0);
        eprintln!("    tropical  [-23.5, 23.5]: {:5.1}%", dist.tropical * 100.0);
        eprintln!("    outside temperate:       {:5.1}%", dist.outside * 100.0);
        return;
    }

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(terra_dart::server::start(selector, &cli.host, cli.port));
        return;
    }

    // ── Classification mode ─────────────────────────────────────

    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        if !Coordinate::in_range(lat, lon) {
            eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
            std::process::exit(1);
        }
        let coordinate = Coordinate::new(lat, lon);
        match selector.resolve(coordinate) {
            Some(name) => {
                eprintln!("  \u{1F4CD} {} \u{2014} {}", name, coordinate);
                let body = serde_json::json!({ "name": name, "lat": lat, "lon": lon });
                println!("{}", serde_json::to_string_pretty(&body).unwrap());
            }
            None => {
                eprintln!("  No habitable place at {}", coordinate);
                std::process::exit(2);
            }
        }
        return;
    }

    // ── Selection runs ──────────────────────────────────────────

    let mut picks = Vec::with_capacity(cli.count as usize);
    for _ in 0..cli.count {
        let target = if cli.offline {
            selector.fallback(&mut rng)
        } else {
            selector.select(&mut rng)
        };
        eprintln!(
            "  \u{1F4CD} {} \u{2014} {} [{}]",
            target.name, target.coordinate, target.source
        );
        picks.push(target);
    }

    if picks.len() == 1 {
        println!("{}", serde_json::to_string_pretty(&picks[0]).unwrap());
    } else {
        println!("{}", serde_json::to_string_pretty(&picks).unwrap());
    }
}
