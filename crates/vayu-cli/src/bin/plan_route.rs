//! CLI tool to request a pollution-aware route from the server.

use clap::Parser;
use vayu_cli::VayuClient;
use vayu_core::Coordinate;

/// Plan a pollution-aware route between two coordinates
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Vayu server URL
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Start latitude
    #[arg(long)]
    from_lat: f64,

    /// Start longitude
    #[arg(long)]
    from_lng: f64,

    /// End latitude
    #[arg(long)]
    to_lat: f64,

    /// End longitude
    #[arg(long)]
    to_lng: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    for (label, lat, lng) in [
        ("start", args.from_lat, args.from_lng),
        ("end", args.to_lat, args.to_lng),
    ] {
        if !Coordinate::new(lat, lng).is_valid() {
            anyhow::bail!("{label} coordinate ({lat}, {lng}) is not a valid lat/lng");
        }
    }

    let client = VayuClient::new(&args.url);
    let route = client.plan_route((args.from_lat, args.from_lng), (args.to_lat, args.to_lng))?;

    println!(
        "Route: {:.1} km, avg AQI {:.0} ({})",
        route["distance"].as_f64().unwrap_or(0.0),
        route["avg_aqi"].as_f64().unwrap_or(0.0),
        route["quality"].as_str().unwrap_or("?")
    );
    if let Some(waypoints) = route["waypoints"].as_array() {
        for (index, point) in waypoints.iter().enumerate() {
            println!(
                "  {:2}. ({:.4}, {:.4})",
                index + 1,
                point[0].as_f64().unwrap_or(0.0),
                point[1].as_f64().unwrap_or(0.0)
            );
        }
    }
    if route["stale"].as_bool() == Some(true) {
        println!("  (warning: station data is stale)");
    }

    Ok(())
}
