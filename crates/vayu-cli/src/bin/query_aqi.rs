//! CLI tool to query the air-quality server for a point.

use clap::Parser;
use vayu_cli::VayuClient;

/// Query current AQI, forecast, and source breakdown for a coordinate
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Vayu server URL
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Latitude (default: central Delhi)
    #[arg(long, default_value_t = 28.6139)]
    lat: f64,

    /// Longitude (default: central Delhi)
    #[arg(long, default_value_t = 77.2090)]
    lng: f64,

    /// Also print the 48/72 hour forecast
    #[arg(long)]
    forecast: bool,

    /// Also print the source attribution breakdown
    #[arg(long)]
    sources: bool,

    /// Also print the seasonal outlook for the airshed
    #[arg(long)]
    seasonal: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = VayuClient::new(&args.url);

    let current = client.current_aqi(args.lat, args.lng)?;
    println!(
        "AQI at {}: {:.0} ({})",
        current["location"]["name"].as_str().unwrap_or("?"),
        current["aqi"].as_f64().unwrap_or(0.0),
        current["category"].as_str().unwrap_or("?")
    );
    if current["degraded"].as_bool() == Some(true) {
        println!("  (degraded estimate: no stations within the search radius)");
    }
    if current["stale"].as_bool() == Some(true) {
        println!("  (warning: station data is stale)");
    }

    if args.forecast {
        let forecast = client.forecast(args.lat, args.lng)?;
        println!(
            "Forecast: 48h {:.0}, 72h {:.0}, trend {}, confidence {:.0}%",
            forecast["aqi_48h"].as_f64().unwrap_or(0.0),
            forecast["aqi_72h"].as_f64().unwrap_or(0.0),
            forecast["trend"].as_str().unwrap_or("?"),
            forecast["confidence"].as_f64().unwrap_or(0.0)
        );
    }

    if args.sources {
        let sources = client.sources(args.lat, args.lng)?;
        println!(
            "Dominant source: {}",
            sources["dominant_source"].as_str().unwrap_or("?")
        );
        for key in ["traffic", "industry", "stubble_burning", "construction"] {
            println!(
                "  {:16} {:5.1}%",
                key,
                sources["contributions"][key].as_f64().unwrap_or(0.0)
            );
        }
    }

    if args.seasonal {
        let outlook = client.seasonal_outlook()?;
        println!(
            "Seasonal outlook ({}): {}",
            outlook["current_month_name"].as_str().unwrap_or("?"),
            outlook["current_outlook"].as_str().unwrap_or("?")
        );
        if let Some(months) = outlook["high_risk_months"].as_array() {
            let names: Vec<&str> = months.iter().filter_map(|m| m.as_str()).collect();
            println!("  High-risk months: {}", names.join(", "));
        }
    }

    Ok(())
}
