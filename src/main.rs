use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lawn_estimator::{
    analyze, BoundingBox, EstimateRequest, GeoPoint, Location, ScaleModel, Settings,
    VegetationClassifier,
};
use tracing_subscriber::EnvFilter;

/// Estimate lawn area from aerial imagery.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a local image whose ground scale is already known.
    Classify {
        /// PNG or JPEG image path.
        image: PathBuf,

        /// Ground distance covered by one pixel of the image.
        #[arg(long)]
        meters_per_pixel: f64,
    },

    /// Fetch Bing aerial imagery for a location and estimate its lawn area.
    Estimate {
        /// Address to geocode (ignored for positioning when --lat/--lng are given).
        #[arg(long)]
        address: Option<String>,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long)]
        zoom: Option<f64>,

        #[arg(long)]
        width: Option<i64>,

        #[arg(long)]
        height: Option<i64>,

        /// Explicit extent as "NORTH,SOUTH,EAST,WEST"; overrides zoom.
        #[arg(long, value_name = "N,S,E,W", allow_hyphen_values = true)]
        bounds: Option<String>,
    },
}

fn parse_bounds(text: &str) -> anyhow::Result<BoundingBox> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid bounds: {}", text))?;

    match values.as_slice() {
        [north, south, east, west] => Ok(BoundingBox::new(*north, *south, *east, *west)),
        _ => anyhow::bail!("bounds need four values, got {}", values.len()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let settings = Settings::load().context("failed to load settings")?;

    match args.command {
        Command::Classify { image, meters_per_pixel } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let scale = ScaleModel { meters_per_pixel, latitude_corrected: false };

            let analysis = analyze(
                &bytes,
                None,
                scale,
                &VegetationClassifier::new(settings.thresholds),
                settings.working_resolution,
            )?;

            let dims = analysis.dimensions;
            println!("Image: {} (classified at {}x{})", image.display(), dims.width, dims.height);
            println!(
                "Vegetation pixels: {} / {}",
                analysis.classification.classified_count, analysis.classification.total_count
            );
            println!("Coverage: {}%", analysis.area.coverage_pct);
            println!("Lawn area: {} sq ft ({} sq m)", analysis.area.square_feet, analysis.area.square_meters);
        }
        Command::Estimate { address, lat, lng, zoom, width, height, bounds } => {
            let location = match (lat, lng, address) {
                (Some(lat), Some(lng), address) => Location::Coordinates {
                    point: GeoPoint::new(lat, lng)?,
                    address,
                },
                (_, _, Some(address)) => Location::Address(address),
                _ => anyhow::bail!("pass --address or --lat/--lng"),
            };
            let request = EstimateRequest {
                location,
                zoom,
                map_width: width,
                map_height: height,
                map_bounds: bounds.as_deref().map(parse_bounds).transpose()?,
            };

            let result = settings.bing_pipeline()?.estimate(request).await?;

            println!("Address: {}", result.address.as_deref().unwrap_or("-"));
            if let Some(zoom) = result.zoom {
                println!("Zoom: {}", zoom);
            }
            println!("Coverage: {}%", result.lawn_coverage_pct);
            println!("Lawn area: {} sq ft ({} sq m)", result.square_feet, result.square_meters);
            println!("Image: {}", result.image_reference);
        }
    }

    Ok(())
}
