//! Render one time slice of the marine feed and print the map scene as JSON.
//!
//! Usage: `render_map [--config PATH] [--slice N] [--layers ocean,bio,...] [DATA_DIR]`
//!
//! Reads feed files from `feed.data_dir`, or fetches them from `feed.base_url`
//! when the binary is built with the `http-feed` feature. Set `RUST_LOG=info`
//! to see load and validation messages.

use anyhow::{bail, Context, Result};
use log::{info, log, warn};
use std::path::PathBuf;

use marine_map::core::layers::{LayerName, LayerState};
use marine_map::io::{CachedPointSource, SourceFactory};
use marine_map::preprocessing::PointValidator;
use marine_map::{MapConfig, MapPageController, MapView};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    slice: usize,
    layers: Option<LayerState>,
    data_dir: Option<PathBuf>,
}

fn parse_layers(list: &str) -> Result<LayerState> {
    let layers = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<LayerName>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --layers value '{}'", list))?;
    Ok(LayerState::only(&layers))
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--slice" => {
                let value = iter.next().context("--slice requires an index")?;
                args.slice = value
                    .parse()
                    .with_context(|| format!("Invalid slice index '{}'", value))?;
            }
            "--layers" => {
                let value = iter.next().context("--layers requires a list")?;
                args.layers = Some(parse_layers(&value)?);
            }
            "-h" | "--help" => {
                println!("Usage: render_map [--config PATH] [--slice N] [--layers ocean,bio,...] [DATA_DIR]");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("Unknown option '{}'", other),
            other => args.data_dir = Some(PathBuf::from(other)),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => MapConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MapConfig::from_default_location().unwrap_or_else(|e| {
            warn!("No usable config file ({}), using defaults", e);
            MapConfig::default()
        }),
    };
    if let Some(data_dir) = args.data_dir {
        config.feed.data_dir = data_dir;
    }
    if let Some(layers) = args.layers {
        config.layers = layers;
    }

    let upstream = SourceFactory::create(&config.feed)?;
    let source = CachedPointSource::new(upstream, config.feed.policy());
    let mut controller = MapPageController::new(&config)?;
    controller.load_slice(&source, args.slice).await?;

    let validation = PointValidator::validate_points(controller.points());
    info!(
        "{} points, {} species, {} with alerts",
        validation.stats.total_points, validation.stats.species_count, validation.stats.points_with_alerts
    );
    for (level, message) in validation.issues() {
        log!(level, "{}", message);
    }

    let scene = match controller.view() {
        MapView::Ready(scene) => scene,
        MapView::Loading { .. } => bail!("Slice {} did not finish loading", args.slice),
    };
    let json = serde_json::to_string_pretty(&scene).context("Failed to serialize scene")?;
    println!("{}", json);
    Ok(())
}
