//! Live overlay viewer for swarm patrol missions.
//!
//! Polls the simulation backend for particle, robot, ISL and region
//! overlays and renders them to the terminal.

use anyhow::Result;
use clap::Parser;
use overlay::MissionView;
use shared::config::ViewerConfig;
use shared::kind::OverlayKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use viewer::ascii::AsciiSurface;
use viewer::fetch::HttpDatasetSource;
use viewer::sync::SyncLoop;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Live overlay viewer for swarm patrol missions"
)]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:5000
    #[arg(short = 'u', long)]
    backend_url: Option<String>,

    /// Poll period in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Particle window minimum longitude
    #[arg(long)]
    min_lon: Option<f64>,

    /// Particle window maximum longitude
    #[arg(long)]
    max_lon: Option<f64>,

    /// Particle window minimum latitude
    #[arg(long)]
    min_lat: Option<f64>,

    /// Particle window maximum latitude
    #[arg(long)]
    max_lat: Option<f64>,

    /// Viewer config file (defaults to ~/.patrol_viewer/viewer.json)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Poll only the simulation overlays (no mission configured)
    #[arg(long)]
    no_mission: bool,

    /// Density map width in characters
    #[arg(long, default_value = "64")]
    map_width: usize,

    /// Density map height in characters
    #[arg(long, default_value = "20")]
    map_height: usize,
}

impl Args {
    fn merge_into(&self, config: &mut ViewerConfig) {
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
        if let Some(timeout) = self.fetch_timeout_ms {
            config.fetch_timeout_ms = timeout;
        }
        if let Some(min_lon) = self.min_lon {
            config.bounding_box.min_lon = min_lon;
        }
        if let Some(max_lon) = self.max_lon {
            config.bounding_box.max_lon = max_lon;
        }
        if let Some(min_lat) = self.min_lat {
            config.bounding_box.min_lat = min_lat;
        }
        if let Some(max_lat) = self.max_lat {
            config.bounding_box.max_lat = max_lat;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::load_or_default()?,
    };
    args.merge_into(&mut config);
    config.validate()?;

    info!("Starting patrol viewer");
    info!("  Backend: {}", config.backend_url);
    info!("  Poll interval: {} ms", config.poll_interval_ms);
    info!("  Fetch timeout: {} ms", config.fetch_timeout_ms);
    info!(
        "  Window: lon {}..{}, lat {}..{}",
        config.bounding_box.min_lon,
        config.bounding_box.max_lon,
        config.bounding_box.min_lat,
        config.bounding_box.max_lat
    );

    let source = Arc::new(HttpDatasetSource::new(&config));
    let surface = AsciiSurface::new(config.bounding_box, args.map_width, args.map_height);
    let view = MissionView::new(surface);

    let kinds = if args.no_mission {
        info!("  Mission overlays disabled, polling simulation only");
        OverlayKind::SIMULATION_ONLY.to_vec()
    } else {
        OverlayKind::ALL.to_vec()
    };

    let sync = SyncLoop::with_kinds(source, view, config.poll_interval(), kinds);
    sync.run().await;
    Ok(())
}
