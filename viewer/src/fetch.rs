//! HTTP dataset fetching.
//!
//! One GET per overlay kind against the backend REST API. The particle
//! query window travels as ordinary query parameters. Requests share an
//! agent whose global timeout sits below the poll interval, so a stalled
//! backend cannot back requests up behind the next tick.

use shared::config::ViewerConfig;
use shared::geo::BoundingBox;
use shared::kind::OverlayKind;
use shared::model::{DataError, Dataset};
use shared::wire::{IslPayload, ParticlesPayload, RegionPayload, RobotsPayload};
use thiserror::Error;
use tracing::debug;
use ureq::Agent;

/// Why one kind's fetch produced no dataset this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: DNS, connect, timeout, broken stream.
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status.
    #[error("backend returned HTTP {0}")]
    HttpStatus(u16),

    /// Body failed to decode or violated the payload contract.
    #[error("payload error: {0}")]
    Parse(String),
}

impl From<DataError> for FetchError {
    fn from(err: DataError) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// A source of overlay datasets, one fetch per kind.
///
/// Purely functional from kind to outcome; no retry, no shared state
/// across kinds. Production uses [`HttpDatasetSource`]; tests substitute
/// scripted sources.
pub trait DatasetSource: Send + Sync {
    fn fetch(&self, kind: OverlayKind) -> Result<Dataset, FetchError>;
}

/// Fetches datasets from the simulation backend over HTTP.
pub struct HttpDatasetSource {
    agent: Agent,
    base_url: String,
    bounds: BoundingBox,
}

impl HttpDatasetSource {
    pub fn new(config: &ViewerConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.fetch_timeout()))
            .build()
            .into();
        Self {
            agent,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            bounds: config.bounding_box,
        }
    }

    /// Endpoint for one kind.
    pub fn url_for(&self, kind: OverlayKind) -> String {
        match kind {
            OverlayKind::Particles => format!(
                "{}/simulation/particles?min_lon={}&max_lon={}&min_lat={}&max_lat={}",
                self.base_url,
                self.bounds.min_lon,
                self.bounds.max_lon,
                self.bounds.min_lat,
                self.bounds.max_lat
            ),
            OverlayKind::Isl => format!("{}/simulation/isl", self.base_url),
            OverlayKind::Robots => format!("{}/mission/robots_lon_lat", self.base_url),
            OverlayKind::Region => format!("{}/mission/region", self.base_url),
        }
    }
}

impl DatasetSource for HttpDatasetSource {
    fn fetch(&self, kind: OverlayKind) -> Result<Dataset, FetchError> {
        let url = self.url_for(kind);
        debug!(%kind, %url, "fetching dataset");

        let mut response = self.agent.get(&url).call().map_err(|err| match err {
            ureq::Error::StatusCode(code) => FetchError::HttpStatus(code),
            other => FetchError::Network(other.to_string()),
        })?;
        if response.status() != 200 {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let body = response.body_mut();
        let dataset = match kind {
            OverlayKind::Particles => body
                .read_json::<ParticlesPayload>()
                .map_err(parse_error)?
                .into_dataset()?,
            OverlayKind::Robots => body
                .read_json::<RobotsPayload>()
                .map_err(parse_error)?
                .into_dataset()?,
            OverlayKind::Isl => body
                .read_json::<IslPayload>()
                .map_err(parse_error)?
                .into_dataset()?,
            OverlayKind::Region => body
                .read_json::<RegionPayload>()
                .map_err(parse_error)?
                .into_dataset()?,
        };
        Ok(dataset)
    }
}

fn parse_error(err: ureq::Error) -> FetchError {
    FetchError::Parse(err.to_string())
}
