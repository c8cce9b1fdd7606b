//! Backend wire formats.
//!
//! The backend serves each overlay dataset as a small JSON document built
//! from numeric arrays. The payload types here mirror those documents
//! exactly; `into_dataset` converts them into the parsed model, rejecting
//! payloads whose arrays disagree with the contract.

use crate::geo::LonLat;
use crate::kind::OverlayKind;
use crate::model::{DataError, Dataset, IslMarker, RegionShape, RobotState};
use serde::Deserialize;
use serde_json::Value;

/// `GET /simulation/particles` response: two parallel arrays, longitudes
/// then latitudes.
#[derive(Debug, Clone, Deserialize)]
pub struct ParticlesPayload {
    pub particles: Vec<Vec<f64>>,
}

impl ParticlesPayload {
    pub fn into_dataset(self) -> Result<Dataset, DataError> {
        // An empty document means an empty cloud, not a malformed one.
        if self.particles.is_empty() {
            return Ok(Dataset::Particles(Vec::new()));
        }
        if self.particles.len() != 2 {
            return Err(DataError::ShapeMismatch {
                kind: OverlayKind::Particles,
                detail: format!(
                    "expected [lon, lat] parallel arrays, got {} rows",
                    self.particles.len()
                ),
            });
        }
        let (lons, lats) = (&self.particles[0], &self.particles[1]);
        if lons.len() != lats.len() {
            return Err(DataError::ShapeMismatch {
                kind: OverlayKind::Particles,
                detail: format!("{} longitudes vs {} latitudes", lons.len(), lats.len()),
            });
        }
        let points = lons
            .iter()
            .zip(lats.iter())
            .map(|(&lon, &lat)| LonLat::new(lon, lat))
            .collect();
        Ok(Dataset::Particles(points))
    }
}

/// `GET /mission/robots_lon_lat` response: positions and headings as
/// parallel arrays indexed by robot.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotsPayload {
    pub robots_lon_lat: Vec<(f64, f64)>,
    pub robots_heading: Vec<f64>,
}

impl RobotsPayload {
    pub fn into_dataset(self) -> Result<Dataset, DataError> {
        if self.robots_lon_lat.len() != self.robots_heading.len() {
            return Err(DataError::ShapeMismatch {
                kind: OverlayKind::Robots,
                detail: format!(
                    "{} positions vs {} headings",
                    self.robots_lon_lat.len(),
                    self.robots_heading.len()
                ),
            });
        }
        let robots = self
            .robots_lon_lat
            .into_iter()
            .zip(self.robots_heading)
            .map(|((lon, lat), heading)| RobotState::new(LonLat::new(lon, lat), heading))
            .collect();
        Ok(Dataset::Robots(robots))
    }
}

/// `GET /simulation/isl` response: one `[lon, lat, label]` record per
/// marker. The label element is numeric in practice but string labels are
/// accepted too.
#[derive(Debug, Clone, Deserialize)]
pub struct IslPayload {
    pub isl: Vec<Value>,
}

impl IslPayload {
    pub fn into_dataset(self) -> Result<Dataset, DataError> {
        let mut markers = Vec::with_capacity(self.isl.len());
        for (index, record) in self.isl.iter().enumerate() {
            markers.push(decode_isl_record(index, record)?);
        }
        Ok(Dataset::Isl(markers))
    }
}

fn decode_isl_record(index: usize, record: &Value) -> Result<IslMarker, DataError> {
    let mismatch = |detail: String| DataError::ShapeMismatch {
        kind: OverlayKind::Isl,
        detail,
    };
    let fields = record
        .as_array()
        .ok_or_else(|| mismatch(format!("record {index} is not an array")))?;
    if fields.len() < 2 {
        return Err(mismatch(format!(
            "record {index} has {} fields, expected [lon, lat, label]",
            fields.len()
        )));
    }
    let lon = fields[0]
        .as_f64()
        .ok_or_else(|| mismatch(format!("record {index} longitude is not a number")))?;
    let lat = fields[1]
        .as_f64()
        .ok_or_else(|| mismatch(format!("record {index} latitude is not a number")))?;
    let label = match fields.get(2) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    Ok(IslMarker::new(LonLat::new(lon, lat), label))
}

/// `GET /mission/region` response. `innerRegions` is omitted by older
/// backends and defaults to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionPayload {
    pub region: Vec<(f64, f64)>,
    #[serde(default, rename = "innerRegions")]
    pub inner_regions: Vec<Vec<(f64, f64)>>,
}

impl RegionPayload {
    pub fn into_dataset(self) -> Result<Dataset, DataError> {
        let to_ring = |ring: Vec<(f64, f64)>| -> Vec<LonLat> {
            ring.into_iter()
                .map(|(lon, lat)| LonLat::new(lon, lat))
                .collect()
        };
        let outer = to_ring(self.region);
        let inner = self.inner_regions.into_iter().map(to_ring).collect();
        Ok(Dataset::Region(RegionShape::new(outer, inner)))
    }
}
