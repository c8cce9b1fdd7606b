//! Parsed overlay datasets and their validation errors.

use crate::geo::LonLat;
use crate::kind::OverlayKind;
use thiserror::Error;

/// Data-contract violations found while decoding or applying a payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A single entity in a feed carries unusable data (e.g. a non-finite
    /// coordinate). The entity is skipped; the rest of the feed still applies.
    #[error("malformed {kind} entity at index {index}")]
    MalformedEntity { kind: OverlayKind, index: usize },

    /// The payload as a whole does not match the backend contract. The
    /// dataset is rejected for this poll cycle.
    #[error("{kind} payload shape mismatch: {detail}")]
    ShapeMismatch { kind: OverlayKind, detail: String },
}

/// One robot in the mission feed. Identity is the positional index.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    pub position: LonLat,
    /// Heading in degrees
    pub heading_deg: f64,
}

impl RobotState {
    pub fn new(position: LonLat, heading_deg: f64) -> Self {
        Self {
            position,
            heading_deg,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.heading_deg.is_finite()
    }
}

/// A labeled inter-satellite-link point of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct IslMarker {
    pub position: LonLat,
    pub label: String,
}

impl IslMarker {
    pub fn new(position: LonLat, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
    }
}

/// Mission region polygon: one outer ring plus zero or more inner rings.
///
/// The backend guarantees a closed, non-self-intersecting outer ring; that is
/// not re-checked here. What is checked is that every vertex is finite and
/// the outer ring has enough vertices to close a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub outer: Vec<LonLat>,
    pub inner: Vec<Vec<LonLat>>,
}

impl RegionShape {
    pub fn new(outer: Vec<LonLat>, inner: Vec<Vec<LonLat>>) -> Self {
        Self { outer, inner }
    }

    /// Reject geometries that cannot be drawn as a polygon.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.outer.len() < 4 {
            return Err(DataError::ShapeMismatch {
                kind: OverlayKind::Region,
                detail: format!(
                    "outer ring has {} vertices, need at least 4 for a closed ring",
                    self.outer.len()
                ),
            });
        }
        let all_rings = std::iter::once(&self.outer).chain(self.inner.iter());
        for ring in all_rings {
            if let Some(index) = ring.iter().position(|v| !v.is_finite()) {
                return Err(DataError::MalformedEntity {
                    kind: OverlayKind::Region,
                    index,
                });
            }
        }
        Ok(())
    }

    /// All rings, outer first, in the order a drawing surface consumes them.
    pub fn rings(&self) -> Vec<Vec<LonLat>> {
        let mut rings = Vec::with_capacity(1 + self.inner.len());
        rings.push(self.outer.clone());
        rings.extend(self.inner.iter().cloned());
        rings
    }
}

/// A freshly fetched, decoded dataset ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Particles(Vec<LonLat>),
    Robots(Vec<RobotState>),
    Isl(Vec<IslMarker>),
    Region(RegionShape),
}

impl Dataset {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Dataset::Particles(_) => OverlayKind::Particles,
            Dataset::Robots(_) => OverlayKind::Robots,
            Dataset::Isl(_) => OverlayKind::Isl,
            Dataset::Region(_) => OverlayKind::Region,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LonLat> {
        vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(1.0, 1.0),
            LonLat::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_robot_validity() {
        assert!(RobotState::new(LonLat::new(-35.0, -9.0), 90.0).is_valid());
        assert!(!RobotState::new(LonLat::new(f64::NAN, -9.0), 90.0).is_valid());
        assert!(!RobotState::new(LonLat::new(-35.0, -9.0), f64::NAN).is_valid());
    }

    #[test]
    fn test_region_validate_ok() {
        let shape = RegionShape::new(square(), vec![square()]);
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_region_too_few_vertices() {
        let shape = RegionShape::new(vec![LonLat::new(0.0, 0.0); 3], Vec::new());
        assert!(matches!(
            shape.validate(),
            Err(DataError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_region_non_finite_vertex() {
        let mut outer = square();
        outer[2] = LonLat::new(f64::NAN, 1.0);
        let shape = RegionShape::new(outer, Vec::new());
        assert_eq!(
            shape.validate(),
            Err(DataError::MalformedEntity {
                kind: OverlayKind::Region,
                index: 2
            })
        );
    }

    #[test]
    fn test_region_rings_order() {
        let inner = vec![LonLat::new(0.2, 0.2); 4];
        let shape = RegionShape::new(square(), vec![inner.clone()]);
        let rings = shape.rings();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0], square());
        assert_eq!(rings[1], inner);
    }

    #[test]
    fn test_dataset_kind() {
        assert_eq!(Dataset::Particles(Vec::new()).kind(), OverlayKind::Particles);
        assert_eq!(Dataset::Robots(Vec::new()).kind(), OverlayKind::Robots);
    }
}
