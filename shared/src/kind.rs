//! Overlay kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four overlay datasets the backend serves.
///
/// `Particles` and `Region` are aggregates rendered through a single drawable
/// object; `Robots` and `Isl` produce one marker per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Particle-filter point cloud, rendered as a heat layer
    Particles,
    /// Robot positions and headings
    Robots,
    /// Inter-satellite-link markers
    Isl,
    /// Mission region polygon
    Region,
}

impl OverlayKind {
    /// Every kind, in the order they are polled.
    pub const ALL: [OverlayKind; 4] = [
        OverlayKind::Particles,
        OverlayKind::Robots,
        OverlayKind::Isl,
        OverlayKind::Region,
    ];

    /// Kinds meaningful before a mission has been configured.
    pub const SIMULATION_ONLY: [OverlayKind; 2] = [OverlayKind::Particles, OverlayKind::Isl];

    /// True for kinds backed by a single aggregate drawable.
    pub fn is_aggregate(self) -> bool {
        matches!(self, OverlayKind::Particles | OverlayKind::Region)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayKind::Particles => "particles",
            OverlayKind::Robots => "robots",
            OverlayKind::Isl => "isl",
            OverlayKind::Region => "region",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_split() {
        assert!(OverlayKind::Particles.is_aggregate());
        assert!(OverlayKind::Region.is_aggregate());
        assert!(!OverlayKind::Robots.is_aggregate());
        assert!(!OverlayKind::Isl.is_aggregate());
    }

    #[test]
    fn test_display() {
        assert_eq!(OverlayKind::Robots.to_string(), "robots");
        assert_eq!(OverlayKind::Isl.to_string(), "isl");
    }

    #[test]
    fn test_all_covers_every_kind() {
        assert_eq!(OverlayKind::ALL.len(), 4);
        for kind in OverlayKind::SIMULATION_ONLY {
            assert!(OverlayKind::ALL.contains(&kind));
        }
    }
}
