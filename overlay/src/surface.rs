//! The drawable surface seam.
//!
//! The synchronization core never talks to a concrete map widget; it drives
//! whatever implements [`RenderSurface`]. Production surfaces wrap a real
//! rendering target, tests use [`crate::test_util::RecordingSurface`].

use shared::geo::LonLat;

/// Opaque identifier for one drawable object, minted by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// An opaque drawable surface with marker, polygon and heat-layer
/// primitives.
///
/// Contract:
/// - Newly created objects start detached; callers attach them explicitly.
/// - `attach`/`detach` control whether an object is rendered and are
///   idempotent; they never alter the object's data.
/// - `set_polygon_geometry` receives the complete ring set (outer ring
///   first) in one call, so a viewer never observes a partially updated
///   shape.
/// - `remove` destroys the object; its id must not be used afterwards.
pub trait RenderSurface {
    fn create_point_marker(&mut self, position: LonLat, label: &str) -> SurfaceId;
    fn set_point_position(&mut self, id: SurfaceId, position: LonLat);
    fn set_point_label(&mut self, id: SurfaceId, label: &str);

    fn create_polygon(&mut self, rings: &[Vec<LonLat>]) -> SurfaceId;
    fn set_polygon_geometry(&mut self, id: SurfaceId, rings: &[Vec<LonLat>]);

    fn create_heat_layer(&mut self, points: &[LonLat]) -> SurfaceId;
    fn set_heat_data(&mut self, id: SurfaceId, points: &[LonLat]);

    fn attach(&mut self, id: SurfaceId);
    fn detach(&mut self, id: SurfaceId);
    fn remove(&mut self, id: SurfaceId);
}
