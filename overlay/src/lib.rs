//! Live overlay synchronization core.
//!
//! Reconciles freshly fetched overlay datasets against a persistent set of
//! drawable objects on an abstract render surface: wholesale replacement
//! for aggregate layers (particle heat map, region polygon), and
//! upsert-by-index-then-trim for per-entity markers (robots, ISL).
//! Visibility is a separate per-kind toggle that never touches the
//! synchronized data.

use shared::geo::LonLat;
use shared::kind::OverlayKind;
use shared::model::{DataError, Dataset, RegionShape};
use tracing::{debug, warn};

pub mod store;
pub mod surface;
pub mod test_util;
pub mod visibility;

use crate::store::{OverlayHandle, OverlayStore};
pub use crate::surface::{RenderSurface, SurfaceId};
pub use crate::visibility::Visibility;

/// Counts of overlay operations performed by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
}

/// One viewer instance: the render surface, the overlay store and the
/// visibility state, owned together.
///
/// All viewer state lives here rather than in module globals, so multiple
/// independent views can coexist and tests can drive one in isolation.
/// Reconciliation runs to completion inside [`MissionView::apply`]; callers
/// on a cooperative scheduler therefore never observe a kind mid-update.
pub struct MissionView<S: RenderSurface> {
    surface: S,
    store: OverlayStore,
    visibility: Visibility,
}

impl<S: RenderSurface> MissionView<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            store: OverlayStore::new(),
            visibility: Visibility::new(),
        }
    }

    /// Reconcile one freshly fetched dataset.
    ///
    /// Returns the operation counts on success. `Err` means the dataset was
    /// rejected as a whole (shape mismatch, undrawable region); the overlay
    /// state for that kind is left exactly as it was.
    pub fn apply(&mut self, dataset: Dataset) -> Result<ApplyStats, DataError> {
        match dataset {
            Dataset::Particles(points) => Ok(self.apply_particles(points)),
            Dataset::Robots(robots) => {
                let markers = robots
                    .iter()
                    .enumerate()
                    .map(|(index, robot)| {
                        robot.is_valid().then(|| {
                            let label = format!(
                                "Robot {index}; lon {:.5}, lat {:.5}, heading {:.1}",
                                robot.position.lon, robot.position.lat, robot.heading_deg
                            );
                            (robot.position, label)
                        })
                    })
                    .collect();
                Ok(self.apply_markers(OverlayKind::Robots, markers))
            }
            Dataset::Isl(isl) => {
                let markers = isl
                    .iter()
                    .map(|marker| {
                        marker
                            .is_valid()
                            .then(|| (marker.position, format!("ISL: {}", marker.label)))
                    })
                    .collect();
                Ok(self.apply_markers(OverlayKind::Isl, markers))
            }
            Dataset::Region(shape) => self.apply_region(shape),
        }
    }

    /// Replace the aggregate heat layer's point set wholesale. Points carry
    /// no identity, so there is nothing to diff.
    fn apply_particles(&mut self, points: Vec<LonLat>) -> ApplyStats {
        let mut stats = ApplyStats::default();
        let total = points.len();
        let finite: Vec<LonLat> = points.into_iter().filter(|p| p.is_finite()).collect();
        stats.skipped = total - finite.len();
        if stats.skipped > 0 {
            warn!(
                skipped = stats.skipped,
                "dropping non-finite particle points"
            );
        }

        if let Some(handle) = self.store.get(OverlayKind::Particles, 0) {
            let id = handle.surface_id();
            self.surface.set_heat_data(id, &finite);
            stats.updated = 1;
        } else {
            let id = self.surface.create_heat_layer(&finite);
            if self.visibility.is_visible(OverlayKind::Particles) {
                self.surface.attach(id);
            }
            self.store
                .upsert(OverlayKind::Particles, 0, OverlayHandle::aggregate(id));
            stats.created = 1;
        }
        stats
    }

    /// Upsert-by-index-then-trim for per-entity marker kinds.
    ///
    /// `markers[i]` is `None` when entity i is malformed: the entity is
    /// skipped for this pass and any existing handle at i keeps its prior
    /// state. Handles with index >= the feed length are removed from both
    /// the store and the surface, so a shrinking feed cannot leave orphaned
    /// markers behind.
    fn apply_markers(
        &mut self,
        kind: OverlayKind,
        markers: Vec<Option<(LonLat, String)>>,
    ) -> ApplyStats {
        let mut stats = ApplyStats::default();
        let feed_len = markers.len();

        for (index, marker) in markers.into_iter().enumerate() {
            let Some((position, label)) = marker else {
                let err = DataError::MalformedEntity { kind, index };
                warn!(error = %err, "skipping entity");
                stats.skipped += 1;
                continue;
            };
            if let Some(handle) = self.store.get_mut(kind, index) {
                let id = handle.surface_id();
                handle.set_position(position);
                handle.set_label(label.clone());
                self.surface.set_point_position(id, position);
                self.surface.set_point_label(id, &label);
                stats.updated += 1;
            } else {
                let id = self.surface.create_point_marker(position, &label);
                if self.visibility.is_visible(kind) {
                    self.surface.attach(id);
                }
                self.store
                    .upsert(kind, index, OverlayHandle::marker(id, position, label));
                stats.created += 1;
            }
        }

        for handle in self.store.trim(kind, feed_len) {
            self.surface.remove(handle.surface_id());
            stats.removed += 1;
        }
        if stats.removed > 0 {
            debug!(%kind, removed = stats.removed, "trimmed trailing handles");
        }
        stats
    }

    /// Replace the region polygon's geometry in a single call, so no
    /// intermediate old/new mixed shape is ever observable.
    fn apply_region(&mut self, shape: RegionShape) -> Result<ApplyStats, DataError> {
        shape.validate()?;
        let rings = shape.rings();
        let mut stats = ApplyStats::default();

        if let Some(handle) = self.store.get(OverlayKind::Region, 0) {
            let id = handle.surface_id();
            self.surface.set_polygon_geometry(id, &rings);
            stats.updated = 1;
        } else {
            let id = self.surface.create_polygon(&rings);
            if self.visibility.is_visible(OverlayKind::Region) {
                self.surface.attach(id);
            }
            self.store
                .upsert(OverlayKind::Region, 0, OverlayHandle::aggregate(id));
            stats.created = 1;
        }
        Ok(stats)
    }

    /// Flip a kind's visibility and return the new state. Detaching keeps
    /// every handle; toggling back on shows the last-synchronized data.
    pub fn toggle(&mut self, kind: OverlayKind) -> bool {
        let visible = self.visibility.toggle(kind);
        self.sync_attachment(kind, visible);
        visible
    }

    pub fn set_visible(&mut self, kind: OverlayKind, visible: bool) {
        self.visibility.set(kind, visible);
        self.sync_attachment(kind, visible);
    }

    fn sync_attachment(&mut self, kind: OverlayKind, visible: bool) {
        for (_, handle) in self.store.all(kind) {
            let id = handle.surface_id();
            if visible {
                self.surface.attach(id);
            } else {
                self.surface.detach(id);
            }
        }
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.visibility.is_visible(kind)
    }

    pub fn handle_count(&self, kind: OverlayKind) -> usize {
        self.store.len(kind)
    }

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
