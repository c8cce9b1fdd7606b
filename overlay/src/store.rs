//! Typed collections of live overlay handles.

use crate::surface::SurfaceId;
use shared::geo::LonLat;
use shared::kind::OverlayKind;
use std::collections::BTreeMap;

/// One live overlay object: the surface id plus the last-applied marker
/// attributes, kept so visibility restoration and tests can observe state
/// without asking the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle {
    surface_id: SurfaceId,
    position: Option<LonLat>,
    label: Option<String>,
}

impl OverlayHandle {
    /// Handle for a point marker.
    pub fn marker(surface_id: SurfaceId, position: LonLat, label: String) -> Self {
        Self {
            surface_id,
            position: Some(position),
            label: Some(label),
        }
    }

    /// Handle for an aggregate object (heat layer or polygon).
    pub fn aggregate(surface_id: SurfaceId) -> Self {
        Self {
            surface_id,
            position: None,
            label: None,
        }
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn position(&self) -> Option<LonLat> {
        self.position
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_position(&mut self, position: LonLat) {
        self.position = Some(position);
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }
}

/// Per-kind partitions of overlay handles keyed by entity index.
///
/// Invariant: at most one handle per (kind, id). Aggregate kinds hold a
/// single handle under id 0. Handles are owned exclusively by the store;
/// nothing outside a reconciliation pass retains one.
#[derive(Debug, Default)]
pub struct OverlayStore {
    particles: BTreeMap<usize, OverlayHandle>,
    robots: BTreeMap<usize, OverlayHandle>,
    isl: BTreeMap<usize, OverlayHandle>,
    region: BTreeMap<usize, OverlayHandle>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, kind: OverlayKind) -> &BTreeMap<usize, OverlayHandle> {
        match kind {
            OverlayKind::Particles => &self.particles,
            OverlayKind::Robots => &self.robots,
            OverlayKind::Isl => &self.isl,
            OverlayKind::Region => &self.region,
        }
    }

    fn partition_mut(&mut self, kind: OverlayKind) -> &mut BTreeMap<usize, OverlayHandle> {
        match kind {
            OverlayKind::Particles => &mut self.particles,
            OverlayKind::Robots => &mut self.robots,
            OverlayKind::Isl => &mut self.isl,
            OverlayKind::Region => &mut self.region,
        }
    }

    pub fn get(&self, kind: OverlayKind, id: usize) -> Option<&OverlayHandle> {
        self.partition(kind).get(&id)
    }

    pub fn get_mut(&mut self, kind: OverlayKind, id: usize) -> Option<&mut OverlayHandle> {
        self.partition_mut(kind).get_mut(&id)
    }

    /// Insert or replace the handle for (kind, id).
    pub fn upsert(&mut self, kind: OverlayKind, id: usize, handle: OverlayHandle) {
        debug_assert!(!kind.is_aggregate() || id == 0, "aggregate kinds use id 0");
        self.partition_mut(kind).insert(id, handle);
    }

    pub fn remove(&mut self, kind: OverlayKind, id: usize) -> Option<OverlayHandle> {
        self.partition_mut(kind).remove(&id)
    }

    /// Handles of a kind in ascending id order.
    pub fn all(&self, kind: OverlayKind) -> impl Iterator<Item = (usize, &OverlayHandle)> {
        self.partition(kind).iter().map(|(&id, handle)| (id, handle))
    }

    pub fn len(&self, kind: OverlayKind) -> usize {
        self.partition(kind).len()
    }

    pub fn is_empty(&self, kind: OverlayKind) -> bool {
        self.partition(kind).is_empty()
    }

    /// Remove and return every handle with id >= `keep`.
    pub fn trim(&mut self, kind: OverlayKind, keep: usize) -> Vec<OverlayHandle> {
        self.partition_mut(kind)
            .split_off(&keep)
            .into_values()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: u64) -> OverlayHandle {
        OverlayHandle::marker(SurfaceId::new(raw), LonLat::new(0.0, 0.0), String::new())
    }

    #[test]
    fn test_upsert_replaces() {
        let mut store = OverlayStore::new();
        store.upsert(OverlayKind::Robots, 0, handle(1));
        store.upsert(OverlayKind::Robots, 0, handle(2));
        assert_eq!(store.len(OverlayKind::Robots), 1);
        assert_eq!(
            store.get(OverlayKind::Robots, 0).unwrap().surface_id(),
            SurfaceId::new(2)
        );
    }

    #[test]
    fn test_partitions_are_independent() {
        let mut store = OverlayStore::new();
        store.upsert(OverlayKind::Robots, 0, handle(1));
        store.upsert(OverlayKind::Isl, 0, handle(2));
        assert_eq!(store.len(OverlayKind::Robots), 1);
        assert_eq!(store.len(OverlayKind::Isl), 1);
        store.remove(OverlayKind::Robots, 0);
        assert!(store.is_empty(OverlayKind::Robots));
        assert_eq!(store.len(OverlayKind::Isl), 1);
    }

    #[test]
    fn test_trim_removes_tail() {
        let mut store = OverlayStore::new();
        for id in 0..5 {
            store.upsert(OverlayKind::Robots, id, handle(id as u64));
        }
        let removed = store.trim(OverlayKind::Robots, 2);
        assert_eq!(removed.len(), 3);
        assert_eq!(store.len(OverlayKind::Robots), 2);
        assert!(store.get(OverlayKind::Robots, 1).is_some());
        assert!(store.get(OverlayKind::Robots, 2).is_none());
    }

    #[test]
    fn test_trim_noop_when_feed_grows() {
        let mut store = OverlayStore::new();
        store.upsert(OverlayKind::Isl, 0, handle(0));
        assert!(store.trim(OverlayKind::Isl, 3).is_empty());
        assert_eq!(store.len(OverlayKind::Isl), 1);
    }

    #[test]
    fn test_all_is_ordered() {
        let mut store = OverlayStore::new();
        store.upsert(OverlayKind::Robots, 2, handle(2));
        store.upsert(OverlayKind::Robots, 0, handle(0));
        store.upsert(OverlayKind::Robots, 1, handle(1));
        let ids: Vec<usize> = store.all(OverlayKind::Robots).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
