//! In-memory surface double for tests.
//!
//! Records every primitive call and keeps the live state of each drawable
//! object, so tests can assert both the operation sequence (idempotence,
//! atomicity) and the final picture (positions, labels, attachment).

use crate::surface::{RenderSurface, SurfaceId};
use shared::geo::LonLat;
use std::collections::BTreeMap;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    CreateMarker(SurfaceId),
    SetPosition(SurfaceId),
    SetLabel(SurfaceId),
    CreatePolygon(SurfaceId),
    SetPolygonGeometry(SurfaceId),
    CreateHeat(SurfaceId),
    SetHeatData(SurfaceId),
    Attach(SurfaceId),
    Detach(SurfaceId),
    Remove(SurfaceId),
}

impl SurfaceOp {
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            SurfaceOp::CreateMarker(_) | SurfaceOp::CreatePolygon(_) | SurfaceOp::CreateHeat(_)
        )
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, SurfaceOp::Remove(_))
    }
}

/// Current data of one live object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectState {
    Marker { position: LonLat, label: String },
    Polygon { rings: Vec<Vec<LonLat>> },
    Heat { points: Vec<LonLat> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveObject {
    pub state: ObjectState,
    pub attached: bool,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    pub ops: Vec<SurfaceOp>,
    pub objects: BTreeMap<SurfaceId, LiveObject>,
    /// Every complete ring set ever handed to a polygon, in order. An
    /// atomic region update appends exactly one entry.
    pub polygon_geometries: Vec<Vec<Vec<LonLat>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> SurfaceId {
        let id = SurfaceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn object_mut(&mut self, id: SurfaceId) -> &mut LiveObject {
        self.objects.get_mut(&id).expect("unknown surface id")
    }

    /// Positions and labels of attached markers, in id order.
    pub fn attached_markers(&self) -> Vec<(LonLat, String)> {
        self.objects
            .values()
            .filter(|obj| obj.attached)
            .filter_map(|obj| match &obj.state {
                ObjectState::Marker { position, label } => Some((*position, label.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.objects
            .values()
            .filter(|obj| matches!(obj.state, ObjectState::Marker { .. }))
            .count()
    }

    /// Ops recorded after index `from`.
    pub fn ops_since(&self, from: usize) -> &[SurfaceOp] {
        &self.ops[from..]
    }
}

impl RenderSurface for RecordingSurface {
    fn create_point_marker(&mut self, position: LonLat, label: &str) -> SurfaceId {
        let id = self.mint();
        self.objects.insert(
            id,
            LiveObject {
                state: ObjectState::Marker {
                    position,
                    label: label.to_string(),
                },
                attached: false,
            },
        );
        self.ops.push(SurfaceOp::CreateMarker(id));
        id
    }

    fn set_point_position(&mut self, id: SurfaceId, position: LonLat) {
        match &mut self.object_mut(id).state {
            ObjectState::Marker { position: p, .. } => *p = position,
            other => panic!("set_point_position on {other:?}"),
        }
        self.ops.push(SurfaceOp::SetPosition(id));
    }

    fn set_point_label(&mut self, id: SurfaceId, label: &str) {
        match &mut self.object_mut(id).state {
            ObjectState::Marker { label: l, .. } => *l = label.to_string(),
            other => panic!("set_point_label on {other:?}"),
        }
        self.ops.push(SurfaceOp::SetLabel(id));
    }

    fn create_polygon(&mut self, rings: &[Vec<LonLat>]) -> SurfaceId {
        let id = self.mint();
        self.objects.insert(
            id,
            LiveObject {
                state: ObjectState::Polygon {
                    rings: rings.to_vec(),
                },
                attached: false,
            },
        );
        self.polygon_geometries.push(rings.to_vec());
        self.ops.push(SurfaceOp::CreatePolygon(id));
        id
    }

    fn set_polygon_geometry(&mut self, id: SurfaceId, rings: &[Vec<LonLat>]) {
        match &mut self.object_mut(id).state {
            ObjectState::Polygon { rings: r } => *r = rings.to_vec(),
            other => panic!("set_polygon_geometry on {other:?}"),
        }
        self.polygon_geometries.push(rings.to_vec());
        self.ops.push(SurfaceOp::SetPolygonGeometry(id));
    }

    fn create_heat_layer(&mut self, points: &[LonLat]) -> SurfaceId {
        let id = self.mint();
        self.objects.insert(
            id,
            LiveObject {
                state: ObjectState::Heat {
                    points: points.to_vec(),
                },
                attached: false,
            },
        );
        self.ops.push(SurfaceOp::CreateHeat(id));
        id
    }

    fn set_heat_data(&mut self, id: SurfaceId, points: &[LonLat]) {
        match &mut self.object_mut(id).state {
            ObjectState::Heat { points: p } => *p = points.to_vec(),
            other => panic!("set_heat_data on {other:?}"),
        }
        self.ops.push(SurfaceOp::SetHeatData(id));
    }

    fn attach(&mut self, id: SurfaceId) {
        self.object_mut(id).attached = true;
        self.ops.push(SurfaceOp::Attach(id));
    }

    fn detach(&mut self, id: SurfaceId) {
        self.object_mut(id).attached = false;
        self.ops.push(SurfaceOp::Detach(id));
    }

    fn remove(&mut self, id: SurfaceId) {
        self.objects.remove(&id).expect("remove of unknown surface id");
        self.ops.push(SurfaceOp::Remove(id));
    }
}
