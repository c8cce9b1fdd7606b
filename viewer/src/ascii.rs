//! Terminal render surface.
//!
//! Draws through the log: markers and the region polygon as concise
//! position lines, the particle heat layer as an ASCII density map binned
//! over the configured geographic window. Good enough to watch a mission
//! from an SSH session, and the only surface the binary needs.

use overlay::{RenderSurface, SurfaceId};
use shared::geo::{BoundingBox, LonLat};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Character ramp from empty cell to highest density.
const DENSITY_CHARS: &[char] = &[' ', '.', 'o', '*', '#', '@'];

#[derive(Debug, Clone)]
enum ObjectData {
    Marker { position: LonLat, label: String },
    Polygon { rings: Vec<Vec<LonLat>> },
    Heat { points: Vec<LonLat> },
}

#[derive(Debug, Clone)]
struct AsciiObject {
    data: ObjectData,
    attached: bool,
}

/// A render surface that prints to the terminal via tracing.
pub struct AsciiSurface {
    bounds: BoundingBox,
    grid_width: usize,
    grid_height: usize,
    next_id: u64,
    objects: BTreeMap<SurfaceId, AsciiObject>,
}

impl AsciiSurface {
    pub fn new(bounds: BoundingBox, grid_width: usize, grid_height: usize) -> Self {
        Self {
            bounds,
            grid_width: grid_width.max(2),
            grid_height: grid_height.max(2),
            next_id: 0,
            objects: BTreeMap::new(),
        }
    }

    fn mint(&mut self) -> SurfaceId {
        let id = SurfaceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, data: ObjectData) -> SurfaceId {
        let id = self.mint();
        self.objects.insert(
            id,
            AsciiObject {
                data,
                attached: false,
            },
        );
        id
    }

    fn object_mut(&mut self, id: SurfaceId) -> &mut AsciiObject {
        self.objects.get_mut(&id).expect("unknown surface id")
    }

    /// Bin points into a character grid over the bounding box.
    ///
    /// Points outside the box clamp to the nearest edge cell, matching how
    /// the backend's query window and the drawing extent can drift apart by
    /// a particle step.
    fn render_density(&self, points: &[LonLat]) -> String {
        let mut grid = vec![vec![0u32; self.grid_width]; self.grid_height];
        let mut max_count = 0u32;
        for point in points {
            let (x, y) = self.bounds.normalize(*point);
            let col = (x.clamp(0.0, 1.0) * (self.grid_width - 1) as f64).round() as usize;
            // Row 0 is the northern edge.
            let row = ((1.0 - y).clamp(0.0, 1.0) * (self.grid_height - 1) as f64).round() as usize;
            grid[row][col] += 1;
            max_count = max_count.max(grid[row][col]);
        }

        let mut output = String::new();
        output.push_str(&format!("  {}\n", "-".repeat(self.grid_width + 2)));
        for row in &grid {
            output.push_str("  |");
            for &count in row {
                let char_idx = if max_count > 0 {
                    ((count as f64 / max_count as f64) * (DENSITY_CHARS.len() - 1) as f64).round()
                        as usize
                } else {
                    0
                };
                output.push(DENSITY_CHARS[char_idx]);
            }
            output.push_str("|\n");
        }
        output.push_str(&format!("  {}\n", "-".repeat(self.grid_width + 2)));
        output.push_str(&format!(
            "  {} particles, peak cell {}\n",
            points.len(),
            max_count
        ));
        output
    }

    fn show_heat(&self, points: &[LonLat]) {
        info!("particle density\n{}", self.render_density(points));
    }
}

impl RenderSurface for AsciiSurface {
    fn create_point_marker(&mut self, position: LonLat, label: &str) -> SurfaceId {
        let id = self.insert(ObjectData::Marker {
            position,
            label: label.to_string(),
        });
        info!(id = id.raw(), label, "marker created");
        id
    }

    fn set_point_position(&mut self, id: SurfaceId, position: LonLat) {
        if let ObjectData::Marker { position: p, .. } = &mut self.object_mut(id).data {
            *p = position;
        }
        debug!(
            id = id.raw(),
            lon = position.lon,
            lat = position.lat,
            "marker moved"
        );
    }

    fn set_point_label(&mut self, id: SurfaceId, label: &str) {
        if let ObjectData::Marker { label: l, .. } = &mut self.object_mut(id).data {
            *l = label.to_string();
        }
    }

    fn create_polygon(&mut self, rings: &[Vec<LonLat>]) -> SurfaceId {
        let id = self.insert(ObjectData::Polygon {
            rings: rings.to_vec(),
        });
        info!(
            id = id.raw(),
            rings = rings.len(),
            outer_vertices = rings.first().map_or(0, Vec::len),
            "region polygon created"
        );
        id
    }

    fn set_polygon_geometry(&mut self, id: SurfaceId, rings: &[Vec<LonLat>]) {
        if let ObjectData::Polygon { rings: r } = &mut self.object_mut(id).data {
            *r = rings.to_vec();
        }
        info!(
            id = id.raw(),
            rings = rings.len(),
            outer_vertices = rings.first().map_or(0, Vec::len),
            "region polygon updated"
        );
    }

    fn create_heat_layer(&mut self, points: &[LonLat]) -> SurfaceId {
        self.insert(ObjectData::Heat {
            points: points.to_vec(),
        })
    }

    fn set_heat_data(&mut self, id: SurfaceId, points: &[LonLat]) {
        let attached = {
            let object = self.object_mut(id);
            if let ObjectData::Heat { points: p } = &mut object.data {
                *p = points.to_vec();
            }
            object.attached
        };
        if attached {
            self.show_heat(points);
        }
    }

    fn attach(&mut self, id: SurfaceId) {
        let object = self.object_mut(id);
        if object.attached {
            return;
        }
        object.attached = true;
        let heat = match &object.data {
            ObjectData::Heat { points } => Some(points.clone()),
            _ => None,
        };
        if let Some(points) = heat {
            self.show_heat(&points);
        }
    }

    fn detach(&mut self, id: SurfaceId) {
        self.object_mut(id).attached = false;
    }

    fn remove(&mut self, id: SurfaceId) {
        if self.objects.remove(&id).is_some() {
            debug!(id = id.raw(), "object removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> AsciiSurface {
        AsciiSurface::new(BoundingBox::new(0.0, 10.0, 0.0, 10.0), 10, 5)
    }

    #[test]
    fn test_density_map_shape() {
        let surface = surface();
        let map = surface.render_density(&[LonLat::new(5.0, 5.0)]);
        let lines: Vec<&str> = map.lines().collect();
        // top border + 5 rows + bottom border + summary
        assert_eq!(lines.len(), 8);
        assert!(lines[0].contains("----"));
        assert!(lines[7].contains("1 particles"));
    }

    #[test]
    fn test_density_peak_uses_last_char() {
        let surface = surface();
        let points = vec![LonLat::new(0.0, 10.0); 5];
        let map = surface.render_density(&points);
        // All five points land in the north-west cell.
        let first_row = map.lines().nth(1).unwrap();
        assert_eq!(first_row.chars().nth(3).unwrap(), '@');
    }

    #[test]
    fn test_out_of_bounds_points_clamp() {
        let surface = surface();
        // Must not panic; clamps to the edge cells.
        let map = surface.render_density(&[LonLat::new(-100.0, 100.0), LonLat::new(100.0, -100.0)]);
        assert!(map.contains("2 particles"));
    }

    #[test]
    fn test_marker_lifecycle() {
        let mut surface = surface();
        let id = surface.create_point_marker(LonLat::new(1.0, 1.0), "Robot 0");
        surface.set_point_position(id, LonLat::new(2.0, 2.0));
        surface.attach(id);
        surface.attach(id); // idempotent
        surface.detach(id);
        surface.remove(id);
        assert!(surface.objects.is_empty());
    }

    #[test]
    fn test_empty_heat_layer_renders() {
        let surface = surface();
        let map = surface.render_density(&[]);
        assert!(map.contains("0 particles, peak cell 0"));
    }
}
