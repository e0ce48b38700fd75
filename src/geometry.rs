//! Output of the turtle interpreter and the vertex-buffer contract with the renderer.
//!
//! The line stream is a flat list of [`OutputVertex`] records. A renderer
//! consumes consecutive pairs `(i, i + 1)` as segments, skipping a pair whose
//! start is a leaf and whose end is not (the jump back from a leaf tip to the
//! next branch). [`Geometry::thicken`] is a CPU reference of that consumer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A point of the line stream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputVertex {
    pub position: Vec3,
    /// Set when the vertex was emitted by a `DrawLeaf` command.
    pub leaf: bool,
}

impl OutputVertex {
    /// The `(x, y, z, leafFlag)` record uploaded to the renderer.
    pub fn to_record(self) -> [f32; 4] {
        let flag = if self.leaf { 1.0 } else { 0.0 };
        [self.position.x, self.position.y, self.position.z, flag]
    }
}

/// A closed polygon recorded between `StartPolygon` and `EndPolygon`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Vec3>,
}

/// Everything one interpretation pass produces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// The line stream, in emission order.
    pub vertices: Vec<OutputVertex>,

    /// Polygons, in the order they were closed.
    pub polygons: Vec<Polygon>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, position: Vec3, leaf: bool) {
        self.vertices.push(OutputVertex { position, leaf });
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// The line stream in the 4-component buffer layout.
    pub fn vertex_records(&self) -> Vec<[f32; 4]> {
        self.vertices.iter().map(|v| v.to_record()).collect()
    }

    /// The consecutive vertex pairs a renderer draws as segments.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices
            .windows(2)
            .filter(|pair| !(pair[0].leaf && !pair[1].leaf))
            .map(|pair| (pair[0].position, pair[1].position))
    }

    /// Expands every drawable segment into a quad of width `thickness`,
    /// six vertices (two triangles) per segment.
    ///
    /// The quad is offset along `Z × direction`, so it faces a camera
    /// looking down the Z axis. Zero-length segments are skipped.
    pub fn thicken(&self, thickness: f32) -> Vec<Vec3> {
        let half = thickness * 0.5;
        let mut out = Vec::with_capacity(self.vertices.len() * 6);

        for (start, end) in self.segments() {
            let Some(dir) = (end - start).try_normalize() else {
                continue;
            };
            // A segment parallel to Z has no Z × dir; fall back to the X axis.
            let side = Vec3::Z
                .cross(dir)
                .try_normalize()
                .unwrap_or_else(|| Vec3::X.cross(dir).normalize());

            let p0 = start + side * half;
            let p1 = start - side * half;
            let p2 = end + side * half;
            let p3 = end - side * half;
            out.extend_from_slice(&[p0, p1, p2, p1, p2, p3]);
        }

        out
    }
}
