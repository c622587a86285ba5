//! Floor/ceiling preview mesh
//!
//! A surface is drawn as a fan of four triangles around its center point,
//! spanning a 2x2 square. Heights are negated offsets.

use macroquad::math::Vec3;

use crate::world::{Corner, Sector, Surface};

/// Which surface of a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
}

impl SurfaceKind {
    pub fn label(self) -> &'static str {
        match self {
            SurfaceKind::Floor => "Floor",
            SurfaceKind::Ceiling => "Ceiling",
        }
    }
}

/// Five points in `Corner` order and the fan triangles over them
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewMesh {
    pub points: [Vec3; 5],
    pub triangles: [[usize; 3]; 4],
}

/// Unit positions of each corner on the (x, z) plane
const CORNER_XZ: [(f32, f32); 5] = [
    (-1.0, 1.0),  // NE
    (1.0, 1.0),   // SE
    (1.0, -1.0),  // SW
    (-1.0, -1.0), // NW
    (0.0, 0.0),   // center
];

/// Build the preview mesh for a surface
pub fn surface_mesh(surface: &Surface) -> PreviewMesh {
    let mut points = [Vec3::ZERO; 5];
    for corner in Corner::ALL {
        let i = corner.index();
        let (x, z) = CORNER_XZ[i];
        points[i] = Vec3::new(x, -(surface.offset(corner) as f32), z);
    }

    let center = Corner::Center.index();
    let mut triangles = [[0; 3]; 4];
    for (i, tri) in triangles.iter_mut().enumerate() {
        *tri = [center, i, (i + 1) % 4];
    }

    PreviewMesh { points, triangles }
}

/// Preview mesh for one surface of a sector; adjoined surfaces are not drawn
pub fn preview_mesh(sector: &Sector, kind: SurfaceKind) -> Option<PreviewMesh> {
    match kind {
        SurfaceKind::Floor if !sector.floor_adjoin() => Some(surface_mesh(sector.floor())),
        SurfaceKind::Ceiling if !sector.ceiling_adjoin() => Some(surface_mesh(sector.ceiling())),
        _ => None,
    }
}
