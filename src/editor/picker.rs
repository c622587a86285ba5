//! Screen-to-grid transform and hit-testing
//!
//! Camera state lives in `ViewCamera`, which is passed into the pick
//! functions rather than held globally, so several views can coexist.

use std::collections::BTreeMap;

use crate::config::EditorConfig;
use crate::world::{Direction, GameMap, Sector, SectorPos};

/// 2D grid camera: offset of the top-left screen corner in cells, plus zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    /// Grid z at the left edge of the canvas
    pub cam_z: f32,
    /// Grid x at the top edge of the canvas
    pub cam_x: f32,
    zoom: f32,
    min_cell_size: f32,
    max_cell_size: f32,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ViewCamera {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            cam_z: config.start_cam_z,
            cam_x: config.start_cam_x,
            zoom: config.default_zoom.clamp(0.0, 1.0),
            min_cell_size: config.min_cell_size,
            max_cell_size: config.max_cell_size,
        }
    }

    /// Camera at a given offset and zoom, default cell size limits
    pub fn at(cam_z: f32, cam_x: f32, zoom: f32) -> Self {
        let mut camera = Self::default();
        camera.cam_z = cam_z;
        camera.cam_x = cam_x;
        camera.set_zoom(zoom);
        camera
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(0.0, 1.0);
    }

    /// On-screen size of one cell. Quadratic in zoom: fine steps when
    /// zoomed out, coarse steps when zoomed in.
    pub fn cell_size(&self) -> f32 {
        (self.max_cell_size - self.min_cell_size) * self.zoom * self.zoom + self.min_cell_size
    }

    /// Fractional grid z under a canvas-relative pointer x
    pub fn pointer_to_grid_z(&self, px: f32) -> f32 {
        px / self.cell_size() + self.cam_z
    }

    /// Fractional grid x under a canvas-relative pointer y
    pub fn pointer_to_grid_x(&self, py: f32) -> f32 {
        py / self.cell_size() + self.cam_x
    }

    /// Integer cell (z, x) under the pointer
    pub fn pointer_to_cell(&self, px: f32, py: f32) -> (i32, i32) {
        (
            self.pointer_to_grid_z(px).floor() as i32,
            self.pointer_to_grid_x(py).floor() as i32,
        )
    }

    /// Canvas position of a grid point (inverse of the pointer transform)
    pub fn grid_to_screen(&self, z: f32, x: f32) -> (f32, f32) {
        let size = self.cell_size();
        ((z - self.cam_z) * size, (x - self.cam_x) * size)
    }

    /// Pan horizontally by a pixel distance
    pub fn move_h(&mut self, pixels: f32) {
        self.cam_z += pixels / self.cell_size();
    }

    /// Pan vertically by a pixel distance
    pub fn move_v(&mut self, pixels: f32) {
        self.cam_x += pixels / self.cell_size();
    }

    /// Change zoom, keeping the canvas center fixed in grid space
    pub fn change_zoom(&mut self, amount: f32, canvas_w: f32, canvas_h: f32) {
        let old_w = canvas_w / self.cell_size();
        let old_h = canvas_h / self.cell_size();

        self.set_zoom(self.zoom + amount);

        let new_w = canvas_w / self.cell_size();
        let new_h = canvas_h / self.cell_size();
        self.cam_z += (old_w - new_w) / 2.0;
        self.cam_x += (old_h - new_h) / 2.0;
    }

    /// Closed cell range (z1, x1, z2, x2) touched by the canvas
    pub fn visible_range(&self, canvas_w: f32, canvas_h: f32) -> (i32, i32, i32, i32) {
        let z1 = self.cam_z.floor() as i32;
        let x1 = self.cam_x.floor() as i32;
        let z2 = self.pointer_to_grid_z(canvas_w).floor() as i32;
        let x2 = self.pointer_to_grid_x(canvas_h).floor() as i32;
        (z1, x1, z2, x2)
    }
}

/// Result of resolving a pointer to a cell
#[derive(Debug, Clone, PartialEq)]
pub enum Pick {
    /// A sector already in the map
    Existing(SectorPos),
    /// An empty cell; the sector is not in the map until confirmed
    Candidate(Sector),
}

impl Pick {
    pub fn pos(&self) -> SectorPos {
        match self {
            Pick::Existing(pos) => *pos,
            Pick::Candidate(sector) => sector.pos(),
        }
    }
}

/// Existing sector under the pointer on floor `y`
pub fn sector_at(map: &GameMap, camera: &ViewCamera, y: i32, px: f32, py: f32) -> Option<SectorPos> {
    let (z, x) = camera.pointer_to_cell(px, py);
    let pos = SectorPos::new(z, x, y);
    map.sector_exists(pos).then_some(pos)
}

/// Resolve the pointer to an existing sector, or an unplaced candidate
pub fn pick_sector(map: &GameMap, camera: &ViewCamera, y: i32, px: f32, py: f32) -> Pick {
    let (z, x) = camera.pointer_to_cell(px, py);
    let pos = SectorPos::new(z, x, y);
    if map.sector_exists(pos) {
        Pick::Existing(pos)
    } else {
        Pick::Candidate(Sector::at(pos))
    }
}

/// Nearest wall to a point inside a cell.
///
/// `frac_z`/`frac_x` are the point's offsets from the cell's west and north
/// edges. Ties go to the earlier direction in N, E, S, W order.
pub fn nearest_wall(frac_z: f32, frac_x: f32) -> Direction {
    let north = frac_x;
    let east = 1.0 - frac_z;
    let distances = [north, east, 1.0 - north, 1.0 - east];

    let mut least = 0;
    for i in 1..4 {
        if distances[i] < distances[least] {
            least = i;
        }
    }
    Direction::ALL[least]
}

/// Sector under the pointer and its wall nearest to the pointer
pub fn pick_wall(
    map: &GameMap,
    camera: &ViewCamera,
    y: i32,
    px: f32,
    py: f32,
) -> Option<(SectorPos, Direction)> {
    let pos = sector_at(map, camera, y, px, py)?;
    let frac_z = camera.pointer_to_grid_z(px) - pos.z as f32;
    let frac_x = camera.pointer_to_grid_x(py) - pos.x as f32;
    Some((pos, nearest_wall(frac_z, frac_x)))
}

/// Sectors of floor `y` whose (z, x) lies in the closed box
pub fn visible_sectors(map: &GameMap, y: i32, z1: i32, x1: i32, z2: i32, x2: i32) -> Vec<&Sector> {
    map.floor(y)
        .map(|floor| {
            floor
                .iter()
                .filter(|s| s.z() >= z1 && s.z() <= z2 && s.x() >= x1 && s.x() <= x2)
                .collect()
        })
        .unwrap_or_default()
}

/// Walls selected across any number of sectors, for batch texture edits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallSelection {
    walls: BTreeMap<SectorPos, Vec<Direction>>,
}

impl WallSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the wall if absent, remove it if present.
    /// Returns true if the wall is selected afterwards.
    pub fn toggle(&mut self, pos: SectorPos, dir: Direction) -> bool {
        let dirs = self.walls.entry(pos).or_default();
        if let Some(i) = dirs.iter().position(|&d| d == dir) {
            dirs.remove(i);
            if dirs.is_empty() {
                self.walls.remove(&pos);
            }
            false
        } else {
            dirs.push(dir);
            true
        }
    }

    pub fn contains(&self, pos: SectorPos, dir: Direction) -> bool {
        self.walls.get(&pos).is_some_and(|dirs| dirs.contains(&dir))
    }

    /// Selected walls of one sector, in selection order
    pub fn walls_of(&self, pos: SectorPos) -> &[Direction] {
        self.walls.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectorPos, Direction)> + '_ {
        self.walls
            .iter()
            .flat_map(|(&pos, dirs)| dirs.iter().map(move |&d| (pos, d)))
    }

    pub fn len(&self) -> usize {
        self.walls.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    /// Select all four walls of a sector, or clear them if all four
    /// already are. Returns true if the walls are selected afterwards.
    pub fn toggle_all(&mut self, pos: SectorPos) -> bool {
        if self.walls_of(pos).len() == Direction::ALL.len() {
            self.walls.remove(&pos);
            false
        } else {
            self.walls.insert(pos, Direction::ALL.to_vec());
            true
        }
    }

    /// Replace the sector's selected walls with exactly its adjoined ones
    pub fn select_adjoined(&mut self, map: &GameMap, pos: SectorPos) {
        let adjoined: Vec<Direction> = match map.sector(pos) {
            Some(sector) => Direction::ALL.into_iter().filter(|&d| sector.wall_adjoin(d)).collect(),
            None => Vec::new(),
        };
        if adjoined.is_empty() {
            self.walls.remove(&pos);
        } else {
            self.walls.insert(pos, adjoined);
        }
    }

    /// Forget walls of sectors that are no longer in the map
    pub fn retain_existing(&mut self, map: &GameMap) {
        self.walls.retain(|pos, _| map.sector_exists(*pos));
    }

    /// Set the main texture of every selected wall
    pub fn apply_main_texture(&self, map: &mut GameMap, texture: Option<&str>) {
        for (pos, dir) in self.iter() {
            if let Some(sector) = map.sector_mut(pos) {
                sector.set_main_texture(dir, texture.map(str::to_string));
            }
        }
    }

    /// Set the adjoin texture of every selected wall
    pub fn apply_adjoin_texture(&self, map: &mut GameMap, texture: Option<&str>) {
        for (pos, dir) in self.iter() {
            if let Some(sector) = map.sector_mut(pos) {
                sector.set_adjoin_texture(dir, texture.map(str::to_string));
            }
        }
    }
}

/// Toggle the wall under the pointer in `selection`
pub fn toggle_wall_selection(
    map: &GameMap,
    camera: &ViewCamera,
    y: i32,
    selection: &mut WallSelection,
    px: f32,
    py: f32,
) -> Option<(SectorPos, Direction)> {
    let (pos, dir) = pick_wall(map, camera, y, px, py)?;
    selection.toggle(pos, dir);
    Some((pos, dir))
}
