//! Drawable geometry for the 2D grid view
//!
//! Built once per frame from the editor state, in canvas-relative pixels.
//! Painting it is left to the caller.

use crate::ui::Rect;
use crate::world::{Direction, DoorPosition, Sector};
use super::picker::{visible_sectors, ViewCamera};
use super::{DrawMode, EditorState};

/// Line width at zoom 0 and zoom 1
const MIN_LINE_WEIGHT: f32 = 0.5;
const MAX_LINE_WEIGHT: f32 = 2.0;

/// What a line segment represents, which decides its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    GridLine,
    Sector,
    SelectedSector,
    SelectedWall,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: Stroke,
}

impl Segment {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) -> Self {
        Self { x1, y1, x2, y2, stroke }
    }
}

/// Everything the grid view paints for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub line_width: f32,
    /// In paint order: grid, sectors, then selection
    pub segments: Vec<Segment>,
    /// Filled door rectangles
    pub doors: Vec<Rect>,
}

/// Line width for a zoom level; thinner when zoomed out
pub fn line_width(zoom: f32) -> f32 {
    (MAX_LINE_WEIGHT - MIN_LINE_WEIGHT) * zoom + MIN_LINE_WEIGHT
}

/// Door rectangle inside a cell whose top-left corner is at (left, top).
///
/// A north-south door is a thin vertical bar, an east-west door a thin
/// horizontal bar; the position picks which edge or the middle it sits on.
pub fn door_rect(sector: &Sector, left: f32, top: f32, size: f32) -> Option<Rect> {
    let door = sector.door()?;
    let ns = door.facing_north_south();
    let thickness = size / 16.0;
    let (w, h) = if ns { (thickness, size) } else { (size, thickness) };

    let (dx, dy) = match (door.position(), ns) {
        (DoorPosition::Near, true) => (size * 15.0 / 16.0, 0.0),
        (DoorPosition::Near, false) => (0.0, 0.0),
        (DoorPosition::Middle, true) => (size * 15.0 / 32.0, 0.0),
        (DoorPosition::Middle, false) => (0.0, size * 15.0 / 32.0),
        (DoorPosition::Far, true) => (0.0, 0.0),
        (DoorPosition::Far, false) => (0.0, size * 15.0 / 16.0),
    };

    Some(Rect::new(left + dx, top + dy, w, h))
}

/// Edge of a cell as a segment
fn edge(left: f32, top: f32, size: f32, dir: Direction, stroke: Stroke) -> Segment {
    let (right, bottom) = (left + size, top + size);
    match dir {
        Direction::North => Segment::new(left, top, right, top, stroke),
        Direction::South => Segment::new(left, bottom, right, bottom, stroke),
        Direction::East => Segment::new(right, top, right, bottom, stroke),
        Direction::West => Segment::new(left, top, left, bottom, stroke),
    }
}

/// Quarter-length tick from the middle of an edge towards the cell center
fn tick(left: f32, top: f32, size: f32, dir: Direction) -> Segment {
    let (mid_z, mid_x) = (left + size / 2.0, top + size / 2.0);
    let q = size / 4.0;
    let stroke = Stroke::SelectedWall;
    match dir {
        Direction::North => Segment::new(mid_z, top, mid_z, top + q, stroke),
        Direction::South => Segment::new(mid_z, top + size, mid_z, top + size - q, stroke),
        Direction::East => Segment::new(left + size, mid_x, left + size - q, mid_x, stroke),
        Direction::West => Segment::new(left, mid_x, left + q, mid_x, stroke),
    }
}

fn grid_lines(camera: &ViewCamera, canvas_w: f32, canvas_h: f32, out: &mut Vec<Segment>) {
    let (z1, x1, z2, x2) = camera.visible_range(canvas_w, canvas_h);

    for z in z1..=z2 + 1 {
        let (sx, _) = camera.grid_to_screen(z as f32, 0.0);
        if sx >= 0.0 && sx <= canvas_w {
            out.push(Segment::new(sx, 0.0, sx, canvas_h, Stroke::GridLine));
        }
    }
    for x in x1..=x2 + 1 {
        let (_, sy) = camera.grid_to_screen(0.0, x as f32);
        if sy >= 0.0 && sy <= canvas_h {
            out.push(Segment::new(0.0, sy, canvas_w, sy, Stroke::GridLine));
        }
    }
}

impl DrawList {
    /// Build the geometry for the current floor of `state`
    pub fn build(state: &EditorState, canvas_w: f32, canvas_h: f32) -> Self {
        let camera = &state.camera;
        let size = camera.cell_size();
        let floor = state.floor();
        let mut list = DrawList {
            line_width: line_width(camera.zoom()),
            ..Default::default()
        };

        if state.show_grid {
            grid_lines(camera, canvas_w, canvas_h, &mut list.segments);
        }

        // Sectors, leaving out adjoined walls
        let (z1, x1, z2, x2) = camera.visible_range(canvas_w, canvas_h);
        for sector in visible_sectors(&state.map, floor, z1, x1, z2, x2) {
            let (left, top) = camera.grid_to_screen(sector.z() as f32, sector.x() as f32);
            if let Some(door) = door_rect(sector, left, top, size) {
                list.doors.push(door);
            }
            for dir in Direction::ALL {
                if !sector.wall_adjoin(dir) {
                    list.segments.push(edge(left, top, size, dir, Stroke::Sector));
                }
            }
        }

        match state.mode() {
            DrawMode::Sector | DrawMode::Surface => {
                if let Some(pick) = state.current() {
                    let pos = pick.pos();
                    let (left, top) = camera.grid_to_screen(pos.z as f32, pos.x as f32);
                    for dir in Direction::ALL {
                        list.segments.push(edge(left, top, size, dir, Stroke::SelectedSector));
                    }
                }
            }
            DrawMode::Texture => {
                for (pos, dir) in state.selected_walls.iter().filter(|(p, _)| p.y == floor) {
                    let (left, top) = camera.grid_to_screen(pos.z as f32, pos.x as f32);
                    list.segments.push(edge(left, top, size, dir, Stroke::SelectedWall));
                    list.segments.push(tick(left, top, size, dir));
                }
            }
        }

        list
    }

    pub fn count(&self, stroke: Stroke) -> usize {
        self.segments.iter().filter(|s| s.stroke == stroke).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::world::{GameMap, SectorPos};

    fn state() -> EditorState {
        let mut state = EditorState::new(GameMap::new(), &EditorConfig::default());
        // 64px cells
        state.camera = ViewCamera::at(0.0, 0.0, (48.0f32 / 240.0).sqrt());
        state
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_line_width_range() {
        assert_eq!(line_width(0.0), 0.5);
        assert_eq!(line_width(1.0), 2.0);
    }

    #[test]
    fn test_door_rect_placement() {
        let mut sector = Sector::new(0, 0, 0);
        assert!(door_rect(&sector, 0.0, 0.0, 64.0).is_none());

        sector.add_door();
        // Middle, north-south: vertical bar near the center
        assert_eq!(door_rect(&sector, 0.0, 0.0, 64.0), Some(Rect::new(30.0, 0.0, 4.0, 64.0)));

        let door = sector.door_mut().unwrap();
        door.set_position(DoorPosition::Near);
        assert_eq!(door_rect(&sector, 10.0, 20.0, 64.0), Some(Rect::new(70.0, 20.0, 4.0, 64.0)));

        let door = sector.door_mut().unwrap();
        door.set_facing_north_south(false);
        door.set_position(DoorPosition::Far);
        assert_eq!(door_rect(&sector, 0.0, 0.0, 64.0), Some(Rect::new(0.0, 60.0, 64.0, 4.0)));
    }

    #[test]
    fn test_adjoined_walls_not_outlined() {
        let mut state = state();
        state.show_grid = false;
        state.map.insert_sector(Sector::new(1, 0, 0)).unwrap();
        let list = DrawList::build(&state, 640.0, 480.0);
        assert_eq!(list.count(Stroke::Sector), 8);

        state.map.set_wall_adjoin(SectorPos::new(0, 0, 0), Direction::East, true).unwrap();
        let list = DrawList::build(&state, 640.0, 480.0);
        assert_eq!(list.count(Stroke::Sector), 6);
        assert_eq!(list.count(Stroke::GridLine), 0);
    }

    #[test]
    fn test_grid_lines_cover_canvas() {
        let state = state();
        let list = DrawList::build(&state, 600.0, 420.0);
        // 9.4 columns and 6.6 rows of 64px cells
        assert_eq!(list.count(Stroke::GridLine), 10 + 7);
        assert!(close(list.line_width, line_width(state.camera.zoom())));
    }

    #[test]
    fn test_selected_sector_outline() {
        let mut state = state();
        state.show_grid = false;
        state.click(200.0, 10.0);
        let list = DrawList::build(&state, 640.0, 480.0);
        let selected: Vec<_> = list
            .segments
            .iter()
            .filter(|s| s.stroke == Stroke::SelectedSector)
            .collect();
        assert_eq!(selected.len(), 4);
        assert!(close(selected[0].x1, 192.0));
        assert!(close(selected[0].x2, 256.0));
    }

    #[test]
    fn test_selected_wall_with_tick() {
        let mut state = state();
        state.show_grid = false;
        state.set_mode(DrawMode::Texture);
        state.click(32.0, 4.0);
        let list = DrawList::build(&state, 640.0, 480.0);

        let walls: Vec<_> = list
            .segments
            .iter()
            .filter(|s| s.stroke == Stroke::SelectedWall)
            .collect();
        assert_eq!(walls.len(), 2);
        // North edge, then a tick down from its midpoint
        assert!(close(walls[0].y1, 0.0) && close(walls[0].y2, 0.0));
        assert!(close(walls[1].x1, 32.0) && close(walls[1].y2, 16.0));
    }

    #[test]
    fn test_doors_collected() {
        let mut state = state();
        state.map.add_door(SectorPos::new(0, 0, 0)).unwrap();
        let list = DrawList::build(&state, 640.0, 480.0);
        assert_eq!(list.doors.len(), 1);
    }
}
