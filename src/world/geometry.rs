//! Core geometry types for sector-grid maps
//!
//! Pure data structures with minimal behavior.
//! Anything that touches two sectors at once lives in `GameMap`.

use serde::{Serialize, Deserialize};

/// Texture assigned to freshly created walls, floors, ceilings and doors
pub const DEFAULT_TEXTURE: &str = "default.png";

/// Grid coordinate of a sector.
///
/// `y` selects the floor (vertical level), `z` the row and `x` the column
/// within that floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorPos {
    pub z: i32,
    pub x: i32,
    pub y: i32,
}

impl SectorPos {
    pub const fn new(z: i32, x: i32, y: i32) -> Self {
        Self { z, x, y }
    }

    /// Coordinate of the sector on the other side of a wall.
    /// `None` past the edge of the coordinate range.
    pub fn neighbor(&self, dir: Direction) -> Option<Self> {
        let (dz, dx) = dir.offset();
        Some(Self::new(self.z.checked_add(dz)?, self.x.checked_add(dx)?, self.y))
    }

    /// Coordinate of the sector directly below (through the floor)
    pub fn below(&self) -> Option<Self> {
        Some(Self::new(self.z, self.x, self.y.checked_sub(1)?))
    }

    /// Coordinate of the sector directly above (through the ceiling)
    pub fn above(&self) -> Option<Self> {
        Some(Self::new(self.z, self.x, self.y.checked_add(1)?))
    }
}

impl std::fmt::Display for SectorPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.z, self.x, self.y)
    }
}

/// Cardinal wall direction.
///
/// Declaration order (N, E, S, W) is the tie-break order used by wall picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Grid offset (dz, dx) of the neighbor across this wall
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        }
    }
}

/// Named sample point of a height surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthEast = 0,
    SouthEast = 1,
    SouthWest = 2,
    NorthWest = 3,
    Center = 4,
}

impl Corner {
    pub const ALL: [Corner; 5] = [
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
        Corner::NorthWest,
        Corner::Center,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 5-sample height field for a floor or ceiling.
///
/// Offsets are sub-tile steps relative to the sector's base height.
/// The core does not bound them; the editor keeps them in a small range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    offsets: [i32; 5],
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_offsets(offsets: [i32; 5]) -> Self {
        Self { offsets }
    }

    /// All five samples at the base level
    pub fn is_flush(&self) -> bool {
        self.offsets.iter().all(|&o| o == 0)
    }

    pub fn offset(&self, corner: Corner) -> i32 {
        self.offsets[corner.index()]
    }

    pub fn offsets(&self) -> &[i32; 5] {
        &self.offsets
    }

    pub fn set_offset(&mut self, corner: Corner, value: i32) {
        self.offsets[corner.index()] = value;
    }

    /// Set one sample, then pull the samples that share an edge with it
    /// one step closer if they now differ by more than one.
    ///
    /// Editing the center affects all four corners; editing a corner affects
    /// its two neighboring corners and the center.
    pub fn set_offset_smoothed(&mut self, corner: Corner, value: i32) {
        self.set_offset(corner, value);

        let neighbors: Vec<usize> = match corner {
            Corner::Center => (0..4).collect(),
            _ => {
                let i = corner.index();
                vec![(i + 3) % 4, (i + 1) % 4, Corner::Center.index()]
            }
        };

        for n in neighbors {
            let diff = self.offsets[n] - value;
            if diff > 1 {
                self.offsets[n] -= 1;
            } else if diff < -1 {
                self.offsets[n] += 1;
            }
        }
    }
}

/// Boundary state of one side of a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub(super) adjoin: bool,
    pub(super) main_texture: Option<String>,
    pub(super) adjoin_texture: Option<String>,
    pub(super) align_to_floor: bool,
    pub(super) adj_align_to_floor: bool,
    pub(super) blocks_movement: bool,
    pub(super) blocks_projectiles: bool,
    #[serde(default)]
    pub(super) main_h_flip: bool,
    #[serde(default)]
    pub(super) main_v_flip: bool,
    #[serde(default)]
    pub(super) adj_h_flip: bool,
    #[serde(default)]
    pub(super) adj_v_flip: bool,
}

impl Wall {
    pub fn new(main_texture: Option<String>) -> Self {
        Self {
            adjoin: false,
            main_texture,
            adjoin_texture: None,
            align_to_floor: false,
            adj_align_to_floor: false,
            blocks_movement: false,
            blocks_projectiles: false,
            main_h_flip: false,
            main_v_flip: false,
            adj_h_flip: false,
            adj_v_flip: false,
        }
    }

    /// Connected to the sector on the other side
    pub fn adjoin(&self) -> bool {
        self.adjoin
    }

    pub fn main_texture(&self) -> Option<&str> {
        self.main_texture.as_deref()
    }

    /// Texture shown where an adjoined neighbor's floor or ceiling differs
    pub fn adjoin_texture(&self) -> Option<&str> {
        self.adjoin_texture.as_deref()
    }

    /// Texture drawn bottom-up from the floor instead of top-down from the ceiling
    pub fn align_to_floor(&self) -> bool {
        self.align_to_floor
    }

    pub fn adj_align_to_floor(&self) -> bool {
        self.adj_align_to_floor
    }

    pub fn blocks_movement(&self) -> bool {
        self.blocks_movement
    }

    pub fn blocks_projectiles(&self) -> bool {
        self.blocks_projectiles
    }

    pub fn main_flip(&self) -> (bool, bool) {
        (self.main_h_flip, self.main_v_flip)
    }

    pub fn adjoin_flip(&self) -> (bool, bool) {
        (self.adj_h_flip, self.adj_v_flip)
    }

    /// Drop every flag that only means something on a shared boundary
    pub(super) fn clear_adjoin_flags(&mut self) {
        self.blocks_movement = false;
        self.blocks_projectiles = false;
        self.adj_align_to_floor = false;
    }
}

/// Where a door sits across its sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPosition {
    Near = 0,
    Middle = 1,
    Far = 2,
}

impl DoorPosition {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DoorPosition::Near),
            1 => Some(DoorPosition::Middle),
            2 => Some(DoorPosition::Far),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Which end of the door's travel recedes when it opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorType {
    UpLeft = 0,
    Middle = 1,
    DownRight = 2,
}

impl DoorType {
    /// Unknown selectors fall back to `UpLeft`
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => DoorType::Middle,
            2 => DoorType::DownRight,
            _ => DoorType::UpLeft,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

/// Optional door inside a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    facing_north_south: bool,
    position: DoorPosition,
    opens_vertical: bool,
    door_type: DoorType,
    /// Seconds to fully open, never negative
    opening_time: f64,
    shoot_to_open: bool,
    texture1: Option<String>,
    texture2: Option<String>,
    key: Option<String>,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            facing_north_south: true,
            position: DoorPosition::Middle,
            opens_vertical: true,
            door_type: DoorType::UpLeft,
            opening_time: 0.5,
            shoot_to_open: false,
            texture1: Some(DEFAULT_TEXTURE.to_string()),
            texture2: Some(DEFAULT_TEXTURE.to_string()),
            key: None,
        }
    }
}

impl Door {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facing_north_south(&self) -> bool {
        self.facing_north_south
    }

    pub fn set_facing_north_south(&mut self, north_south: bool) {
        self.facing_north_south = north_south;
    }

    pub fn position(&self) -> DoorPosition {
        self.position
    }

    pub fn set_position(&mut self, position: DoorPosition) {
        self.position = position;
    }

    pub fn opens_vertical(&self) -> bool {
        self.opens_vertical
    }

    pub fn set_opens_vertical(&mut self, vertical: bool) {
        self.opens_vertical = vertical;
    }

    pub fn door_type(&self) -> DoorType {
        self.door_type
    }

    pub fn set_door_type(&mut self, door_type: DoorType) {
        self.door_type = door_type;
    }

    pub fn opening_time(&self) -> f64 {
        self.opening_time
    }

    /// Negative (and NaN) times clamp to zero
    pub fn set_opening_time(&mut self, seconds: f64) {
        self.opening_time = seconds.max(0.0);
    }

    pub fn shoot_to_open(&self) -> bool {
        self.shoot_to_open
    }

    pub(super) fn enable_shoot_to_open(&mut self) {
        self.shoot_to_open = true;
    }

    pub fn texture1(&self) -> Option<&str> {
        self.texture1.as_deref()
    }

    pub fn set_texture1(&mut self, texture: Option<String>) {
        self.texture1 = texture;
    }

    pub fn texture2(&self) -> Option<&str> {
        self.texture2.as_deref()
    }

    pub fn set_texture2(&mut self, texture: Option<String>) {
        self.texture2 = texture;
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }
}

/// One grid cell of the map.
///
/// Adjoin state (walls, floor, ceiling) and the sky flag can only be changed
/// through `GameMap`, which keeps both sides of a boundary in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pos: SectorPos,
    /// Indexed by `Direction::index`
    walls: [Wall; 4],
    floor: Surface,
    ceiling: Surface,
    floor_texture: Option<String>,
    ceiling_texture: Option<String>,
    floor_adjoin: bool,
    ceiling_adjoin: bool,
    ceiling_is_sky: bool,
    #[serde(default)]
    door: Option<Door>,
}

impl Sector {
    /// Default sector: textured, unconnected walls, flush surfaces, no door
    pub fn new(z: i32, x: i32, y: i32) -> Self {
        let wall = || Wall::new(Some(DEFAULT_TEXTURE.to_string()));
        Self {
            pos: SectorPos::new(z, x, y),
            walls: [wall(), wall(), wall(), wall()],
            floor: Surface::new(),
            ceiling: Surface::new(),
            floor_texture: Some(DEFAULT_TEXTURE.to_string()),
            ceiling_texture: Some(DEFAULT_TEXTURE.to_string()),
            floor_adjoin: false,
            ceiling_adjoin: false,
            ceiling_is_sky: false,
            door: None,
        }
    }

    pub fn at(pos: SectorPos) -> Self {
        Self::new(pos.z, pos.x, pos.y)
    }

    pub fn pos(&self) -> SectorPos {
        self.pos
    }

    pub fn z(&self) -> i32 {
        self.pos.z
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    pub fn wall(&self, dir: Direction) -> &Wall {
        &self.walls[dir.index()]
    }

    pub(super) fn wall_mut(&mut self, dir: Direction) -> &mut Wall {
        &mut self.walls[dir.index()]
    }

    pub fn wall_adjoin(&self, dir: Direction) -> bool {
        self.wall(dir).adjoin
    }

    pub fn set_main_texture(&mut self, dir: Direction, texture: Option<String>) {
        self.wall_mut(dir).main_texture = texture;
    }

    pub fn set_adjoin_texture(&mut self, dir: Direction, texture: Option<String>) {
        self.wall_mut(dir).adjoin_texture = texture;
    }

    pub fn set_main_flip(&mut self, dir: Direction, horizontal: bool, vertical: bool) {
        let wall = self.wall_mut(dir);
        wall.main_h_flip = horizontal;
        wall.main_v_flip = vertical;
    }

    pub fn set_adjoin_flip(&mut self, dir: Direction, horizontal: bool, vertical: bool) {
        let wall = self.wall_mut(dir);
        wall.adj_h_flip = horizontal;
        wall.adj_v_flip = vertical;
    }

    pub fn floor(&self) -> &Surface {
        &self.floor
    }

    pub fn ceiling(&self) -> &Surface {
        &self.ceiling
    }

    pub(super) fn floor_mut(&mut self) -> &mut Surface {
        &mut self.floor
    }

    pub(super) fn ceiling_mut(&mut self) -> &mut Surface {
        &mut self.ceiling
    }

    pub fn floor_texture(&self) -> Option<&str> {
        self.floor_texture.as_deref()
    }

    pub fn set_floor_texture(&mut self, texture: Option<String>) {
        self.floor_texture = texture;
    }

    pub fn ceiling_texture(&self) -> Option<&str> {
        self.ceiling_texture.as_deref()
    }

    pub fn set_ceiling_texture(&mut self, texture: Option<String>) {
        self.ceiling_texture = texture;
    }

    pub fn floor_adjoin(&self) -> bool {
        self.floor_adjoin
    }

    pub(super) fn set_floor_adjoin(&mut self, value: bool) {
        self.floor_adjoin = value;
    }

    pub fn ceiling_adjoin(&self) -> bool {
        self.ceiling_adjoin
    }

    pub(super) fn set_ceiling_adjoin(&mut self, value: bool) {
        self.ceiling_adjoin = value;
    }

    pub fn ceiling_is_sky(&self) -> bool {
        self.ceiling_is_sky
    }

    pub(super) fn set_ceiling_is_sky(&mut self, value: bool) {
        self.ceiling_is_sky = value;
    }

    pub fn door(&self) -> Option<&Door> {
        self.door.as_ref()
    }

    pub fn door_mut(&mut self) -> Option<&mut Door> {
        self.door.as_mut()
    }

    pub fn has_door(&self) -> bool {
        self.door.is_some()
    }

    /// Install a door with default settings, replacing any existing one
    pub fn add_door(&mut self) {
        self.door = Some(Door::default());
    }

    pub fn remove_door(&mut self) -> Option<Door> {
        self.door.take()
    }
}
