//! Sparse multi-floor sector storage
//!
//! Every adjoin relationship is two-sided. The setters here check all
//! preconditions before writing, then update both participants, so a caller
//! never observes one side changed and the other not.

use std::collections::{HashMap, VecDeque};

use log::error;

use super::{
    Corner, Direction, Door, DoorPosition, DoorType, EditError, EditResult, MapInvariantError,
    Sector, SectorPos, Surface, Wall,
};

/// Most floors a map may span, lowest to highest
pub const MAX_FLOOR_SPAN: usize = 4096;

/// Sectors of one floor, indexed by row (z) then column (x)
#[derive(Debug, Clone, Default)]
pub struct Floor {
    rows: HashMap<i32, HashMap<i32, Sector>>,
}

impl Floor {
    pub fn get(&self, z: i32, x: i32) -> Option<&Sector> {
        self.rows.get(&z)?.get(&x)
    }

    fn get_mut(&mut self, z: i32, x: i32) -> Option<&mut Sector> {
        self.rows.get_mut(&z)?.get_mut(&x)
    }

    pub fn contains(&self, z: i32, x: i32) -> bool {
        self.get(z, x).is_some()
    }

    /// Returns false (and drops nothing) if the cell is taken
    fn insert(&mut self, sector: Sector) -> bool {
        let (z, x) = (sector.z(), sector.x());
        let row = self.rows.entry(z).or_default();
        if row.contains_key(&x) {
            return false;
        }
        row.insert(x, sector);
        true
    }

    fn remove(&mut self, z: i32, x: i32) -> Option<Sector> {
        let row = self.rows.get_mut(&z)?;
        let removed = row.remove(&x);
        if row.is_empty() {
            self.rows.remove(&z);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.rows.values().flat_map(|row| row.values())
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The whole map: floors of sectors plus the map-wide key registry
#[derive(Debug, Clone)]
pub struct GameMap {
    floors: VecDeque<Floor>,
    /// Floor number of `floors[0]`
    lowest_floor: i32,
    keys: Vec<String>,
}

impl Default for GameMap {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMap {
    /// New map holding a single default sector at (0, 0, 0)
    pub fn new() -> Self {
        let mut map = Self::empty();
        map.floor_mut(0).insert(Sector::new(0, 0, 0));
        map
    }

    /// Map with one empty floor and no sectors
    pub fn empty() -> Self {
        Self {
            floors: VecDeque::from([Floor::default()]),
            lowest_floor: 0,
            keys: Vec::new(),
        }
    }

    /// Map with `count` empty floors starting at `lowest`.
    /// The caller keeps `count` within `MAX_FLOOR_SPAN`.
    pub(super) fn with_floors(lowest: i32, count: usize) -> Self {
        Self {
            floors: (0..count.max(1)).map(|_| Floor::default()).collect(),
            lowest_floor: lowest,
            keys: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Storage
    // ---------------------------------------------------------------------

    /// Floor `y`, growing the floor list downward or upward until it exists.
    /// Never shrinks.
    pub fn floor_mut(&mut self, y: i32) -> &mut Floor {
        while y < self.lowest_floor {
            self.floors.push_front(Floor::default());
            self.lowest_floor -= 1;
        }
        let index = (i64::from(y) - i64::from(self.lowest_floor)) as usize;
        while index >= self.floors.len() {
            self.floors.push_back(Floor::default());
        }
        &mut self.floors[index]
    }

    /// Floor `y` if it has been created, without growing anything
    pub fn floor(&self, y: i32) -> Option<&Floor> {
        self.floors.get(self.floor_index(y)?)
    }

    /// Would holding floor `y` keep the map within `MAX_FLOOR_SPAN`
    pub fn floor_in_range(&self, y: i32) -> bool {
        let low = i64::from(self.lowest_floor);
        let high = low + self.floors.len() as i64 - 1;
        let y = i64::from(y);
        let span = high.max(y) - low.min(y) + 1;
        span <= MAX_FLOOR_SPAN as i64
    }

    fn floor_index(&self, y: i32) -> Option<usize> {
        let index = y.checked_sub(self.lowest_floor)?;
        usize::try_from(index).ok()
    }

    pub fn lowest_floor(&self) -> i32 {
        self.lowest_floor
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Lowest and highest floor numbers that hold at least one sector
    pub fn occupied_floor_range(&self) -> Option<(i32, i32)> {
        let first = self.floors.iter().position(|f| !f.is_empty())?;
        let last = self.floors.iter().rposition(|f| !f.is_empty())?;
        Some((
            self.lowest_floor + first as i32,
            self.lowest_floor + last as i32,
        ))
    }

    pub fn sector_exists(&self, pos: SectorPos) -> bool {
        self.sector(pos).is_some()
    }

    /// Lookup only; never creates floors or sectors
    pub fn sector(&self, pos: SectorPos) -> Option<&Sector> {
        self.floor(pos.y)?.get(pos.z, pos.x)
    }

    /// Mutable access for properties with no cross-sector effect
    /// (textures, flips, door fields). Adjoin state stays behind `GameMap`.
    pub fn sector_mut(&mut self, pos: SectorPos) -> Option<&mut Sector> {
        let index = self.floor_index(pos.y)?;
        self.floors.get_mut(index)?.get_mut(pos.z, pos.x)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.floors.iter().flat_map(|f| f.iter())
    }

    pub fn sector_count(&self) -> usize {
        self.floors.iter().map(|f| f.len()).sum()
    }

    /// Place a new sector at its own coordinate
    pub fn insert_sector(&mut self, sector: Sector) -> EditResult {
        let pos = sector.pos();
        if self.sector_exists(pos) {
            error!("sector already in map at {}", pos);
            return Err(EditError::Occupied(pos));
        }
        if !self.floor_in_range(pos.y) {
            return Err(EditError::FloorOutOfRange(pos.y));
        }
        self.floor_mut(pos.y).insert(sector);
        Ok(())
    }

    /// Sever every adjoin to the neighbors, then delete the sector.
    /// Returns the removed sector, or `None` if the cell was empty.
    pub fn remove_sector(&mut self, pos: SectorPos) -> Option<Sector> {
        if !self.sector_exists(pos) {
            return None;
        }

        self.link_floor(pos, false);
        self.link_ceiling(pos, false);
        for dir in Direction::ALL {
            self.update_wall_pair(pos, dir, |wall| {
                wall.clear_adjoin_flags();
                wall.adjoin = false;
            });
        }

        let index = self.floor_index(pos.y)?;
        self.floors.get_mut(index)?.remove(pos.z, pos.x)
    }

    // ---------------------------------------------------------------------
    // Key registry
    // ---------------------------------------------------------------------

    /// Register a key name; returns false if it was already known
    pub fn add_key(&mut self, key: &str) -> bool {
        if self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    /// Key names in registration order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    // ---------------------------------------------------------------------
    // Walls
    // ---------------------------------------------------------------------

    fn require(&self, pos: SectorPos) -> Result<&Sector, EditError> {
        self.sector(pos).ok_or(EditError::NoSector(pos))
    }

    fn with_sector<R>(
        &mut self,
        pos: SectorPos,
        f: impl FnOnce(&mut Sector) -> R,
    ) -> Result<R, EditError> {
        self.sector_mut(pos).map(f).ok_or(EditError::NoSector(pos))
    }

    /// Apply `f` to this wall and to the facing wall of the neighbor,
    /// skipping whichever side does not exist
    fn update_wall_pair(&mut self, pos: SectorPos, dir: Direction, mut f: impl FnMut(&mut Wall)) {
        let facing = pos.neighbor(dir).map(|p| (p, dir.opposite()));
        for (p, d) in std::iter::once((pos, dir)).chain(facing) {
            if let Some(sector) = self.sector_mut(p) {
                f(sector.wall_mut(d));
            }
        }
    }

    /// Wall must be adjoined and its neighbor present
    fn require_adjoined(&self, pos: SectorPos, dir: Direction) -> EditResult {
        if !self.require(pos)?.wall_adjoin(dir) {
            return Err(EditError::NotAdjoined);
        }
        self.require_neighbor(pos, dir).map(|_| ())
    }

    fn require_neighbor(&self, pos: SectorPos, dir: Direction) -> Result<SectorPos, EditError> {
        let other = pos.neighbor(dir).ok_or(EditError::EdgeOfGrid(pos))?;
        if !self.sector_exists(other) {
            return Err(EditError::NoNeighbor(other));
        }
        Ok(other)
    }

    /// A neighbor exists on the other side of this wall
    pub fn can_adjoin_wall(&self, pos: SectorPos, dir: Direction) -> bool {
        pos.neighbor(dir).is_some_and(|p| self.sector_exists(p))
    }

    /// Connect or disconnect a wall and its neighbor's facing wall.
    ///
    /// Adjoining clears the main texture on both sides. Un-adjoining clears
    /// movement/projectile blocking and adjoin-texture alignment on both sides.
    pub fn set_wall_adjoin(&mut self, pos: SectorPos, dir: Direction, value: bool) -> EditResult {
        self.require(pos)?;
        self.require_neighbor(pos, dir)?;

        self.update_wall_pair(pos, dir, |wall| {
            if value {
                wall.main_texture = None;
            } else {
                wall.clear_adjoin_flags();
            }
            wall.adjoin = value;
        });
        Ok(())
    }

    pub fn set_blocks_movement(&mut self, pos: SectorPos, dir: Direction, value: bool) -> EditResult {
        self.require_adjoined(pos, dir)?;
        self.update_wall_pair(pos, dir, |wall| wall.blocks_movement = value);
        Ok(())
    }

    pub fn set_blocks_projectiles(&mut self, pos: SectorPos, dir: Direction, value: bool) -> EditResult {
        self.require_adjoined(pos, dir)?;
        self.update_wall_pair(pos, dir, |wall| wall.blocks_projectiles = value);
        Ok(())
    }

    /// Adjoin-texture alignment of this side only; requires an adjoined wall
    pub fn set_adj_align_to_floor(&mut self, pos: SectorPos, dir: Direction, value: bool) -> EditResult {
        self.require_adjoined(pos, dir)?;
        self.with_sector(pos, |s| s.wall_mut(dir).adj_align_to_floor = value)
    }

    /// Main-texture alignment; independent of adjoin state
    pub fn set_align_to_floor(&mut self, pos: SectorPos, dir: Direction, value: bool) -> EditResult {
        self.with_sector(pos, |s| s.wall_mut(dir).align_to_floor = value)
    }

    // ---------------------------------------------------------------------
    // Floors and ceilings
    // ---------------------------------------------------------------------

    fn link_floor(&mut self, pos: SectorPos, value: bool) {
        if let Some(s) = self.sector_mut(pos) {
            s.set_floor_adjoin(value);
        }
        if let Some(s) = pos.below().and_then(|p| self.sector_mut(p)) {
            s.set_ceiling_adjoin(value);
        }
    }

    fn link_ceiling(&mut self, pos: SectorPos, value: bool) {
        if let Some(s) = self.sector_mut(pos) {
            s.set_ceiling_adjoin(value);
        }
        if let Some(s) = pos.above().and_then(|p| self.sector_mut(p)) {
            s.set_floor_adjoin(value);
        }
    }

    /// Connect this floor with the ceiling of the sector below.
    ///
    /// Both surfaces must be flush and the lower ceiling must not be sky.
    pub fn set_floor_adjoin(&mut self, pos: SectorPos, value: bool) -> EditResult {
        if !self.require(pos)?.floor().is_flush() {
            return Err(EditError::NotFlush(pos));
        }
        let below = pos.below().ok_or(EditError::EdgeOfGrid(pos))?;
        let under = self.sector(below).ok_or(EditError::NoNeighbor(below))?;
        if !under.ceiling().is_flush() {
            return Err(EditError::NotFlush(below));
        }
        if under.ceiling_is_sky() {
            return Err(EditError::SkyConflict(below));
        }

        self.link_floor(pos, value);
        Ok(())
    }

    /// Connect this ceiling with the floor of the sector above.
    ///
    /// Both surfaces must be flush and this ceiling must not be sky.
    pub fn set_ceiling_adjoin(&mut self, pos: SectorPos, value: bool) -> EditResult {
        let sector = self.require(pos)?;
        if !sector.ceiling().is_flush() {
            return Err(EditError::NotFlush(pos));
        }
        if sector.ceiling_is_sky() {
            return Err(EditError::SkyConflict(pos));
        }
        let above = pos.above().ok_or(EditError::EdgeOfGrid(pos))?;
        let over = self.sector(above).ok_or(EditError::NoNeighbor(above))?;
        if !over.floor().is_flush() {
            return Err(EditError::NotFlush(above));
        }

        self.link_ceiling(pos, value);
        Ok(())
    }

    /// An adjoined ceiling has no surface to show sky on
    pub fn set_ceiling_is_sky(&mut self, pos: SectorPos, value: bool) -> EditResult {
        if self.require(pos)?.ceiling_adjoin() {
            return Err(EditError::SkyConflict(pos));
        }
        self.with_sector(pos, |s| s.set_ceiling_is_sky(value))
    }

    /// Edit the floor height field. Rejected while the floor is adjoined,
    /// which keeps adjoined surfaces flush.
    pub fn edit_floor(&mut self, pos: SectorPos, f: impl FnOnce(&mut Surface)) -> EditResult {
        if self.require(pos)?.floor_adjoin() {
            return Err(EditError::SurfaceAdjoined(pos));
        }
        self.with_sector(pos, |s| f(s.floor_mut()))
    }

    /// Edit the ceiling height field. Rejected while the ceiling is adjoined.
    pub fn edit_ceiling(&mut self, pos: SectorPos, f: impl FnOnce(&mut Surface)) -> EditResult {
        if self.require(pos)?.ceiling_adjoin() {
            return Err(EditError::SurfaceAdjoined(pos));
        }
        self.with_sector(pos, |s| f(s.ceiling_mut()))
    }

    pub fn set_floor_offset(&mut self, pos: SectorPos, corner: Corner, value: i32) -> EditResult {
        self.edit_floor(pos, |s| s.set_offset(corner, value))
    }

    pub fn set_ceiling_offset(&mut self, pos: SectorPos, corner: Corner, value: i32) -> EditResult {
        self.edit_ceiling(pos, |s| s.set_offset(corner, value))
    }

    // ---------------------------------------------------------------------
    // Doors
    // ---------------------------------------------------------------------

    /// Install a default door. Walls on either side are not checked.
    pub fn add_door(&mut self, pos: SectorPos) -> EditResult {
        self.with_sector(pos, Sector::add_door)
    }

    /// Discard the door, if any
    pub fn remove_door(&mut self, pos: SectorPos) -> EditResult {
        self.with_sector(pos, |s| {
            s.remove_door();
        })
    }

    pub fn has_door(&self, pos: SectorPos) -> bool {
        self.sector(pos).is_some_and(Sector::has_door)
    }

    fn with_door(&mut self, pos: SectorPos, f: impl FnOnce(&mut Door)) -> EditResult {
        let sector = self.sector_mut(pos).ok_or(EditError::NoSector(pos))?;
        let door = sector.door_mut().ok_or(EditError::NoDoor(pos))?;
        f(door);
        Ok(())
    }

    /// Swap between north-south and east-west facing
    pub fn toggle_door_orientation(&mut self, pos: SectorPos) -> EditResult {
        self.with_door(pos, |d| d.set_facing_north_south(!d.facing_north_south()))
    }

    /// Position selector: 0 = near, 1 = middle, 2 = far
    pub fn set_door_pos(&mut self, pos: SectorPos, index: u8) -> EditResult {
        let position = DoorPosition::from_index(index).ok_or(EditError::InvalidDoorPosition(index))?;
        self.with_door(pos, |d| d.set_position(position))
    }

    pub fn set_door_vertical(&mut self, pos: SectorPos, vertical: bool) -> EditResult {
        self.with_door(pos, |d| d.set_opens_vertical(vertical))
    }

    /// Type selector: 1 = middle, 2 = down/right, anything else = up/left
    pub fn set_door_type(&mut self, pos: SectorPos, index: i32) -> EditResult {
        self.with_door(pos, |d| d.set_door_type(DoorType::from_index(index)))
    }

    /// Opening time in seconds, clamped to zero
    pub fn set_door_speed(&mut self, pos: SectorPos, seconds: f64) -> EditResult {
        self.with_door(pos, |d| d.set_opening_time(seconds))
    }

    /// Only ever enables shoot-to-open; a `false` request still enables it.
    pub fn set_door_shoot_to_open(&mut self, pos: SectorPos, _requested: bool) -> EditResult {
        self.with_door(pos, |d| d.enable_shoot_to_open())
    }

    pub fn set_door_texture1(&mut self, pos: SectorPos, texture: Option<String>) -> EditResult {
        self.with_door(pos, |d| d.set_texture1(texture))
    }

    pub fn set_door_texture2(&mut self, pos: SectorPos, texture: Option<String>) -> EditResult {
        self.with_door(pos, |d| d.set_texture2(texture))
    }

    /// Lock the door with a key (or unlock with `None`).
    /// The registry is not touched; see `add_key`.
    pub fn set_door_key(&mut self, pos: SectorPos, key: Option<String>) -> EditResult {
        self.with_door(pos, |d| d.set_key(key))
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Check the rules every stored map keeps: adjoin flags come in
    /// matching pairs, blocking and adjoin alignment only sit on adjoined
    /// walls, and adjoined floors and ceilings are flush and never sky.
    pub fn validate(&self) -> Result<(), MapInvariantError> {
        for sector in self.sectors() {
            let pos = sector.pos();
            for dir in Direction::ALL {
                let wall = sector.wall(dir);
                if !wall.adjoin() {
                    if wall.blocks_movement() || wall.blocks_projectiles() || wall.adj_align_to_floor() {
                        return Err(MapInvariantError::FlagsWithoutAdjoin(pos, dir));
                    }
                    continue;
                }
                let matched = pos
                    .neighbor(dir)
                    .and_then(|p| self.sector(p))
                    .is_some_and(|t| t.wall_adjoin(dir.opposite()));
                if !matched {
                    return Err(MapInvariantError::UnmatchedWall(pos, dir));
                }
            }

            if sector.floor_adjoin() {
                let matched = pos
                    .below()
                    .and_then(|p| self.sector(p))
                    .is_some_and(Sector::ceiling_adjoin);
                if !matched {
                    return Err(MapInvariantError::UnmatchedFloor(pos));
                }
                if !sector.floor().is_flush() {
                    return Err(MapInvariantError::AdjoinedFloorNotFlush(pos));
                }
            }

            if sector.ceiling_adjoin() {
                let matched = pos
                    .above()
                    .and_then(|p| self.sector(p))
                    .is_some_and(Sector::floor_adjoin);
                if !matched {
                    return Err(MapInvariantError::UnmatchedCeiling(pos));
                }
                if !sector.ceiling().is_flush() {
                    return Err(MapInvariantError::AdjoinedCeilingNotFlush(pos));
                }
                if sector.ceiling_is_sky() {
                    return Err(MapInvariantError::AdjoinedSky(pos));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(positions: &[(i32, i32, i32)]) -> GameMap {
        let mut map = GameMap::new();
        for &(z, x, y) in positions {
            map.insert_sector(Sector::new(z, x, y)).unwrap();
        }
        map
    }

    const ORIGIN: SectorPos = SectorPos::new(0, 0, 0);

    #[test]
    fn test_new_map_has_default_sector() {
        let map = GameMap::new();
        assert!(map.sector_exists(ORIGIN));
        assert!(!map.sector_exists(SectorPos::new(0, -1, 0)));
        assert_eq!(map.sector_count(), 1);
        assert!(map.keys().is_empty());
    }

    #[test]
    fn test_lookup_does_not_grow() {
        let map = GameMap::new();
        assert!(map.sector(SectorPos::new(0, 0, 5)).is_none());
        assert!(map.sector(SectorPos::new(0, 0, -5)).is_none());
        assert_eq!(map.floor_count(), 1);
        assert_eq!(map.lowest_floor(), 0);
    }

    #[test]
    fn test_floor_growth_is_monotonic() {
        let mut map = GameMap::new();
        map.floor_mut(-3);
        assert_eq!(map.lowest_floor(), -3);
        assert_eq!(map.floor_count(), 4);
        map.floor_mut(4);
        assert_eq!(map.floor_count(), 8);
        map.floor_mut(1);
        assert_eq!(map.floor_count(), 8);

        // Sector on floor 0 survives re-basing
        assert!(map.sector_exists(ORIGIN));
        map.insert_sector(Sector::new(2, 2, -3)).unwrap();
        map.floor_mut(-10);
        assert!(map.sector_exists(SectorPos::new(2, 2, -3)));
        assert!(map.sector_exists(ORIGIN));
        assert_eq!(map.occupied_floor_range(), Some((-3, 0)));
    }

    #[test]
    fn test_double_insert_rejected() {
        let mut map = GameMap::new();
        let err = map.insert_sector(Sector::new(0, 0, 0)).unwrap_err();
        assert_eq!(err, EditError::Occupied(ORIGIN));
        assert_eq!(map.sector_count(), 1);
    }

    #[test]
    fn test_wall_adjoin_requires_neighbor() {
        let mut map = GameMap::new();
        let north = SectorPos::new(0, -1, 0);
        assert!(!map.can_adjoin_wall(ORIGIN, Direction::North));
        let err = map.set_wall_adjoin(ORIGIN, Direction::North, true).unwrap_err();
        assert_eq!(err, EditError::NoNeighbor(north));
        assert!(!map.sector(ORIGIN).unwrap().wall_adjoin(Direction::North));
        assert!(!map.sector_exists(north));
        assert_eq!(
            map.sector(ORIGIN).unwrap().wall(Direction::North).main_texture(),
            Some(crate::world::DEFAULT_TEXTURE)
        );
    }

    #[test]
    fn test_wall_adjoin_is_symmetric() {
        let mut map = map_with(&[(1, 0, 0)]);
        let east = SectorPos::new(1, 0, 0);
        assert!(map.can_adjoin_wall(ORIGIN, Direction::East));

        map.set_wall_adjoin(ORIGIN, Direction::East, true).unwrap();
        let a = map.sector(ORIGIN).unwrap();
        let b = map.sector(east).unwrap();
        assert!(a.wall_adjoin(Direction::East));
        assert!(b.wall_adjoin(Direction::West));
        assert_eq!(a.wall(Direction::East).main_texture(), None);
        assert_eq!(b.wall(Direction::West).main_texture(), None);

        // Clearing from the other side clears both
        map.set_wall_adjoin(east, Direction::West, false).unwrap();
        assert!(!map.sector(ORIGIN).unwrap().wall_adjoin(Direction::East));
        assert!(!map.sector(east).unwrap().wall_adjoin(Direction::West));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_unadjoin_clears_dependent_flags() {
        let mut map = map_with(&[(0, 1, 0)]);
        let south = SectorPos::new(0, 1, 0);
        map.set_wall_adjoin(ORIGIN, Direction::South, true).unwrap();
        map.set_blocks_movement(ORIGIN, Direction::South, true).unwrap();
        map.set_blocks_projectiles(south, Direction::North, true).unwrap();
        map.set_adj_align_to_floor(ORIGIN, Direction::South, true).unwrap();
        map.set_adj_align_to_floor(south, Direction::North, true).unwrap();

        let wall = map.sector(south).unwrap().wall(Direction::North);
        assert!(wall.blocks_movement() && wall.blocks_projectiles());
        let wall = map.sector(ORIGIN).unwrap().wall(Direction::South);
        assert!(wall.blocks_movement() && wall.blocks_projectiles());

        map.set_wall_adjoin(ORIGIN, Direction::South, false).unwrap();
        for (pos, dir) in [(ORIGIN, Direction::South), (south, Direction::North)] {
            let wall = map.sector(pos).unwrap().wall(dir);
            assert!(!wall.adjoin());
            assert!(!wall.blocks_movement());
            assert!(!wall.blocks_projectiles());
            assert!(!wall.adj_align_to_floor());
        }
    }

    #[test]
    fn test_blocking_requires_adjoin() {
        let mut map = map_with(&[(-1, 0, 0)]);
        assert_eq!(
            map.set_blocks_movement(ORIGIN, Direction::West, true),
            Err(EditError::NotAdjoined)
        );
        assert_eq!(
            map.set_adj_align_to_floor(ORIGIN, Direction::West, true),
            Err(EditError::NotAdjoined)
        );
        assert!(!map.sector(ORIGIN).unwrap().wall(Direction::West).blocks_movement());

        // Main alignment never depends on adjoin
        map.set_align_to_floor(ORIGIN, Direction::West, true).unwrap();
        assert!(map.sector(ORIGIN).unwrap().wall(Direction::West).align_to_floor());
    }

    #[test]
    fn test_adj_align_is_one_sided() {
        let mut map = map_with(&[(-1, 0, 0)]);
        let west = SectorPos::new(-1, 0, 0);
        map.set_wall_adjoin(ORIGIN, Direction::West, true).unwrap();
        map.set_adj_align_to_floor(ORIGIN, Direction::West, true).unwrap();
        assert!(map.sector(ORIGIN).unwrap().wall(Direction::West).adj_align_to_floor());
        assert!(!map.sector(west).unwrap().wall(Direction::East).adj_align_to_floor());
    }

    #[test]
    fn test_floor_adjoin_preconditions() {
        let mut map = GameMap::new();
        let below = SectorPos::new(0, 0, -1);

        // No sector below
        assert_eq!(map.set_floor_adjoin(ORIGIN, true), Err(EditError::NoNeighbor(below)));

        map.insert_sector(Sector::at(below)).unwrap();

        // Non-flush floor here
        map.set_floor_offset(ORIGIN, Corner::Center, 1).unwrap();
        assert_eq!(map.set_floor_adjoin(ORIGIN, true), Err(EditError::NotFlush(ORIGIN)));
        map.set_floor_offset(ORIGIN, Corner::Center, 0).unwrap();

        // Non-flush ceiling below
        map.set_ceiling_offset(below, Corner::SouthWest, -1).unwrap();
        assert_eq!(map.set_floor_adjoin(ORIGIN, true), Err(EditError::NotFlush(below)));
        map.set_ceiling_offset(below, Corner::SouthWest, 0).unwrap();

        // Sky below
        map.set_ceiling_is_sky(below, true).unwrap();
        assert_eq!(map.set_floor_adjoin(ORIGIN, true), Err(EditError::SkyConflict(below)));
        assert!(!map.sector(ORIGIN).unwrap().floor_adjoin());
        map.set_ceiling_is_sky(below, false).unwrap();

        map.set_floor_adjoin(ORIGIN, true).unwrap();
        assert!(map.sector(ORIGIN).unwrap().floor_adjoin());
        assert!(map.sector(below).unwrap().ceiling_adjoin());
    }

    #[test]
    fn test_ceiling_adjoin_mirrors_and_blocks_sky() {
        let mut map = map_with(&[(0, 0, 1)]);
        let above = SectorPos::new(0, 0, 1);

        map.set_ceiling_is_sky(ORIGIN, true).unwrap();
        assert_eq!(map.set_ceiling_adjoin(ORIGIN, true), Err(EditError::SkyConflict(ORIGIN)));
        map.set_ceiling_is_sky(ORIGIN, false).unwrap();

        map.set_ceiling_adjoin(ORIGIN, true).unwrap();
        assert!(map.sector(above).unwrap().floor_adjoin());

        // Sky and surface edits are locked while adjoined
        assert_eq!(map.set_ceiling_is_sky(ORIGIN, true), Err(EditError::SkyConflict(ORIGIN)));
        assert_eq!(
            map.set_floor_offset(above, Corner::NorthEast, 1),
            Err(EditError::SurfaceAdjoined(above))
        );
        assert!(!map.sector(ORIGIN).unwrap().ceiling_is_sky());
    }

    #[test]
    fn test_remove_sector_severs_links() {
        let mut map = map_with(&[(0, -1, 0), (1, 0, 0), (0, 0, 1), (0, 0, -1)]);
        map.set_wall_adjoin(ORIGIN, Direction::North, true).unwrap();
        map.set_wall_adjoin(ORIGIN, Direction::East, true).unwrap();
        map.set_blocks_movement(ORIGIN, Direction::East, true).unwrap();
        map.set_ceiling_adjoin(ORIGIN, true).unwrap();
        map.set_floor_adjoin(ORIGIN, true).unwrap();

        let removed = map.remove_sector(ORIGIN).unwrap();
        assert_eq!(removed.pos(), ORIGIN);
        assert!(!map.sector_exists(ORIGIN));

        let north = map.sector(SectorPos::new(0, -1, 0)).unwrap();
        assert!(!north.wall_adjoin(Direction::South));
        let east = map.sector(SectorPos::new(1, 0, 0)).unwrap();
        assert!(!east.wall_adjoin(Direction::West));
        assert!(!east.wall(Direction::West).blocks_movement());
        assert!(!map.sector(SectorPos::new(0, 0, 1)).unwrap().floor_adjoin());
        assert!(!map.sector(SectorPos::new(0, 0, -1)).unwrap().ceiling_adjoin());
        assert!(map.validate().is_ok());

        assert!(map.remove_sector(ORIGIN).is_none());
    }

    #[test]
    fn test_door_lifecycle() {
        let mut map = GameMap::new();
        assert_eq!(map.set_door_speed(ORIGIN, 1.0), Err(EditError::NoDoor(ORIGIN)));

        map.add_door(ORIGIN).unwrap();
        assert!(map.has_door(ORIGIN));
        let door = map.sector(ORIGIN).unwrap().door().unwrap();
        assert_eq!(door.position(), DoorPosition::Middle);
        assert!(door.facing_north_south());

        map.set_door_speed(ORIGIN, -3.0).unwrap();
        map.set_door_type(ORIGIN, 2).unwrap();
        map.toggle_door_orientation(ORIGIN).unwrap();
        assert_eq!(map.set_door_pos(ORIGIN, 5), Err(EditError::InvalidDoorPosition(5)));
        map.set_door_pos(ORIGIN, 0).unwrap();

        let door = map.sector(ORIGIN).unwrap().door().unwrap();
        assert_eq!(door.opening_time(), 0.0);
        assert_eq!(door.door_type(), DoorType::DownRight);
        assert!(!door.facing_north_south());
        assert_eq!(door.position(), DoorPosition::Near);

        map.remove_door(ORIGIN).unwrap();
        assert!(!map.has_door(ORIGIN));
        assert_eq!(map.add_door(SectorPos::new(9, 9, 9)), Err(EditError::NoSector(SectorPos::new(9, 9, 9))));
    }

    #[test]
    fn test_shoot_to_open_only_enables() {
        let mut map = GameMap::new();
        map.add_door(ORIGIN).unwrap();
        map.set_door_shoot_to_open(ORIGIN, false).unwrap();
        assert!(map.sector(ORIGIN).unwrap().door().unwrap().shoot_to_open());
    }

    #[test]
    fn test_sector_at_coordinate_edge() {
        let mut map = GameMap::new();
        let edge = SectorPos::new(i32::MAX, i32::MIN, 0);
        map.insert_sector(Sector::at(edge)).unwrap();

        assert!(!map.can_adjoin_wall(edge, Direction::East));
        assert_eq!(map.set_wall_adjoin(edge, Direction::East, true), Err(EditError::EdgeOfGrid(edge)));
        assert_eq!(map.set_wall_adjoin(edge, Direction::West, true), Err(EditError::NoNeighbor(SectorPos::new(i32::MAX - 1, i32::MIN, 0))));

        assert!(map.remove_sector(edge).is_some());
        assert!(!map.sector_exists(edge));
    }

    #[test]
    fn test_insert_rejects_distant_floor() {
        let mut map = GameMap::new();
        let far = Sector::new(0, 0, i32::MAX);
        assert_eq!(map.insert_sector(far), Err(EditError::FloorOutOfRange(i32::MAX)));
        assert_eq!(map.floor_count(), 1);

        let top = MAX_FLOOR_SPAN as i32 - 1;
        map.insert_sector(Sector::new(0, 0, top)).unwrap();
        assert_eq!(map.floor_count(), MAX_FLOOR_SPAN);
        assert_eq!(map.insert_sector(Sector::new(0, 0, -1)), Err(EditError::FloorOutOfRange(-1)));
    }

    #[test]
    fn test_validate_flags_without_adjoin() {
        let mut map = GameMap::new();
        assert!(map.validate().is_ok());
        map.sector_mut(ORIGIN).unwrap().wall_mut(Direction::North).blocks_movement = true;
        assert_eq!(map.validate(), Err(MapInvariantError::FlagsWithoutAdjoin(ORIGIN, Direction::North)));
    }

    #[test]
    fn test_key_registry_dedupes_in_order() {
        let mut map = GameMap::new();
        assert!(map.add_key("red"));
        assert!(map.add_key("blue"));
        assert!(!map.add_key("red"));
        assert_eq!(map.keys(), &["red".to_string(), "blue".to_string()]);
    }
}
