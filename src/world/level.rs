//! Map loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable map files.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::{GameMap, Sector, MAX_FLOOR_SPAN};

/// Error type for map loading
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    SerializeError(#[from] ron::Error),
    #[error("Invalid map: {0}")]
    Invalid(String),
}

/// On-disk form of a `GameMap`
#[derive(Debug, Serialize, Deserialize)]
pub struct MapFile {
    /// Floor number of the first stored floor
    pub lowest_floor: i32,
    pub floor_count: usize,
    #[serde(default)]
    pub keys: Vec<String>,
    pub sectors: Vec<Sector>,
}

impl MapFile {
    /// Snapshot a map, trimming empty floors at either end
    pub fn from_map(map: &GameMap) -> Self {
        let (lowest_floor, floor_count) = match map.occupied_floor_range() {
            Some((low, high)) => (low, (high - low + 1) as usize),
            None => (0, 1),
        };

        let mut sectors: Vec<Sector> = map.sectors().cloned().collect();
        sectors.sort_by_key(|s| (s.y(), s.z(), s.x()));

        Self {
            lowest_floor,
            floor_count,
            keys: map.keys().to_vec(),
            sectors,
        }
    }

    /// Floor numbers covered by the file, if the header is sound
    fn floor_span(&self) -> Result<(i32, i32), LevelError> {
        if self.floor_count == 0 || self.floor_count > MAX_FLOOR_SPAN {
            return Err(LevelError::Invalid(format!(
                "floor count {} is not within 1..={}",
                self.floor_count, MAX_FLOOR_SPAN
            )));
        }
        let top = i32::try_from(self.floor_count - 1)
            .ok()
            .and_then(|n| self.lowest_floor.checked_add(n))
            .ok_or_else(|| {
                LevelError::Invalid(format!(
                    "{} floors from floor {} run past the highest floor number",
                    self.floor_count, self.lowest_floor
                ))
            })?;
        Ok((self.lowest_floor, top))
    }

    /// Rebuild a map, rejecting bad floor ranges, duplicate cells and
    /// anything `GameMap::validate` refuses
    pub fn into_map(self) -> Result<GameMap, LevelError> {
        let (low, high) = self.floor_span()?;
        let mut map = GameMap::with_floors(low, self.floor_count);

        for key in &self.keys {
            map.add_key(key);
        }

        for sector in self.sectors {
            let pos = sector.pos();
            if !(low..=high).contains(&pos.y) {
                return Err(LevelError::Invalid(format!(
                    "sector at {} lies outside floors {}..={}",
                    pos, low, high
                )));
            }
            if map.insert_sector(sector).is_err() {
                return Err(LevelError::Invalid(format!("duplicate sector at {}", pos)));
            }
        }

        map.validate().map_err(|e| LevelError::Invalid(e.to_string()))?;
        Ok(map)
    }
}

/// Load a map from a RON file
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<GameMap, LevelError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let map = load_map_from_str(&contents)?;
    info!("loaded {} sectors from {}", map.sector_count(), path.as_ref().display());
    Ok(map)
}

/// Save a map to a RON file
pub fn save_map<P: AsRef<Path>>(map: &GameMap, path: P) -> Result<(), LevelError> {
    let contents = save_map_to_string(map)?;
    fs::write(path.as_ref(), contents)?;
    info!("saved {} sectors to {}", map.sector_count(), path.as_ref().display());
    Ok(())
}

/// Serialize a map to a RON string
pub fn save_map_to_string(map: &GameMap) -> Result<String, LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    Ok(ron::ser::to_string_pretty(&MapFile::from_map(map), config)?)
}

/// Load a map from a RON string (for embedded maps or testing)
pub fn load_map_from_str(s: &str) -> Result<GameMap, LevelError> {
    let file: MapFile = ron::from_str(s)?;
    file.into_map()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Corner, Direction, SectorPos};

    fn sample_map() -> GameMap {
        let mut map = GameMap::new();
        let origin = SectorPos::new(0, 0, 0);
        let east = SectorPos::new(1, 0, 0);
        map.insert_sector(Sector::at(east)).unwrap();
        map.insert_sector(Sector::new(0, 0, 2)).unwrap();
        map.set_wall_adjoin(origin, Direction::East, true).unwrap();
        map.set_blocks_projectiles(origin, Direction::East, true).unwrap();
        map.set_ceiling_offset(origin, Corner::Center, -1).unwrap();
        map.add_door(east).unwrap();
        map.set_door_key(east, Some("gold".to_string())).unwrap();
        map.add_key("gold");
        map
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.ron");
        let map = sample_map();

        save_map(&map, &path).unwrap();
        let loaded = load_map(&path).unwrap();

        assert_eq!(loaded.sector_count(), 3);
        assert_eq!(loaded.keys(), map.keys());
        for sector in map.sectors() {
            assert_eq!(loaded.sector(sector.pos()), Some(sector));
        }
    }

    #[test]
    fn test_empty_floors_are_trimmed() {
        let mut map = sample_map();
        map.floor_mut(-4);
        map.floor_mut(7);

        let file = MapFile::from_map(&map);
        assert_eq!(file.lowest_floor, 0);
        assert_eq!(file.floor_count, 3);
    }

    #[test]
    fn test_load_rejects_one_sided_adjoin() {
        let mut file = MapFile::from_map(&GameMap::new());
        file.sectors[0].set_floor_adjoin(true);
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let mut file = MapFile::from_map(&GameMap::new());
        file.sectors.push(Sector::new(0, 0, 0));
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_floor_number_overflow() {
        let text = "(lowest_floor: 2147483647, floor_count: 2, keys: [], sectors: [])";
        assert!(matches!(load_map_from_str(text), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_bad_floor_counts() {
        for count in [0, MAX_FLOOR_SPAN + 1, usize::MAX] {
            let text = format!("(lowest_floor: 0, floor_count: {}, keys: [], sectors: [])", count);
            assert!(matches!(load_map_from_str(&text), Err(LevelError::Invalid(_))));
        }
    }

    #[test]
    fn test_load_rejects_sector_outside_floors() {
        let mut file = MapFile::from_map(&GameMap::new());
        file.sectors.push(Sector::new(0, 0, 2_000_000_000));
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));

        let mut file = MapFile::from_map(&GameMap::new());
        file.lowest_floor = 1;
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_load_keeps_negative_floors() {
        let mut map = GameMap::new();
        map.insert_sector(Sector::new(0, 0, -3)).unwrap();
        let loaded = load_map_from_str(&save_map_to_string(&map).unwrap()).unwrap();
        assert_eq!(loaded.lowest_floor(), -3);
        assert_eq!(loaded.floor_count(), 4);
        assert!(loaded.sector_exists(SectorPos::new(0, 0, -3)));
    }

    #[test]
    fn test_load_rejects_blocking_without_adjoin() {
        let mut file = MapFile::from_map(&GameMap::new());
        file.sectors[0].wall_mut(Direction::North).blocks_movement = true;
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));

        let mut file = MapFile::from_map(&GameMap::new());
        file.sectors[0].wall_mut(Direction::East).adj_align_to_floor = true;
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));
    }

    /// Two stacked sectors with floor and ceiling adjoined
    fn stacked_file() -> MapFile {
        let mut map = GameMap::new();
        map.insert_sector(Sector::new(0, 0, 1)).unwrap();
        map.set_ceiling_adjoin(SectorPos::new(0, 0, 0), true).unwrap();
        let file = MapFile::from_map(&map);
        assert_eq!(file.sectors.len(), 2);
        file
    }

    #[test]
    fn test_load_rejects_adjoined_surface_not_flush() {
        assert!(stacked_file().into_map().is_ok());

        let mut file = stacked_file();
        file.sectors[1].floor_mut().set_offset(Corner::NorthEast, 1);
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));

        let mut file = stacked_file();
        file.sectors[0].ceiling_mut().set_offset(Corner::Center, -1);
        assert!(matches!(file.into_map(), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_adjoined_sky() {
        let mut file = stacked_file();
        file.sectors[0].set_ceiling_is_sky(true);
        let err = file.into_map().unwrap_err();
        assert!(err.to_string().contains("sky"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_map(dir.path().join("nope.ron"));
        assert!(matches!(result, Err(LevelError::IoError(_))));
    }
}
