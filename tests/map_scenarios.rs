//! End-to-end editing scenarios against the public API

use sector_editor::config::EditorConfig;
use sector_editor::editor::{pick_sector, DrawMode, EditorState, Pick, ViewCamera};
use sector_editor::world::{
    load_map_from_str, save_map_to_string, Corner, Direction, DoorType, EditError, GameMap,
    LevelError, Sector, SectorPos, DEFAULT_TEXTURE,
};

const ORIGIN: SectorPos = SectorPos::new(0, 0, 0);

/// Zoom at which a cell is 64 pixels with the default cell size range
fn zoom_for_64() -> f32 {
    (48.0f32 / 240.0).sqrt()
}

#[test]
fn adjoin_to_new_north_neighbor() {
    let mut map = GameMap::new();
    assert!(map.sector_exists(ORIGIN));
    assert!(!map.sector_exists(SectorPos::new(0, -1, 0)));

    // z - 1 is west; it does not make the north wall adjoinable
    let west = SectorPos::new(-1, 0, 0);
    map.insert_sector(Sector::at(west)).unwrap();
    assert!(!map.can_adjoin_wall(ORIGIN, Direction::North));
    assert!(map.can_adjoin_wall(ORIGIN, Direction::West));

    let north = ORIGIN.neighbor(Direction::North).unwrap();
    assert_eq!(north, SectorPos::new(0, -1, 0));
    map.insert_sector(Sector::at(north)).unwrap();
    assert!(map.can_adjoin_wall(ORIGIN, Direction::North));

    map.set_wall_adjoin(ORIGIN, Direction::North, true).unwrap();
    let a = map.sector(ORIGIN).unwrap().wall(Direction::North);
    let b = map.sector(north).unwrap().wall(Direction::South);
    assert!(a.adjoin() && b.adjoin());
    assert_eq!(a.main_texture(), None);
    assert_eq!(b.main_texture(), None);
}

#[test]
fn pointer_at_origin_selects_origin_sector() {
    let map = GameMap::new();
    let camera = ViewCamera::at(0.0, 0.0, zoom_for_64());
    assert!((camera.cell_size() - 64.0).abs() < 0.01);
    assert_eq!(pick_sector(&map, &camera, 0, 0.0, 0.0), Pick::Existing(ORIGIN));
}

#[test]
fn rejected_adjoin_leaves_map_unchanged() {
    let mut map = GameMap::new();
    let before = save_map_to_string(&map).unwrap();

    assert_eq!(
        map.set_wall_adjoin(ORIGIN, Direction::West, true),
        Err(EditError::NoNeighbor(SectorPos::new(-1, 0, 0)))
    );
    assert!(!map.sector_exists(SectorPos::new(-1, 0, 0)));
    assert_eq!(save_map_to_string(&map).unwrap(), before);
}

#[test]
fn floor_adjoin_mirrors_and_survives_round_trip() {
    let mut map = GameMap::new();
    let upper = SectorPos::new(0, 0, 1);
    map.insert_sector(Sector::at(upper)).unwrap();

    map.set_ceiling_offset(ORIGIN, Corner::SouthWest, 1).unwrap();
    assert_eq!(map.set_floor_adjoin(upper, true), Err(EditError::NotFlush(ORIGIN)));

    map.set_ceiling_offset(ORIGIN, Corner::SouthWest, 0).unwrap();
    map.set_floor_adjoin(upper, true).unwrap();
    assert!(map.sector(ORIGIN).unwrap().ceiling_adjoin());

    let text = save_map_to_string(&map).unwrap();
    let loaded = load_map_from_str(&text).unwrap();
    assert!(loaded.sector(upper).unwrap().floor_adjoin());
    assert!(loaded.sector(ORIGIN).unwrap().ceiling_adjoin());
}

#[test]
fn removing_a_sector_severs_every_link() {
    let mut map = GameMap::new();
    for dir in Direction::ALL {
        map.insert_sector(Sector::at(ORIGIN.neighbor(dir).unwrap())).unwrap();
        map.set_wall_adjoin(ORIGIN, dir, true).unwrap();
    }
    let above = ORIGIN.above().unwrap();
    map.insert_sector(Sector::at(above)).unwrap();
    map.set_ceiling_adjoin(ORIGIN, true).unwrap();

    map.remove_sector(ORIGIN).unwrap();
    for dir in Direction::ALL {
        let neighbor = map.sector(ORIGIN.neighbor(dir).unwrap()).unwrap();
        assert!(!neighbor.wall_adjoin(dir.opposite()));
    }
    assert!(!map.sector(above).unwrap().floor_adjoin());
    assert!(map.validate().is_ok());
}

#[test]
fn removing_a_sector_at_the_coordinate_edge() {
    let mut map = GameMap::new();
    let corner = SectorPos::new(i32::MIN, i32::MAX, 0);
    let inner = SectorPos::new(i32::MIN + 1, i32::MAX, 0);
    map.insert_sector(Sector::at(corner)).unwrap();
    map.insert_sector(Sector::at(inner)).unwrap();
    map.set_wall_adjoin(corner, Direction::East, true).unwrap();

    assert_eq!(map.set_wall_adjoin(corner, Direction::South, true), Err(EditError::EdgeOfGrid(corner)));
    assert!(map.remove_sector(corner).is_some());
    assert!(!map.sector(inner).unwrap().wall_adjoin(Direction::West));
    assert!(map.validate().is_ok());
}

#[test]
fn overflowing_floor_header_is_rejected() {
    let text = "(lowest_floor: 2147483647, floor_count: 2, keys: [], sectors: [])";
    assert!(matches!(load_map_from_str(text), Err(LevelError::Invalid(_))));
}

#[test]
fn blocking_flag_on_closed_wall_is_rejected() {
    let text = save_map_to_string(&GameMap::new()).unwrap();
    let edited = text.replacen("blocks_movement: false", "blocks_movement: true", 1);
    assert_ne!(text, edited);
    assert!(matches!(load_map_from_str(&edited), Err(LevelError::Invalid(_))));
}

#[test]
fn door_defaults_and_speed_clamp() {
    let mut map = GameMap::new();
    map.add_door(ORIGIN).unwrap();
    map.set_door_speed(ORIGIN, -3.0).unwrap();

    let door = map.sector(ORIGIN).unwrap().door().unwrap();
    assert_eq!(door.position().index(), 1);
    assert!(door.facing_north_south());
    assert!(door.opens_vertical());
    assert_eq!(door.door_type(), DoorType::UpLeft);
    assert!(!door.shoot_to_open());
    assert_eq!(door.texture1(), Some(DEFAULT_TEXTURE));
    assert_eq!(door.key(), None);
    assert_eq!(door.opening_time(), 0.0);
}

#[test]
fn editing_session_builds_a_room() {
    let mut state = EditorState::new(GameMap::new(), &EditorConfig::default());
    state.camera = ViewCamera::at(0.0, 0.0, zoom_for_64());

    // Create the cell east of the origin and open the wall between them
    state.click(96.0, 32.0);
    state.make_sector().unwrap();
    state.set_mode(DrawMode::Texture);
    state.click(60.0, 32.0);
    state.toggle_wall_adjoin().unwrap();
    state.set_blocks_projectiles(true).unwrap();

    let east = state.map.sector(SectorPos::new(1, 0, 0)).unwrap();
    assert!(east.wall_adjoin(Direction::West));
    assert!(east.wall(Direction::West).blocks_projectiles());

    // Put a locked door in it
    state.set_mode(DrawMode::Sector);
    state.click(96.0, 32.0);
    state.add_door().unwrap();
    state.choose_door_key(Some("blue")).unwrap();
    state.set_door_shoot_to_open(false).unwrap();

    let door = state.current_sector().unwrap().door().unwrap();
    assert_eq!(door.key(), Some("blue"));
    assert!(door.shoot_to_open());
    assert_eq!(state.map.keys(), &["blue".to_string()]);
    assert!(state.dirty);
}
