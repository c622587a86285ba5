//! Editor session state
//!
//! One open map, its camera, the current floor and selection. Every edit
//! goes through `GameMap`; failures are reported on the status line.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::EditorConfig;
use crate::world::{
    save_map, Corner, Direction, EditError, EditResult, GameMap, LevelError, Sector, SectorPos,
};
use super::picker::{pick_sector, toggle_wall_selection, Pick, ViewCamera, WallSelection};
use super::surface_preview::SurfaceKind;
use super::textures::TextureDir;

/// What a click on the grid does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Select and create sectors; walls, doors, floor/ceiling links
    Sector,
    /// Select walls for batch texture edits
    Texture,
    /// Edit floor/ceiling height offsets
    Surface,
}

impl DrawMode {
    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Sector => "Sector",
            DrawMode::Texture => "Texture",
            DrawMode::Surface => "Surface",
        }
    }
}

/// How long status messages stay up, in seconds
const STATUS_SECS: f64 = 3.0;

/// Editor state
pub struct EditorState {
    /// The map being edited
    pub map: GameMap,

    /// Current file path (None = unsaved new file)
    pub current_file: Option<PathBuf>,

    pub camera: ViewCamera,

    /// Floor shown in the grid view
    floor: i32,

    /// Sector under the last click, or an empty cell waiting to be created
    current: Option<Pick>,

    /// Walls picked in texture mode
    pub selected_walls: WallSelection,

    mode: DrawMode,

    pub show_grid: bool,

    /// Surface and corner edited in surface mode
    pub surface_kind: SurfaceKind,
    pub corner: Corner,

    pub textures: TextureDir,

    /// Dirty flag (unsaved changes)
    pub dirty: bool,

    /// Status message and seconds left to show it
    status_message: Option<(String, f64)>,

    min_offset: i32,
    max_offset: i32,
    levels_dir: PathBuf,
}

impl EditorState {
    pub fn new(map: GameMap, config: &EditorConfig) -> Self {
        Self {
            map,
            current_file: None,
            camera: ViewCamera::from_config(config),
            floor: 0,
            current: None,
            selected_walls: WallSelection::new(),
            mode: DrawMode::Sector,
            show_grid: true,
            surface_kind: SurfaceKind::Floor,
            corner: Corner::Center,
            textures: TextureDir::from_config(config),
            dirty: false,
            status_message: None,
            min_offset: config.min_surface_offset,
            max_offset: config.max_surface_offset,
            levels_dir: config.levels_dir.clone(),
        }
    }

    /// Create editor state with a file path already set
    pub fn with_file(map: GameMap, config: &EditorConfig, path: PathBuf) -> Self {
        let mut state = Self::new(map, config);
        state.current_file = Some(path);
        state
    }

    /// Replace the map, keeping camera and settings
    pub fn load_map(&mut self, map: GameMap, path: Option<PathBuf>) {
        self.map = map;
        self.current_file = path;
        self.current = None;
        self.selected_walls.clear();
        self.floor = 0;
        self.dirty = false;
    }

    pub fn levels_dir(&self) -> &Path {
        &self.levels_dir
    }

    // ---------------------------------------------------------------------
    // Status line
    // ---------------------------------------------------------------------

    /// Set a status message that will be displayed for a duration
    pub fn set_status(&mut self, message: &str, duration_secs: f64) {
        self.status_message = Some((message.to_string(), duration_secs));
    }

    /// Get current status message if not expired
    pub fn status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// Advance the status timer by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        if let Some((_, remaining)) = &mut self.status_message {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.status_message = None;
            }
        }
    }

    /// Mark dirty on success, show the reason on failure
    fn report(&mut self, result: EditResult) -> EditResult {
        match result {
            Ok(()) => self.dirty = true,
            Err(e) => {
                debug!("edit rejected: {}", e);
                self.set_status(&e.to_string(), STATUS_SECS);
            }
        }
        result
    }

    // ---------------------------------------------------------------------
    // Mode, floor, selection
    // ---------------------------------------------------------------------

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Change draw mode; drops the current sector and wall selection
    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
        self.current = None;
        self.selected_walls.clear();
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    /// Show floor `y`, growing storage so it exists
    pub fn switch_floor(&mut self, y: i32) -> EditResult {
        if !self.map.floor_in_range(y) {
            let e = EditError::FloorOutOfRange(y);
            self.set_status(&e.to_string(), STATUS_SECS);
            return Err(e);
        }
        self.map.floor_mut(y);
        self.floor = y;
        self.current = None;
        self.selected_walls.clear();
        Ok(())
    }

    /// Step `delta` floors up (positive) or down
    pub fn step_floor(&mut self, delta: i32) -> EditResult {
        self.switch_floor(self.floor.saturating_add(delta))
    }

    pub fn current(&self) -> Option<&Pick> {
        self.current.as_ref()
    }

    /// The current pick, if it is a sector in the map
    pub fn current_sector(&self) -> Option<&Sector> {
        match &self.current {
            Some(Pick::Existing(pos)) => self.map.sector(*pos),
            _ => None,
        }
    }

    fn current_pos(&self) -> Result<SectorPos, EditError> {
        match &self.current {
            Some(Pick::Existing(pos)) => Ok(*pos),
            Some(Pick::Candidate(sector)) => Err(EditError::NoSector(sector.pos())),
            None => Err(EditError::NoSelection),
        }
    }

    /// Resolve a click on the canvas according to the draw mode
    pub fn click(&mut self, px: f32, py: f32) {
        match self.mode {
            DrawMode::Sector | DrawMode::Surface => {
                self.current = Some(pick_sector(&self.map, &self.camera, self.floor, px, py));
            }
            DrawMode::Texture => {
                let selection = &mut self.selected_walls;
                if let Some((pos, _)) =
                    toggle_wall_selection(&self.map, &self.camera, self.floor, selection, px, py)
                {
                    self.current = Some(Pick::Existing(pos));
                }
            }
        }
    }

    /// Place the current candidate into the map
    pub fn make_sector(&mut self) -> EditResult {
        let result = match self.current.take() {
            Some(Pick::Candidate(sector)) => {
                let pos = sector.pos();
                let result = self.map.insert_sector(sector);
                self.current = Some(Pick::Existing(pos));
                result
            }
            Some(Pick::Existing(pos)) => {
                self.current = Some(Pick::Existing(pos));
                Err(EditError::Occupied(pos))
            }
            None => Err(EditError::NoSelection),
        };
        self.report(result)
    }

    /// Remove the current sector; its cell becomes a candidate again
    pub fn delete_sector(&mut self) -> EditResult {
        let pos = match self.current_pos() {
            Ok(pos) => pos,
            Err(e) => return self.report(Err(e)),
        };
        self.map.remove_sector(pos);
        self.selected_walls.retain_existing(&self.map);
        self.current = Some(Pick::Candidate(Sector::at(pos)));
        self.report(Ok(()))
    }

    // ---------------------------------------------------------------------
    // Camera
    // ---------------------------------------------------------------------

    pub fn move_cam_h(&mut self, pixels: f32) {
        self.camera.move_h(pixels);
    }

    pub fn move_cam_v(&mut self, pixels: f32) {
        self.camera.move_v(pixels);
    }

    pub fn change_zoom(&mut self, amount: f32, canvas_w: f32, canvas_h: f32) {
        self.camera.change_zoom(amount, canvas_w, canvas_h);
    }

    // ---------------------------------------------------------------------
    // Walls
    // ---------------------------------------------------------------------

    /// Apply an edit to every selected wall; the first failure is reported
    fn for_selected_walls(
        &mut self,
        mut edit: impl FnMut(&mut GameMap, SectorPos, Direction) -> EditResult,
    ) -> EditResult {
        if self.selected_walls.is_empty() {
            return self.report(Err(EditError::NoSelection));
        }

        let walls: Vec<_> = self.selected_walls.iter().collect();
        let mut first_err = None;
        for (pos, dir) in walls {
            if let Err(e) = edit(&mut self.map, pos, dir) {
                first_err.get_or_insert(e);
            }
        }
        self.report(first_err.map_or(Ok(()), Err))
    }

    /// Select every wall of the current sector, or none if all are selected
    pub fn toggle_all_walls(&mut self) -> EditResult {
        match self.current_pos() {
            Ok(pos) => {
                self.selected_walls.toggle_all(pos);
                Ok(())
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// Select exactly the adjoined walls of the current sector
    pub fn select_adjoined_walls(&mut self) -> EditResult {
        match self.current_pos() {
            Ok(pos) => {
                self.selected_walls.select_adjoined(&self.map, pos);
                Ok(())
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// True if every selected wall is adjoined
    pub fn selected_walls_adjoined(&self) -> bool {
        self.selected_walls.iter().all(|(pos, dir)| {
            self.map.sector(pos).is_some_and(|s| s.wall_adjoin(dir))
        })
    }

    /// Adjoin all selected walls, or un-adjoin them if all already are
    pub fn toggle_wall_adjoin(&mut self) -> EditResult {
        let value = !self.selected_walls_adjoined();
        self.for_selected_walls(|map, pos, dir| map.set_wall_adjoin(pos, dir, value))
    }

    pub fn set_blocks_movement(&mut self, value: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| map.set_blocks_movement(pos, dir, value))
    }

    pub fn set_blocks_projectiles(&mut self, value: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| map.set_blocks_projectiles(pos, dir, value))
    }

    pub fn set_align_to_floor(&mut self, value: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| map.set_align_to_floor(pos, dir, value))
    }

    pub fn set_adj_align_to_floor(&mut self, value: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| map.set_adj_align_to_floor(pos, dir, value))
    }

    pub fn set_main_flip(&mut self, horizontal: bool, vertical: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| {
            let sector = map.sector_mut(pos).ok_or(EditError::NoSector(pos))?;
            sector.set_main_flip(dir, horizontal, vertical);
            Ok(())
        })
    }

    pub fn set_adjoin_flip(&mut self, horizontal: bool, vertical: bool) -> EditResult {
        self.for_selected_walls(|map, pos, dir| {
            let sector = map.sector_mut(pos).ok_or(EditError::NoSector(pos))?;
            sector.set_adjoin_flip(dir, horizontal, vertical);
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Textures
    // ---------------------------------------------------------------------

    /// Resolve a texture name, reporting unknown names
    fn resolve_texture(&mut self, name: &str) -> Option<String> {
        let resolved = self.textures.adjust_name(name);
        if resolved.is_none() {
            self.set_status(&format!("No texture named {}", name), STATUS_SECS);
        }
        resolved
    }

    /// Set the main texture of every selected wall; `None` clears it
    pub fn set_main_texture(&mut self, name: Option<&str>) -> bool {
        let texture = match name {
            Some(name) => match self.resolve_texture(name) {
                Some(t) => Some(t),
                None => return false,
            },
            None => None,
        };
        if self.selected_walls.is_empty() {
            return self.report(Err(EditError::NoSelection)).is_ok();
        }
        self.selected_walls.apply_main_texture(&mut self.map, texture.as_deref());
        self.report(Ok(())).is_ok()
    }

    /// Set the adjoin texture of every selected wall; `None` clears it
    pub fn set_adjoin_texture(&mut self, name: Option<&str>) -> bool {
        let texture = match name {
            Some(name) => match self.resolve_texture(name) {
                Some(t) => Some(t),
                None => return false,
            },
            None => None,
        };
        if self.selected_walls.is_empty() {
            return self.report(Err(EditError::NoSelection)).is_ok();
        }
        self.selected_walls.apply_adjoin_texture(&mut self.map, texture.as_deref());
        self.report(Ok(())).is_ok()
    }

    /// Set or clear the floor or ceiling texture of the current sector
    pub fn set_surface_texture(&mut self, kind: SurfaceKind, name: Option<&str>) -> bool {
        let texture = match name {
            Some(name) => match self.resolve_texture(name) {
                Some(t) => Some(t),
                None => return false,
            },
            None => None,
        };
        let result = self.current_pos().and_then(|pos| {
            let sector = self.map.sector_mut(pos).ok_or(EditError::NoSector(pos))?;
            match kind {
                SurfaceKind::Floor => sector.set_floor_texture(texture),
                SurfaceKind::Ceiling => sector.set_ceiling_texture(texture),
            }
            Ok(())
        });
        self.report(result).is_ok()
    }

    // ---------------------------------------------------------------------
    // Floor and ceiling
    // ---------------------------------------------------------------------

    pub fn toggle_floor_adjoin(&mut self) -> EditResult {
        let result = self.current_pos().and_then(|pos| {
            let value = !self.map.sector(pos).is_some_and(Sector::floor_adjoin);
            self.map.set_floor_adjoin(pos, value)
        });
        self.report(result)
    }

    pub fn toggle_ceiling_adjoin(&mut self) -> EditResult {
        let result = self.current_pos().and_then(|pos| {
            let value = !self.map.sector(pos).is_some_and(Sector::ceiling_adjoin);
            self.map.set_ceiling_adjoin(pos, value)
        });
        self.report(result)
    }

    pub fn toggle_sky(&mut self) -> EditResult {
        let result = self.current_pos().and_then(|pos| {
            let value = !self.map.sector(pos).is_some_and(Sector::ceiling_is_sky);
            self.map.set_ceiling_is_sky(pos, value)
        });
        self.report(result)
    }

    /// Set a height offset of the current sector's edited surface,
    /// clamped to the configured range and smoothed into its neighbors
    pub fn set_surface_offset(&mut self, value: i32) -> EditResult {
        let value = value.clamp(self.min_offset, self.max_offset);
        let (kind, corner) = (self.surface_kind, self.corner);
        let result = self.current_pos().and_then(|pos| match kind {
            SurfaceKind::Floor => self.map.edit_floor(pos, |s| s.set_offset_smoothed(corner, value)),
            SurfaceKind::Ceiling => self.map.edit_ceiling(pos, |s| s.set_offset_smoothed(corner, value)),
        });
        self.report(result)
    }

    /// Raise or lower the edited corner by `delta` steps
    pub fn nudge_surface(&mut self, delta: i32) -> EditResult {
        let current = self.current_sector().map(|s| match self.surface_kind {
            SurfaceKind::Floor => s.floor().offset(self.corner),
            SurfaceKind::Ceiling => s.ceiling().offset(self.corner),
        });
        match current {
            Some(offset) => self.set_surface_offset(offset + delta),
            None => {
                let err = self.current_pos().err().unwrap_or(EditError::NoSelection);
                self.report(Err(err))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Doors
    // ---------------------------------------------------------------------

    fn with_current(
        &mut self,
        edit: impl FnOnce(&mut GameMap, SectorPos) -> EditResult,
    ) -> EditResult {
        let result = self.current_pos().and_then(|pos| edit(&mut self.map, pos));
        self.report(result)
    }

    pub fn add_door(&mut self) -> EditResult {
        self.with_current(|map, pos| map.add_door(pos))
    }

    pub fn remove_door(&mut self) -> EditResult {
        self.with_current(|map, pos| map.remove_door(pos))
    }

    pub fn toggle_door_orientation(&mut self) -> EditResult {
        self.with_current(|map, pos| map.toggle_door_orientation(pos))
    }

    pub fn set_door_pos(&mut self, index: u8) -> EditResult {
        self.with_current(|map, pos| map.set_door_pos(pos, index))
    }

    pub fn set_door_vertical(&mut self, vertical: bool) -> EditResult {
        self.with_current(|map, pos| map.set_door_vertical(pos, vertical))
    }

    pub fn set_door_type(&mut self, index: i32) -> EditResult {
        self.with_current(|map, pos| map.set_door_type(pos, index))
    }

    pub fn set_door_shoot_to_open(&mut self, value: bool) -> EditResult {
        self.with_current(|map, pos| map.set_door_shoot_to_open(pos, value))
    }

    /// Parse and apply a door opening time; unparsable text is ignored
    pub fn set_door_speed_text(&mut self, text: &str) -> EditResult {
        match text.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => {
                self.with_current(|map, pos| map.set_door_speed(pos, seconds))
            }
            _ => {
                debug!("ignoring door speed {:?}", text);
                Ok(())
            }
        }
    }

    /// Set both door textures; unknown names leave the door unchanged
    pub fn set_door_textures(&mut self, texture1: &str, texture2: &str) -> bool {
        let (Some(t1), Some(t2)) = (self.resolve_texture(texture1), self.resolve_texture(texture2)) else {
            return false;
        };
        self.with_current(|map, pos| {
            map.set_door_texture1(pos, Some(t1))?;
            map.set_door_texture2(pos, Some(t2))
        })
        .is_ok()
    }

    /// Lock the current door with `key`, registering new key names.
    /// `None` unlocks it; blank names are ignored.
    pub fn choose_door_key(&mut self, key: Option<&str>) -> EditResult {
        let key = match key.map(str::trim) {
            Some("") => {
                self.set_status("Key name cannot be empty", STATUS_SECS);
                return Ok(());
            }
            other => other.map(str::to_string),
        };
        let result = self.current_pos().and_then(|pos| {
            self.map.set_door_key(pos, key.clone())?;
            if let Some(key) = &key {
                self.map.add_key(key);
            }
            Ok(())
        });
        self.report(result)
    }

    // ---------------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------------

    /// Save to the current file
    pub fn save(&mut self) -> Result<(), LevelError> {
        match self.current_file.clone() {
            Some(path) => self.save_as(path),
            None => {
                warn!("no file to save to");
                self.set_status("No file to save to, use Save As", STATUS_SECS);
                Ok(())
            }
        }
    }

    /// Save to `path` and make it the current file
    pub fn save_as(&mut self, path: PathBuf) -> Result<(), LevelError> {
        if let Err(e) = save_map(&self.map, &path) {
            error!("failed to save {}: {}", path.display(), e);
            self.set_status(&format!("Save failed: {}", e), 5.0);
            return Err(e);
        }
        info!("map saved to {}", path.display());
        self.set_status(&format!("Saved to {}", path.display()), STATUS_SECS);
        self.current_file = Some(path);
        self.dirty = false;
        Ok(())
    }
}
