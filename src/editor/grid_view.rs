//! 2D Grid View - top-down floor editing
//!
//! Paints the draw list, the properties panel and the status bar, and turns
//! mouse and keyboard input into editor operations.

use macroquad::prelude::*;
use crate::ui::{Rect, Toolbar, UiContext};
use crate::world::{Corner, Direction, Sector};
use super::draw_list::{DrawList, Stroke};
use super::picker::Pick;
use super::surface_preview::{preview_mesh, SurfaceKind};
use super::{DrawMode, EditorState};

const TOOLBAR_HEIGHT: f32 = 32.0;
const STATUS_HEIGHT: f32 = 22.0;
const PANEL_WIDTH: f32 = 260.0;

/// Pixels panned per frame with the arrow keys
const KEY_PAN: f32 = 8.0;
/// Zoom change per scroll notch
const SCROLL_ZOOM: f32 = 0.05;

const BG_COLOR: Color = Color::new(0.08, 0.08, 0.10, 1.0);
const PANEL_COLOR: Color = Color::new(0.14, 0.14, 0.16, 1.0);
const TEXT_COLOR: Color = Color::new(0.85, 0.85, 0.85, 1.0);
const DIM_TEXT: Color = Color::new(0.55, 0.55, 0.6, 1.0);
const DOOR_COLOR: Color = Color::new(0.75, 0.55, 0.25, 1.0);

/// File-level requests the caller must handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    New,
    Open,
    Save,
    SaveAs,
}

/// Text typed on the status line, and what it will set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    MainTexture,
    AdjoinTexture,
    SurfaceTexture,
    DoorSpeed,
    DoorKey,
    DoorTextures,
}

impl PromptKind {
    fn label(self) -> &'static str {
        match self {
            PromptKind::MainTexture => "Main texture",
            PromptKind::AdjoinTexture => "Adjoin texture",
            PromptKind::SurfaceTexture => "Surface texture",
            PromptKind::DoorSpeed => "Door opening time (s)",
            PromptKind::DoorKey => "Door key",
            PromptKind::DoorTextures => "Door textures (two names)",
        }
    }

    fn wants_texture(self) -> bool {
        !matches!(self, PromptKind::DoorSpeed | PromptKind::DoorKey)
    }
}

/// Texture names starting with the last word typed, at most `limit`
fn completions<'a>(names: &'a [String], text: &str, limit: usize) -> Vec<&'a str> {
    let prefix = text.rsplit(' ').next().unwrap_or("");
    names
        .iter()
        .filter(|n| n.starts_with(prefix))
        .take(limit)
        .map(String::as_str)
        .collect()
}

/// Interaction state of the grid view between frames
#[derive(Default)]
pub struct GridView {
    prompt: Option<(PromptKind, String)>,
    /// Texture directory listing, read when a texture prompt opens
    texture_names: Vec<String>,
    panning: bool,
    last_mouse: (f32, f32),
}

impl GridView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the whole editor into `rect` and handle this frame's input
    pub fn draw(&mut self, ctx: &mut UiContext, rect: Rect, state: &mut EditorState) -> EditorAction {
        let toolbar_rect = rect.slice_top(TOOLBAR_HEIGHT);
        let body = rect.remaining_after_top(TOOLBAR_HEIGHT);
        let status_rect = body.slice_bottom(STATUS_HEIGHT);
        let (canvas, panel) = body.remaining_after_bottom(STATUS_HEIGHT).split_right_px(PANEL_WIDTH);

        let action = self.draw_toolbar(ctx, toolbar_rect, state);
        self.handle_canvas_input(ctx, canvas, state);
        if self.prompt.is_some() {
            self.handle_prompt(state);
        } else {
            self.handle_shortcuts(state, canvas);
        }

        draw_canvas(canvas, state);
        draw_panel(panel, state);
        self.draw_status(status_rect, state);

        action
    }

    fn draw_toolbar(&mut self, ctx: &mut UiContext, rect: Rect, state: &mut EditorState) -> EditorAction {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_COLOR);
        let mut toolbar = Toolbar::new(rect);
        let mut action = EditorAction::None;

        if toolbar.button(ctx, "New", "New map (Ctrl+N)") {
            action = EditorAction::New;
        }
        if toolbar.button(ctx, "Open", "Open map (Ctrl+O)") {
            action = EditorAction::Open;
        }
        if toolbar.button(ctx, "Save", "Save (Ctrl+S)") {
            action = EditorAction::Save;
        }
        if toolbar.button(ctx, "Save As", "Save as (Ctrl+Shift+S)") {
            action = EditorAction::SaveAs;
        }

        toolbar.separator();
        for (mode, tip) in [
            (DrawMode::Sector, "Select and create sectors (1)"),
            (DrawMode::Texture, "Select walls for texturing (2)"),
            (DrawMode::Surface, "Edit floor and ceiling heights (3)"),
        ] {
            if toolbar.button_active(ctx, mode.label(), tip, state.mode() == mode) {
                state.set_mode(mode);
            }
        }

        toolbar.separator();
        if toolbar.button(ctx, "-", "Floor down (PgDn)") {
            let _ = state.step_floor(-1);
        }
        toolbar.label(&format!("Floor {}", state.floor()));
        if toolbar.button(ctx, "+", "Floor up (PgUp)") {
            let _ = state.step_floor(1);
        }

        toolbar.separator();
        let show_grid = state.show_grid;
        if toolbar.button_active(ctx, "Grid", "Toggle grid lines (G)", show_grid) {
            state.show_grid = !show_grid;
        }

        action
    }

    fn handle_canvas_input(&mut self, ctx: &UiContext, canvas: Rect, state: &mut EditorState) {
        let mouse = ctx.mouse;
        let inside = mouse.inside(&canvas);
        let (px, py) = (mouse.x - canvas.x, mouse.y - canvas.y);

        if inside {
            if mouse.scroll != 0.0 {
                state.change_zoom(mouse.scroll.signum() * SCROLL_ZOOM, canvas.w, canvas.h);
            }
            if mouse.left_pressed {
                state.click(px, py);
            }
        }

        // Drag with the right button to pan
        if mouse.right_down && (inside || self.panning) {
            if self.panning {
                state.move_cam_h(self.last_mouse.0 - mouse.x);
                state.move_cam_v(self.last_mouse.1 - mouse.y);
            }
            self.panning = true;
        } else {
            self.panning = false;
        }
        self.last_mouse = (mouse.x, mouse.y);
    }

    fn handle_shortcuts(&mut self, state: &mut EditorState, canvas: Rect) {
        if is_key_down(KeyCode::Left) {
            state.move_cam_h(-KEY_PAN);
        }
        if is_key_down(KeyCode::Right) {
            state.move_cam_h(KEY_PAN);
        }
        if is_key_down(KeyCode::Up) && state.mode() != DrawMode::Surface {
            state.move_cam_v(-KEY_PAN);
        }
        if is_key_down(KeyCode::Down) && state.mode() != DrawMode::Surface {
            state.move_cam_v(KEY_PAN);
        }
        if is_key_pressed(KeyCode::Equal) {
            state.change_zoom(SCROLL_ZOOM, canvas.w, canvas.h);
        }
        if is_key_pressed(KeyCode::Minus) {
            state.change_zoom(-SCROLL_ZOOM, canvas.w, canvas.h);
        }
        if is_key_pressed(KeyCode::PageUp) {
            let _ = state.step_floor(1);
        }
        if is_key_pressed(KeyCode::PageDown) {
            let _ = state.step_floor(-1);
        }
        if is_key_pressed(KeyCode::G) {
            state.show_grid = !state.show_grid;
        }
        if is_key_pressed(KeyCode::Key1) {
            state.set_mode(DrawMode::Sector);
        }
        if is_key_pressed(KeyCode::Key2) {
            state.set_mode(DrawMode::Texture);
        }
        if is_key_pressed(KeyCode::Key3) {
            state.set_mode(DrawMode::Surface);
        }

        if ctrl_down() {
            return;
        }

        // Rejections are already on the status line
        match state.mode() {
            DrawMode::Sector => self.sector_shortcuts(state),
            DrawMode::Texture => self.texture_shortcuts(state),
            DrawMode::Surface => self.surface_shortcuts(state),
        }
    }

    fn sector_shortcuts(&mut self, state: &mut EditorState) {
        let door = state.current_sector().and_then(Sector::door).cloned();

        if is_key_pressed(KeyCode::Enter) {
            let _ = state.make_sector();
        }
        if is_key_pressed(KeyCode::Delete) || is_key_pressed(KeyCode::Backspace) {
            let _ = state.delete_sector();
        }
        if is_key_pressed(KeyCode::F) {
            let _ = state.toggle_floor_adjoin();
        }
        if is_key_pressed(KeyCode::C) {
            let _ = state.toggle_ceiling_adjoin();
        }
        if is_key_pressed(KeyCode::K) {
            let _ = state.toggle_sky();
        }
        if is_key_pressed(KeyCode::D) {
            let _ = if door.is_some() { state.remove_door() } else { state.add_door() };
        }
        if is_key_pressed(KeyCode::O) {
            let _ = state.toggle_door_orientation();
        }
        if is_key_pressed(KeyCode::P) {
            let next = door.as_ref().map_or(1, |d| (d.position().index() + 1) % 3);
            let _ = state.set_door_pos(next);
        }
        if is_key_pressed(KeyCode::T) {
            let next = door.as_ref().map_or(0, |d| (d.door_type().index() + 1) % 3);
            let _ = state.set_door_type(next);
        }
        if is_key_pressed(KeyCode::V) {
            let vertical = door.as_ref().map_or(true, |d| !d.opens_vertical());
            let _ = state.set_door_vertical(vertical);
        }
        if is_key_pressed(KeyCode::H) {
            let _ = state.set_door_shoot_to_open(true);
        }
        if is_key_pressed(KeyCode::S) {
            self.open_prompt(state, PromptKind::DoorSpeed);
        }
        if is_key_pressed(KeyCode::L) {
            self.open_prompt(state, PromptKind::DoorKey);
        }
        if is_key_pressed(KeyCode::X) {
            self.open_prompt(state, PromptKind::DoorTextures);
        }
    }

    fn texture_shortcuts(&mut self, state: &mut EditorState) {
        let first = state
            .selected_walls
            .iter()
            .next()
            .and_then(|(pos, dir)| state.map.sector(pos).map(|s| s.wall(dir).clone()));

        if is_key_pressed(KeyCode::A) {
            let _ = state.toggle_wall_adjoin();
        }
        if is_key_pressed(KeyCode::W) {
            let _ = state.toggle_all_walls();
        }
        if is_key_pressed(KeyCode::E) {
            let _ = state.select_adjoined_walls();
        }
        if let Some(wall) = first {
            if is_key_pressed(KeyCode::B) {
                let _ = state.set_blocks_movement(!wall.blocks_movement());
            }
            if is_key_pressed(KeyCode::P) {
                let _ = state.set_blocks_projectiles(!wall.blocks_projectiles());
            }
            if is_key_pressed(KeyCode::L) {
                let _ = state.set_align_to_floor(!wall.align_to_floor());
            }
            if is_key_pressed(KeyCode::J) {
                let _ = state.set_adj_align_to_floor(!wall.adj_align_to_floor());
            }
            if is_key_pressed(KeyCode::H) {
                let (h, v) = wall.main_flip();
                let _ = state.set_main_flip(!h, v);
            }
            if is_key_pressed(KeyCode::V) {
                let (h, v) = wall.main_flip();
                let _ = state.set_main_flip(h, !v);
            }
        }
        if is_key_pressed(KeyCode::Escape) {
            state.selected_walls.clear();
        }
        if is_key_pressed(KeyCode::M) {
            self.open_prompt(state, PromptKind::MainTexture);
        }
        if is_key_pressed(KeyCode::N) {
            self.open_prompt(state, PromptKind::AdjoinTexture);
        }
        if is_key_pressed(KeyCode::Delete) {
            state.set_main_texture(None);
        }
        if is_key_pressed(KeyCode::F) {
            state.surface_kind = SurfaceKind::Floor;
            self.open_prompt(state, PromptKind::SurfaceTexture);
        }
        if is_key_pressed(KeyCode::C) {
            state.surface_kind = SurfaceKind::Ceiling;
            self.open_prompt(state, PromptKind::SurfaceTexture);
        }
    }

    fn surface_shortcuts(&mut self, state: &mut EditorState) {
        if is_key_pressed(KeyCode::F) {
            state.surface_kind = SurfaceKind::Floor;
        }
        if is_key_pressed(KeyCode::C) {
            state.surface_kind = SurfaceKind::Ceiling;
        }
        if is_key_pressed(KeyCode::Tab) {
            let next = (state.corner.index() + 1) % Corner::ALL.len();
            state.corner = Corner::ALL[next];
        }
        if is_key_pressed(KeyCode::Up) {
            let _ = state.nudge_surface(1);
        }
        if is_key_pressed(KeyCode::Down) {
            let _ = state.nudge_surface(-1);
        }
        if is_key_pressed(KeyCode::Key0) {
            let _ = state.set_surface_offset(0);
        }
    }

    fn open_prompt(&mut self, state: &EditorState, kind: PromptKind) {
        // Drain the key that opened the prompt
        while get_char_pressed().is_some() {}
        if kind.wants_texture() {
            self.texture_names = state.textures.list();
        }
        self.prompt = Some((kind, String::new()));
    }

    fn handle_prompt(&mut self, state: &mut EditorState) {
        if let Some((_, text)) = &mut self.prompt {
            while let Some(c) = get_char_pressed() {
                if !c.is_control() {
                    text.push(c);
                }
            }
            if is_key_pressed(KeyCode::Backspace) {
                text.pop();
            }
            if is_key_pressed(KeyCode::Tab) {
                let first = completions(&self.texture_names, text, 1).first().map(|n| n.to_string());
                if let Some(name) = first {
                    let keep = text.rfind(' ').map_or(0, |i| i + 1);
                    text.truncate(keep);
                    text.push_str(&name);
                }
            }
        }
        if is_key_pressed(KeyCode::Escape) {
            self.prompt = None;
            return;
        }
        if !is_key_pressed(KeyCode::Enter) {
            return;
        }
        let Some((kind, text)) = self.prompt.take() else {
            return;
        };

        let text = text.trim().to_string();
        let name = (!text.is_empty()).then_some(text.as_str());
        match kind {
            PromptKind::MainTexture => {
                state.set_main_texture(name);
            }
            PromptKind::AdjoinTexture => {
                state.set_adjoin_texture(name);
            }
            PromptKind::SurfaceTexture => {
                state.set_surface_texture(state.surface_kind, name);
            }
            PromptKind::DoorSpeed => {
                let _ = state.set_door_speed_text(&text);
            }
            PromptKind::DoorKey => {
                // "-" removes the lock
                let key = if text == "-" { None } else { Some(text.as_str()) };
                let _ = state.choose_door_key(key);
            }
            PromptKind::DoorTextures => {
                let mut names = text.split_whitespace();
                if let (Some(t1), Some(t2)) = (names.next(), names.next()) {
                    state.set_door_textures(t1, t2);
                } else {
                    state.set_status("Two texture names needed", 3.0);
                }
            }
        }
    }

    fn draw_status(&self, rect: Rect, state: &EditorState) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_COLOR);
        let y = rect.y + rect.h - 6.0;

        if let Some((kind, text)) = &self.prompt {
            let line = format!("{}: {}_", kind.label(), text);
            draw_text(&line, rect.x + 6.0, y, 14.0, WHITE);
            if kind.wants_texture() {
                let hint = completions(&self.texture_names, text, 6).join("  ");
                let w = measure_text(&hint, None, 14, 1.0).width;
                draw_text(&hint, rect.right() - w - 6.0, y, 14.0, DIM_TEXT);
            }
            return;
        }

        let file = state
            .current_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let dirty = if state.dirty { "*" } else { "" };
        let left = state.status().map(str::to_string).unwrap_or(format!("{}{}", file, dirty));
        draw_text(&left, rect.x + 6.0, y, 14.0, TEXT_COLOR);

        let right = format!(
            "{} sectors  zoom {:.2}",
            state.map.sector_count(),
            state.camera.zoom()
        );
        let w = measure_text(&right, None, 14, 1.0).width;
        draw_text(&right, rect.right() - w - 6.0, y, 14.0, DIM_TEXT);
    }
}

fn ctrl_down() -> bool {
    is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl)
}

/// Shortcut for a file action, if pressed this frame
pub fn file_shortcut() -> EditorAction {
    if !ctrl_down() {
        return EditorAction::None;
    }
    let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
    if is_key_pressed(KeyCode::N) {
        EditorAction::New
    } else if is_key_pressed(KeyCode::O) {
        EditorAction::Open
    } else if is_key_pressed(KeyCode::S) && shift {
        EditorAction::SaveAs
    } else if is_key_pressed(KeyCode::S) {
        EditorAction::Save
    } else {
        EditorAction::None
    }
}

fn stroke_color(stroke: Stroke) -> Color {
    match stroke {
        Stroke::GridLine => Color::from_rgba(40, 40, 45, 255),
        Stroke::Sector => Color::from_rgba(200, 200, 200, 255),
        Stroke::SelectedSector => Color::from_rgba(255, 200, 100, 255),
        Stroke::SelectedWall => Color::from_rgba(100, 200, 255, 255),
    }
}

fn draw_canvas(rect: Rect, state: &EditorState) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, BG_COLOR);

    // Clip drawing to the canvas
    let dpi = screen_dpi_scale();
    gl_use_default_material();
    unsafe {
        get_internal_gl().quad_gl.scissor(Some((
            (rect.x * dpi) as i32,
            (rect.y * dpi) as i32,
            (rect.w * dpi) as i32,
            (rect.h * dpi) as i32,
        )));
    }

    let list = DrawList::build(state, rect.w, rect.h);
    for door in &list.doors {
        draw_rectangle(rect.x + door.x, rect.y + door.y, door.w, door.h, DOOR_COLOR);
    }
    for seg in &list.segments {
        draw_line(
            rect.x + seg.x1,
            rect.y + seg.y1,
            rect.x + seg.x2,
            rect.y + seg.y2,
            list.line_width,
            stroke_color(seg.stroke),
        );
    }

    unsafe {
        get_internal_gl().quad_gl.scissor(None);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn corner_label(corner: Corner) -> &'static str {
    match corner {
        Corner::NorthEast => "NE",
        Corner::SouthEast => "SE",
        Corner::SouthWest => "SW",
        Corner::NorthWest => "NW",
        Corner::Center => "Center",
    }
}

/// Properties of the current selection, plus the surface preview
fn draw_panel(rect: Rect, state: &EditorState) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_COLOR);
    let inner = rect.pad(8.0);
    let mut lines: Vec<(String, Color)> = Vec::new();
    let mut line = |text: String| lines.push((text, TEXT_COLOR));

    line(format!("{} mode", state.mode().label()));

    match (state.mode(), state.current()) {
        (DrawMode::Texture, _) => {
            line(format!("{} walls selected", state.selected_walls.len()));
            let first = state
                .selected_walls
                .iter()
                .next()
                .and_then(|(pos, dir)| state.map.sector(pos).map(|s| (s.pos(), dir, s.wall(dir).clone())));
            if let Some((pos, dir, wall)) = first {
                line(format!("{} wall of {}", dir.label(), pos));
                line(format!("Adjoined: {}", yes_no(wall.adjoin())));
                line(format!("Main: {}", wall.main_texture().unwrap_or("-")));
                line(format!("Adjoin: {}", wall.adjoin_texture().unwrap_or("-")));
                line(format!("Blocks movement: {}", yes_no(wall.blocks_movement())));
                line(format!("Blocks projectiles: {}", yes_no(wall.blocks_projectiles())));
                line(format!("Align to floor: {}", yes_no(wall.align_to_floor())));
                line(format!("Adj. align to floor: {}", yes_no(wall.adj_align_to_floor())));
            }
        }
        (_, Some(Pick::Candidate(sector))) => {
            line(format!("Empty cell {}", sector.pos()));
            line("Enter to create a sector".to_string());
        }
        (_, Some(Pick::Existing(pos))) => {
            if let Some(sector) = state.map.sector(*pos) {
                line(format!("Sector {}", pos));
                for dir in Direction::ALL {
                    let mark = if sector.wall_adjoin(dir) { "open" } else { "wall" };
                    line(format!("  {}: {}", dir.label(), mark));
                }
                line(format!("Floor adjoin: {}", yes_no(sector.floor_adjoin())));
                line(format!("Ceiling adjoin: {}", yes_no(sector.ceiling_adjoin())));
                line(format!("Sky: {}", yes_no(sector.ceiling_is_sky())));
                line(format!("Floor tex: {}", sector.floor_texture().unwrap_or("-")));
                line(format!("Ceiling tex: {}", sector.ceiling_texture().unwrap_or("-")));
                match sector.door() {
                    Some(door) => {
                        let facing = if door.facing_north_south() { "N-S" } else { "E-W" };
                        line(format!("Door: {} pos {}", facing, door.position().index()));
                        line(format!(
                            "  type {} {}",
                            door.door_type().index(),
                            if door.opens_vertical() { "vertical" } else { "horizontal" }
                        ));
                        line(format!("  time {:.2}s shoot {}", door.opening_time(), yes_no(door.shoot_to_open())));
                        line(format!("  key {}", door.key().unwrap_or("-")));
                    }
                    None => line("No door".to_string()),
                }
            }
        }
        (_, None) => line("Nothing selected".to_string()),
    }

    if state.mode() == DrawMode::Surface {
        line(format!("{} / {}", state.surface_kind.label(), corner_label(state.corner)));
    }

    let mut y = inner.y + 14.0;
    for (text, color) in &lines {
        draw_text(text, inner.x, y, 14.0, *color);
        y += 17.0;
    }

    if state.mode() == DrawMode::Surface {
        if let Some(sector) = state.current_sector() {
            let preview = Rect::new(inner.x, y + 8.0, inner.w, (inner.bottom() - y - 8.0).min(inner.w));
            draw_surface_preview(preview, sector, state.surface_kind, state.corner);
        }
    }

    draw_text("Right-drag pans, wheel zooms", inner.x, inner.bottom(), 12.0, DIM_TEXT);
}

/// Wireframe of the edited surface, projected at an angle
fn draw_surface_preview(rect: Rect, sector: &Sector, kind: SurfaceKind, corner: Corner) {
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, DIM_TEXT);
    let Some(mesh) = preview_mesh(sector, kind) else {
        draw_text("Adjoined, no surface", rect.x + 6.0, rect.y + 18.0, 13.0, DIM_TEXT);
        return;
    };

    let scale = rect.w * 0.3;
    let (cx, cy) = (rect.x + rect.w * 0.5, rect.y + rect.h * 0.55);
    let project = |p: Vec3| vec2(cx + (p.z - p.x) * scale * 0.7, cy + (p.z + p.x) * scale * 0.35 + p.y * scale * 0.25);

    for [a, b, c] in mesh.triangles {
        draw_triangle_lines(
            project(mesh.points[a]),
            project(mesh.points[b]),
            project(mesh.points[c]),
            1.0,
            TEXT_COLOR,
        );
    }
    let marker = project(mesh.points[corner.index()]);
    draw_circle(marker.x, marker.y, 4.0, Color::from_rgba(255, 200, 100, 255));
}
