//! Sector editor binary
//!
//! Opens a window with the grid view, loading a map given on the command line.

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;

use sector_editor::config::EditorConfig;
use sector_editor::editor::{file_shortcut, EditorAction, EditorState, GridView};
use sector_editor::ui::{MouseState, Rect, UiContext};
use sector_editor::world::{load_map, GameMap};
use sector_editor::VERSION;

#[derive(Parser, Debug)]
#[command(name = "sector-editor", version, about = "Grid-based sector/portal map editor")]
struct Args {
    /// Editor configuration file (RON)
    #[arg(long, default_value = "editor.ron")]
    config: PathBuf,

    /// Map file to open
    map: Option<PathBuf>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Sector Editor v{}", VERSION),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Build the initial session from the command line
fn startup(args: &Args) -> anyhow::Result<EditorState> {
    let config = EditorConfig::load(&args.config)?;

    let state = match &args.map {
        Some(path) if path.exists() => {
            let map = load_map(path)?;
            EditorState::with_file(map, &config, path.clone())
        }
        // A new file is created on first save
        Some(path) => EditorState::with_file(GameMap::new(), &config, path.clone()),
        None => EditorState::new(GameMap::new(), &config),
    };
    Ok(state)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut state = match startup(&args) {
        Ok(state) => state,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    info!("=== Sector Editor v{} ===", VERSION);

    let mut ui_ctx = UiContext::new();
    let mut grid_view = GridView::new();
    let mut last_mouse = MouseState::default();

    loop {
        let mouse = MouseState::poll(&last_mouse);
        last_mouse = mouse;
        ui_ctx.begin_frame(mouse);
        state.tick(get_frame_time() as f64);

        clear_background(Color::from_rgba(30, 30, 35, 255));

        let screen = Rect::screen(screen_width(), screen_height());
        let mut action = grid_view.draw(&mut ui_ctx, screen, &mut state);
        if action == EditorAction::None {
            action = file_shortcut();
        }
        handle_editor_action(action, &mut state);

        ui_ctx.draw_tooltip();
        next_frame().await;
    }
}

fn handle_editor_action(action: EditorAction, state: &mut EditorState) {
    match action {
        EditorAction::None => {}
        EditorAction::New => {
            state.load_map(GameMap::new(), None);
            state.set_status("Created new map", 3.0);
        }
        EditorAction::Save => {
            if state.current_file.is_some() {
                // Failures are logged and shown on the status line
                let _ = state.save();
            } else {
                save_as_dialog(state);
            }
        }
        EditorAction::SaveAs => save_as_dialog(state),
        EditorAction::Open => open_dialog(state),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_as_dialog(state: &mut EditorState) {
    let default_dir = state.levels_dir().to_path_buf();
    let _ = std::fs::create_dir_all(&default_dir);

    let dialog = rfd::FileDialog::new()
        .add_filter("RON Map", &["ron"])
        .set_directory(&default_dir)
        .set_file_name("map.ron");

    if let Some(path) = dialog.save_file() {
        let _ = state.save_as(path);
    }
}

#[cfg(target_arch = "wasm32")]
fn save_as_dialog(state: &mut EditorState) {
    log::warn!("save as is not available in the browser");
    state.set_status("Save As not available in browser", 3.0);
}

#[cfg(not(target_arch = "wasm32"))]
fn open_dialog(state: &mut EditorState) {
    let default_dir = state.levels_dir().to_path_buf();
    let dialog = rfd::FileDialog::new()
        .add_filter("RON Map", &["ron"])
        .set_directory(&default_dir);

    if let Some(path) = dialog.pick_file() {
        open_file(state, &path);
    }
}

#[cfg(target_arch = "wasm32")]
fn open_dialog(state: &mut EditorState) {
    log::warn!("open is not available in the browser");
    state.set_status("Open not available in browser", 3.0);
}

fn open_file(state: &mut EditorState, path: &Path) {
    match load_map(path) {
        Ok(map) => {
            state.load_map(map, Some(path.to_path_buf()));
            state.set_status(&format!("Loaded {}", path.display()), 3.0);
        }
        Err(e) => {
            error!("failed to load {}: {}", path.display(), e);
            state.set_status(&format!("Load failed: {}", e), 5.0);
        }
    }
}
