// Headless board driver: runs a short scripted editing session against a
// file store, exercising save, undo and redo the way the toolbar would.
//
// Usage: board [config.json]

use anyhow::Context;
use board_session::{load_config, FileStore, SessionConfig};
use board_ui::{Editor, Eraser, Label, Pen};
use egui::{pos2, Color32};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "board=info,board_ui=info,board_session=info,board_history=info,warn".into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path).with_context(|| format!("load config {path}"))?,
        None => SessionConfig::default(),
    };
    let store_dir = config
        .store_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("board"));
    info!(store_dir = %store_dir.display(), "using board store");

    let mut editor = Editor::new(FileStore::new(&store_dir), &config)?;
    editor.save_as("scratch")?;

    let pen = Pen::new(2.0, Color32::BLACK);
    editor.apply_tool(&pen, &[pos2(10.0, 10.0), pos2(40.0, 40.0), pos2(80.0, 20.0)])?;
    editor.apply_tool(&Label::new("y = x^2", Color32::DARK_BLUE), &[pos2(50.0, 60.0)])?;
    editor.apply_tool(&Eraser::new(4.0), &[pos2(40.0, 41.0)])?;
    info!(elements = editor.board().len(), "after edits");

    while editor.can_undo() {
        editor.undo()?;
        info!(
            elements = editor.board().len(),
            can_redo = editor.can_redo(),
            "undo"
        );
    }

    while editor.can_redo() {
        editor.redo()?;
        info!(elements = editor.board().len(), "redo");
    }

    editor.save_as("scratch")?;
    info!(
        history = editor.session().history().len(),
        "done; board saved as scratch"
    );
    Ok(())
}
