use eframe::egui;
use std::path::PathBuf;

use eepee::prefs::Preferences;
use eepee::ViewerApp;

fn main() {
    let prefs = Preferences::load_or_default();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(prefs.log_level.filter()),
    )
    .init();

    let initial = std::env::args_os().nth(1).map(PathBuf::from);
    if let Some(path) = &initial {
        if !path.exists() {
            log::error!("File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("eepee"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "eepee",
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(prefs, initial)))),
    ) {
        log::error!("Failed to start: {e}");
        std::process::exit(1);
    }
}
