use edge_launcher::gui::LauncherApp;
use edge_launcher::launcher::Launcher;
use edge_launcher::logging;
use edge_launcher::settings::Settings;
use edge_launcher::usage::UsageStore;

use eframe::egui;

fn main() -> anyhow::Result<()> {
    let config_path = Settings::default_path();
    let (settings, load_error) = match Settings::load(&config_path) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let log_file = settings
        .debug_logging
        .then(|| Settings::config_dir().join("launcher.log"));
    logging::init(settings.debug_logging, log_file);
    if let Some(e) = load_error {
        tracing::warn!("using default settings, could not load {}: {}", config_path.display(), e);
    }

    let usage = UsageStore::open(UsageStore::default_path());
    let launcher = Launcher::from_settings(settings, usage);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Edge Launcher")
            .with_inner_size([420.0, 560.0])
            .with_min_inner_size([320.0, 240.0])
            .with_position([0.0, 80.0])
            .with_decorations(false)
            .with_always_on_top(),
        ..Default::default()
    };

    eframe::run_native(
        "Edge Launcher",
        native_options,
        Box::new(move |_cc| Box::new(LauncherApp::new(launcher))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the launcher window: {e}"))
}
