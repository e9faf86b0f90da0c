use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::app::{PersistedDesktopSettings, SETTINGS_STORAGE_KEY};
use ui::{RentalDeskApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "rental-desk", about = "Desktop client for the car rental platform")]
struct Args {
    /// Rental server base URL, e.g. http://127.0.0.1:8080
    #[arg(long)]
    server_url: Option<String>,
    /// Directory holding the persisted session file
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut startup = StartupConfig::default();
    if let Some(server_url) = args.server_url {
        startup.server_url = server_url;
    }
    startup.data_dir = args.data_dir;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(startup.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rental Desk")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rental Desk",
        options,
        Box::new(|cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(RentalDeskApp::new(
                cmd_tx,
                ui_rx,
                persisted_settings,
                startup,
            )))
        }),
    )
}
