// Application entry point for HDD Doctor

use clap::Parser;
use hdd_doctor::config::{AppConfig, Cli, Command};
use hdd_doctor::error::ScanError;
use hdd_doctor::{console, gui};
use log::error;

/// Entry point for the application.
/// Parses the command line, sets up logging and runs the chosen front-end.
fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from(&cli);

    let code = match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(config),
        Command::Scan { device } => exit_code(console::run_scan(&config, device.as_deref())),
        Command::Report { attributes, info } => exit_code(console::run_report(&attributes, &info)),
    };
    std::process::exit(code);
}

/// Initializes the eframe window and launches the GUI.
fn run_gui(config: AppConfig) -> i32 {
    // Configure window options with fixed size of 1200x760 pixels
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_resizable(false),
        ..Default::default()
    };

    let result = eframe::run_native(
        "HDD Doctor",
        options,
        Box::new(|cc| Ok(Box::new(gui::AppState::new(cc, config)))),
    );
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("GUI failed: {}", e);
            1
        }
    }
}

fn exit_code(result: Result<(), ScanError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}
