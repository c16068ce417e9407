#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod api;
mod app;
mod config;
mod model;
mod state;
mod ui;
mod worker;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::TimelineClient;
use crate::config::SettingsStore;

/// Interactive timeline for ClickPM projects.
#[derive(Parser, Debug)]
#[command(name = "clickpm-timeline", version, about)]
struct Cli {
    /// Server root, e.g. http://localhost:8000
    #[arg(long)]
    base_url: Option<String>,

    /// Project to open
    #[arg(long)]
    project: Option<u64>,

    /// JWT access token
    #[arg(long, env = "CLICKPM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Use this settings file instead of the one in the config directory
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,clickpm_timeline=info")),
        )
        .init();

    let cli = Cli::parse();
    let store = match cli.settings {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::new(),
    };
    let mut settings = store.load();
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(project) = cli.project {
        settings.project_id = project;
    }
    if cli.token.is_some() {
        settings.access_token = cli.token;
    }
    info!(
        base_url = %settings.base_url,
        project_id = settings.project_id,
        settings = %store.path().display(),
        "starting"
    );

    let mut client = TimelineClient::new(&settings.base_url, settings.request_timeout())?;
    client.set_auth(settings.access_token.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("ClickPM Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "ClickPM Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::TimelineApp::new(cc, settings, store, client)))),
    )?;
    Ok(())
}
