mod app;
mod config;
mod persistence;
mod render;
mod server;
mod status;
mod upload;
mod utils;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use eframe::CreationContext;
use tracing_subscriber::EnvFilter;

use crate::app::{PageController, VCardManager};
use crate::config::{Cli, Settings};
use crate::persistence::FileStore;
use crate::server::ServerClient;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli).context("load settings")?;
    tracing::info!(
        server = %settings.server_url,
        data_dir = %settings.data_dir.display(),
        "starting vCard manager"
    );

    let store = FileStore::open(&settings.data_dir).context("open client storage")?;
    let backend = Arc::new(ServerClient::new(&settings).context("build http client")?);
    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    let controller = PageController::new(store, settings.server_url.clone());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("vCard Manager")
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([600.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "vCard Manager",
        options,
        Box::new(move |cc: &CreationContext| {
            Box::new(VCardManager::new(
                cc.egui_ctx.clone(),
                runtime,
                controller,
                backend,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}
