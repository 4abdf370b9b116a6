mod analysis;
mod app;
mod cli;
mod color;
mod data;
mod export;
mod figure;
mod state;
mod stats;
mod summary;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use app::ThroughputViewerApp;
use cli::Cli;
use data::loader;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let descriptors = loader::list_available(&cli.library)?;
    if cli.list {
        loader::print_list(&descriptors);
        return Ok(());
    }

    let mut collection = loader::load_collection(&descriptors)?;
    let analysis = analysis::run(&mut collection, cli.analysis_options())
        .context("analysing drive-test data")?;

    for summary in &analysis.summaries {
        println!("{summary}");
    }

    if let Some(path) = &cli.print {
        export::save_png(&analysis.figure, path)
            .with_context(|| format!("saving figure to {}", path.display()))?;
    }

    if cli.no_window {
        return Ok(());
    }
    show_viewer(AppState::new(cli.title(), analysis))
}

fn show_viewer(state: AppState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Drive-test throughput",
        options,
        Box::new(|_cc| Ok(Box::new(ThroughputViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
