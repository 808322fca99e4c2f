mod app;
mod tree;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the passive tree dataset JSON.
    #[arg(long)]
    tree_data: PathBuf,

    /// Directory holding the sprite sheets referenced by the dataset.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Saved build to load on startup; also the save target.
    #[arg(long)]
    build: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "passive-planner",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PlannerApp::new(
                cc,
                args.tree_data.clone(),
                args.assets.clone(),
                args.build.clone(),
            )))
        }),
    )
}
