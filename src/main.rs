mod app;

use std::path::PathBuf;

use anyhow::{bail, Result};
use box_annotator::config::{DEFAULT_CSV_FILE_NAME, DEFAULT_EXPORT_ROOT, DEFAULT_WINDOW_FRACTION};
use box_annotator::{window_geometry, Config, ScreenSize};
use clap::Parser;
use eframe::egui;

/// Draw boxes on an image and export their corners to CSV.
#[derive(Parser, Debug)]
#[command(name = "box-annotator", version)]
struct Cli {
    /// Image to open on start-up
    image: Option<PathBuf>,

    /// Screen size the window is laid out for, as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080")]
    screen: ScreenSize,

    /// Share of the screen the window covers
    #[arg(long, default_value_t = DEFAULT_WINDOW_FRACTION)]
    window_fraction: f32,

    /// Folder that receives one sub-folder per export
    #[arg(long, default_value = DEFAULT_EXPORT_ROOT)]
    export_root: PathBuf,

    /// File name of the CSV inside each export folder
    #[arg(long, default_value = DEFAULT_CSV_FILE_NAME)]
    csv_name: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            export_root: cli.export_root,
            csv_file_name: cli.csv_name,
            screen: cli.screen,
            window_fraction: cli.window_fraction,
            initial_image: cli.image,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Some(path) = &cli.image {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
    }
    let config = Config::from(cli);

    let geometry = window_geometry(config.screen, config.window_fraction);
    log::debug!("window geometry {geometry:?}");
    let title = match &config.initial_image {
        Some(path) => format!(
            "Box Annotator - {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "Box Annotator".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([geometry.width as f32, geometry.height as f32])
            .with_position([geometry.x as f32, geometry.y as f32])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(app::AnnotatorApp::new(&cc.egui_ctx, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the annotator: {e}"))
}
