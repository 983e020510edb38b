use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use box_annotator::crop_from_csv;
use clap::Parser;

/// Crop every box listed in an exported CSV out of its source image.
#[derive(Parser, Debug)]
#[command(name = "crop-boxes", version)]
struct Cli {
    /// Source image the boxes were drawn on
    image: PathBuf,

    /// CSV written by the annotator
    csv: PathBuf,

    /// Where cropped_NNN.png files go (defaults to the CSV's folder)
    #[arg(long, short)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let out_dir = cli.out_dir.clone().unwrap_or_else(|| {
        cli.csv
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    });

    let written = crop_from_csv(&cli.image, &cli.csv, &out_dir).with_context(|| {
        format!(
            "cropping {} with boxes from {}",
            cli.image.display(),
            cli.csv.display()
        )
    })?;
    println!("Cropped {} boxes into {}", written.len(), out_dir.display());
    Ok(())
}
