use anyhow::{Context, Result};
use clap::Parser;
use image::{DynamicImage, ImageReader};
use tracing_subscriber::EnvFilter;

use grid_reorient::{analyze, draw_layout, render, Cli, ContourDetector, GridShape};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load input image
    let img = ImageReader::open(&cli.input)
        .with_context(|| format!("Failed to open input file: {:?}", cli.input))?
        .decode()
        .with_context(|| format!("Failed to decode image: {:?}", cli.input))?
        .to_rgba8();

    if cli.verbose {
        eprintln!("Loaded image: {:?} ({}x{})", cli.input, img.width(), img.height());
        eprintln!("Grid: {} rows x {} cols", cli.rows, cli.cols);
        eprintln!();
    }

    let shape = GridShape::new(cli.rows, cli.cols)?;
    let detector = ContourDetector::new(cli.detection_params())?;

    // Locate the grid boundary and its cells
    let layout = analyze(&detector, &img, shape).context("Failed to locate the grid")?;

    eprintln!(
        "Grid corners: TL=({:.0}, {:.0}) TR=({:.0}, {:.0}) BL=({:.0}, {:.0}) BR=({:.0}, {:.0})",
        layout.quad.top_left.x,
        layout.quad.top_left.y,
        layout.quad.top_right.x,
        layout.quad.top_right.y,
        layout.quad.bottom_left.x,
        layout.quad.bottom_left.y,
        layout.quad.bottom_right.x,
        layout.quad.bottom_right.y,
    );

    if let Some(overlay_path) = &cli.overlay {
        DynamicImage::ImageRgba8(draw_layout(&img, &layout))
            .to_rgb8()
            .save(overlay_path)
            .with_context(|| format!("Failed to save overlay: {:?}", overlay_path))?;
        eprintln!("Saved overlay: {:?}", overlay_path);
    }

    // Rotate every cell, then crop and orient the grid
    let corrected = render(&img, &layout).context("Failed to reorient grid cells")?;

    let output_path = cli.output_path();
    DynamicImage::ImageRgba8(corrected)
        .to_rgb8()
        .save(&output_path)
        .with_context(|| format!("Failed to save output: {:?}", output_path))?;

    eprintln!("Saved corrected image: {:?}", output_path);
    Ok(())
}
