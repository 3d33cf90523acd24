use clap::Parser;
use std::path::PathBuf;

use crate::detection::DetectionParams;

#[derive(Parser, Debug)]
#[command(name = "grid-reorient")]
#[command(version, about = "Straighten a photographed answer-sheet grid and reorient every cell")]
pub struct Cli {
    /// Input image path
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output path [default: input_grid.png]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of grid rows
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub rows: u32,

    /// Number of grid columns
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub cols: u32,

    /// Neighbourhood size of the adaptive threshold (odd)
    #[arg(long, default_value = "57", value_parser = parse_block_size)]
    pub block_size: u32,

    /// Constant subtracted from the local mean when thresholding
    #[arg(long, default_value = "5")]
    pub offset: f32,

    /// Polygon approximation tolerance as a fraction of the boundary length
    #[arg(long, default_value = "0.01")]
    pub epsilon: f64,

    /// Also write the detected boundary and cell layout drawn over the input
    #[arg(long, value_name = "PATH")]
    pub overlay: Option<PathBuf>,

    /// Show detection details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self.input.file_stem().unwrap_or_default().to_string_lossy();
            let parent = self.input.parent().unwrap_or(std::path::Path::new("."));
            parent.join(format!("{}_grid.png", stem))
        })
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            block_size: self.block_size,
            offset: self.offset,
            epsilon_ratio: self.epsilon,
        }
    }
}

fn parse_block_size(s: &str) -> Result<u32, String> {
    let size: u32 = s
        .parse()
        .map_err(|_| format!("Invalid block size: {}", s))?;
    if size < 3 || size % 2 == 0 {
        return Err(format!("Block size must be odd and at least 3, got {}", size));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["grid-reorient", "scans/sheet.jpg", "-r", "10", "-c", "4"])
            .unwrap();
        assert_eq!((cli.rows, cli.cols), (10, 4));
        assert_eq!(cli.detection_params(), DetectionParams::default());
        assert_eq!(cli.output_path(), PathBuf::from("scans/sheet_grid.png"));
        assert!(cli.overlay.is_none());
    }

    #[test]
    fn test_rejects_zero_rows() {
        assert!(Cli::try_parse_from(["grid-reorient", "a.png", "-r", "0", "-c", "4"]).is_err());
    }

    #[test]
    fn test_rejects_even_block_size() {
        assert_eq!(parse_block_size("57"), Ok(57));
        assert!(parse_block_size("56").is_err());
        assert!(parse_block_size("1").is_err());
        assert!(parse_block_size("x").is_err());
    }
}
