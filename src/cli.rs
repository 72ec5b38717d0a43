use std::path::PathBuf;

use clap::Parser;

/// Base DPI that maps to a zoom factor of 1.0.
pub const BASE_DPI: u32 = 100;

#[derive(Parser, Debug)]
#[command(name = "benchplot")]
#[command(about = "Visualize matrix-multiplication benchmark JSON")]
#[command(version)]
pub struct Cli {
    /// Input JSON file (quote names with parentheses)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Figure DPI; 100 is the native scale
    #[arg(short, long, default_value_t = BASE_DPI, value_parser = clap::value_parser!(u32).range(25..=400))]
    pub window_size: u32,

    /// Optional schema file mapping algorithms to their columns
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Print a summary of the parsed data and exit without opening a window
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    pub fn zoom_factor(&self) -> f32 {
        self.window_size as f32 / BASE_DPI as f32
    }
}
