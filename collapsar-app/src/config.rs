use clap::Parser;
use std::path::PathBuf;

/// Configuration for the collapsar application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Path to the XML file listing the samples to generate.
    #[arg(short, long, value_name = "FILE", default_value = "samples.xml")]
    pub config_path: PathBuf,

    /// Directory containing the sample images and tile sets.
    #[arg(long, value_name = "DIR", default_value = "samples")]
    pub samples_dir: PathBuf,

    /// Directory where generated images are written.
    #[arg(short, long, value_name = "DIR", default_value = "results")]
    pub output_dir: PathBuf,

    /// Optional base seed; attempt k of a sample uses base + k. Seeds are
    /// random when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum generation attempts per output before giving up.
    #[arg(long, default_value_t = 10)]
    pub tries: usize,

    /// Only run the sample with this name.
    #[arg(long, value_name = "NAME")]
    pub only: Option<String>,
}
