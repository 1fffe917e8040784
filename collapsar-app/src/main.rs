// collapsar-app/src/main.rs

use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use crate::config::AppConfig;
use crate::execute;
use crate::logging;
use collapsar_models::load_samples_config;

pub fn main() -> Result<()> {
    logging::init_logger();

    let config = AppConfig::parse();
    log::info!("Collapsar starting");
    log::debug!("Loaded config: {:?}", config);

    let start = Instant::now();
    let samples = load_samples_config(&config.config_path)?;
    log::info!(
        "Loaded {} overlapping and {} simpletiled samples from {:?}",
        samples.overlapping.len(),
        samples.simpletiled.len(),
        config.config_path
    );

    std::fs::create_dir_all(&config.output_dir)?;

    let mut ran = 0usize;
    for sample in &samples.overlapping {
        if config.only.as_ref().is_some_and(|only| *only != sample.name) {
            continue;
        }
        execute::run_overlapping_sample(sample, &config)?;
        ran += 1;
    }
    for sample in &samples.simpletiled {
        if config.only.as_ref().is_some_and(|only| *only != sample.name) {
            continue;
        }
        execute::run_simpletiled_sample(sample, &config)?;
        ran += 1;
    }

    if ran == 0 {
        log::warn!("no samples matched the requested filter");
    }
    log::info!("All samples done in {:?}", start.elapsed());
    Ok(())
}
