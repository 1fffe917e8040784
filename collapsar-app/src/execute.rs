//! Per-sample execution: build the model, retry seeds, write the output.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use collapsar_core::Grid2;
use collapsar_models::{
    load_tile_set, OverlappingModel, OverlappingSample, SimpleTiledSample, Tile, TileDecl,
    TilingModel, TilingOptions,
};
use log::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::image_io::{self, Color};

/// Seed for the next attempt: consecutive offsets from the configured base
/// seed keep a whole run reproducible, otherwise each attempt is random.
fn attempt_seed(config: &AppConfig, counter: &mut u64) -> u64 {
    let seed = match config.seed {
        Some(base) => base.wrapping_add(*counter),
        None => rand::random(),
    };
    *counter += 1;
    seed
}

/// Generates the configured number of outputs for one overlapping sample,
/// retrying each with fresh seeds on contradiction.
pub fn run_overlapping_sample(
    sample: &OverlappingSample,
    config: &AppConfig,
) -> Result<(), AppError> {
    info!("{} started", sample.name);
    let input = image_io::read_image(&config.samples_dir.join(format!("{}.png", sample.name)))?;

    let mut counter = 0u64;
    for screenshot in 0..sample.screenshots {
        let mut done = false;
        for _ in 0..config.tries {
            let seed = attempt_seed(config, &mut counter);
            let mut model = OverlappingModel::new(input.clone(), sample.options(), seed)?;
            match model.run() {
                Some(output) => {
                    let path = config
                        .output_dir
                        .join(format!("{}{}.png", sample.name, screenshot));
                    image_io::write_image(&path, &output)?;
                    info!("{} finished ({})", sample.name, path.display());
                    done = true;
                    break;
                }
                None => warn!("{}: contradiction, retrying with a new seed", sample.name),
            }
        }
        if !done {
            warn!(
                "{}: gave up on screenshot {} after {} attempts",
                sample.name, screenshot, config.tries
            );
        }
    }
    Ok(())
}

/// Generates the output for one simpletiled sample: loads the tile set and
/// its images, expands the textual neighbor rules, and retries seeds.
pub fn run_simpletiled_sample(
    sample: &SimpleTiledSample,
    config: &AppConfig,
) -> Result<(), AppError> {
    info!("{} ({}) started", sample.name, sample.subset);
    let dir = config.samples_dir.join(&sample.name);
    let data = load_tile_set(&dir.join("data.xml"))?;
    let selected: Option<HashSet<&str>> = data
        .subset_names(&sample.subset)?
        .map(|names| names.iter().map(String::as_str).collect());

    let mut tiles: Vec<Tile<Color>> = Vec::new();
    let mut tile_ids: HashMap<&str, usize> = HashMap::new();
    for decl in &data.tiles {
        if let Some(filter) = &selected {
            if !filter.contains(decl.name.as_str()) {
                continue;
            }
        }
        tile_ids.insert(decl.name.as_str(), tiles.len());
        tiles.push(load_tile(&dir, decl, data.size)?);
    }

    // Rules that reference tiles outside the subset are skipped.
    let mut neighbors = Vec::new();
    for rule in &data.neighbors {
        match (
            tile_ids.get(rule.left.0.as_str()),
            tile_ids.get(rule.right.0.as_str()),
        ) {
            (Some(&left), Some(&right)) => {
                neighbors.push((left, rule.left.1, right, rule.right.1));
            }
            _ => continue,
        }
    }

    let mut counter = 0u64;
    for _ in 0..config.tries {
        let seed = attempt_seed(config, &mut counter);
        let mut model = TilingModel::new(
            tiles.clone(),
            &neighbors,
            sample.out_height,
            sample.out_width,
            TilingOptions {
                periodic_output: sample.periodic_output,
            },
            seed,
        )?;
        match model.run() {
            Some(output) => {
                let path = config
                    .output_dir
                    .join(format!("{}_{}.png", sample.name, sample.subset));
                image_io::write_image(&path, &output)?;
                info!("{} finished ({})", sample.name, path.display());
                return Ok(());
            }
            None => warn!("{}: contradiction, retrying with a new seed", sample.name),
        }
    }
    warn!("{}: gave up after {} attempts", sample.name, config.tries);
    Ok(())
}

/// Loads a tile's orientation images: a single base image when
/// `<name>.png` exists, otherwise one `<name> <i>.png` per orientation.
fn load_tile(dir: &Path, decl: &TileDecl, size: usize) -> Result<Tile<Color>, AppError> {
    let base_path = dir.join(format!("{}.png", decl.name));
    if base_path.exists() {
        let image = image_io::read_image(&base_path)?;
        check_tile_size(&image, size, &base_path)?;
        Ok(Tile::new(image, decl.symmetry, decl.weight))
    } else {
        let mut orientations = Vec::new();
        for i in 0..decl.symmetry.orientation_count() {
            let path = dir.join(format!("{} {}.png", decl.name, i));
            let image = image_io::read_image(&path)?;
            check_tile_size(&image, size, &path)?;
            orientations.push(image);
        }
        Ok(Tile::with_orientations(
            orientations,
            decl.symmetry,
            decl.weight,
        ))
    }
}

fn check_tile_size(image: &Grid2<Color>, size: usize, path: &Path) -> Result<(), AppError> {
    if image.height != size || image.width != size {
        return Err(AppError::Config(format!(
            "image {} is {}x{}, expected {}x{}",
            path.display(),
            image.height,
            image.width,
            size,
            size
        )));
    }
    Ok(())
}
