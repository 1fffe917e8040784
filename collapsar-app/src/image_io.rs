//! Bitmap decode/encode at the application boundary.

use std::path::Path;

use collapsar_core::Grid2;
use image::RgbImage;

use crate::error::AppError;

/// One 24-bit RGB pixel. Equality is byte-exact.
pub type Color = [u8; 3];

/// Reads an image into a pixel grid, discarding any alpha channel.
pub fn read_image(path: &Path) -> Result<Grid2<Color>, AppError> {
    let image = image::open(path)?.to_rgb8();
    let (width, height) = image.dimensions();
    let data: Vec<Color> = image.pixels().map(|p| p.0).collect();
    Ok(Grid2::from_vec(height as usize, width as usize, data))
}

/// Writes a pixel grid as PNG.
pub fn write_image(path: &Path, grid: &Grid2<Color>) -> Result<(), AppError> {
    let raw: Vec<u8> = grid.data().iter().flatten().copied().collect();
    let image = RgbImage::from_raw(grid.width as u32, grid.height as u32, raw)
        .ok_or_else(|| AppError::Config("pixel buffer does not match dimensions".to_string()))?;
    image.save(path)?;
    Ok(())
}
