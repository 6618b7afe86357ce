use image::RgbaImage;
use log::info;
use std::path::Path;

/// Writes an image, picking the format from the file extension.
pub fn save_image(image: &RgbaImage, path: &str) -> Result<(), String> {
    image
        .save(Path::new(path))
        .map_err(|e| format!("Failed to save image to '{}': {}", path, e))?;
    info!("Saved {}x{} image to {}", image.width(), image.height(), path);
    Ok(())
}
