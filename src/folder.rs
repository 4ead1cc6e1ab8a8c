//! Image folders as lazily decoded image sources.

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::source::ImageSource;

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a path has a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Discover image files in a folder, non-recursively, sorted by name.
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>, String> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(folder)
        .map_err(|e| format!("Failed to read folder {:?}: {}", folder, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    if images.is_empty() {
        return Err(format!("No image files found in {:?}", folder));
    }

    // Sort by filename for consistent ordering
    images.sort();
    log::info!("Found {} images in {:?}", images.len(), folder);
    Ok(images)
}

/// Decode an image file to grayscale values in `0.0..=1.0`, shaped (height, width).
pub fn load_grayscale(path: &Path) -> Result<Array2<f32>, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open image {:?}: {}", path, e))?
        .to_luma32f();
    let (width, height) = img.dimensions();
    Array2::from_shape_vec((height as usize, width as usize), img.into_raw())
        .map_err(|e| format!("Unexpected pixel buffer for {:?}: {}", path, e))
}

/// Image source over the files of a folder.
///
/// Files are decoded on demand, one at a time. A file that fails to decode is
/// shown as a single black pixel and logged.
pub fn folder_source(folder: &Path) -> Result<ImageSource<Array2<f32>>, String> {
    let paths = list_images(folder)?;
    let count = paths.len();
    Ok(ImageSource::from_fn(move |index| {
        let path = &paths[index];
        log::debug!("Decoding {:?}", path);
        load_grayscale(path).unwrap_or_else(|e| {
            log::warn!("{}", e);
            Array2::zeros((1, 1))
        })
    })
    .with_count(count))
}
