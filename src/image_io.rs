use std::path::{Path, PathBuf};
use std::fs;
use image::{GrayImage, ImageFormat, RgbImage};

use crate::errors::{TriangleError, Result};

/// File extensions accepted as sample images
pub const IMAGE_EXTENSIONS: [&str; 9] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "pgm", "pbm"];

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: GrayImage,
    pub path: PathBuf,
    pub filename: String,
}

impl InputImage {
    /// Wrap an in-memory image; `filename` is used for logs and dump names
    pub fn from_gray(image: GrayImage, filename: &str) -> Self {
        Self {
            image,
            path: PathBuf::from(filename),
            filename: filename.to_string(),
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Get all image files from a directory (recursively), sorted by path
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(TriangleError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(TriangleError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut image_files = Vec::new();
    find_image_files_recursive(dir_path, &mut image_files)?;
    image_files.sort();

    Ok(image_files)
}

/// Helper function to recursively search for image files
fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && is_image_file(&path) {
            result.push(path);
        }
    }

    Ok(())
}

/// Load an image from disk as 8-bit grayscale
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(TriangleError::InvalidPath(path.to_path_buf()));
    }

    // Get filename without extension
    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TriangleError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let image = image::open(path)?.to_luma8();

    Ok(InputImage {
        image,
        path: path.to_path_buf(),
        filename,
    })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Save a grayscale raster as PNG, creating parent directories
pub fn save_image<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a colour debug raster as PNG, creating parent directories
pub fn save_debug_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
