//! Helpers around the core pipeline: image loading, export, overlays,
//! directory batches and synthetic carriers.

pub mod batch;
pub mod export;
pub mod overlay;
pub mod synthetic;

use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File extensions accepted as carrier photographs (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tiff", "tif", "bmp"];

/// Decode an image file
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Whether `path` has one of the accepted image extensions
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Identifier used in reports and output directories: the file stem
pub fn image_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// All image files below `root`, recursively, sorted by path
pub fn collect_images(root: &Path) -> Result<Vec<PathBuf>> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image_path(&path) {
                images.push(path);
            }
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_path(Path::new("carrier.JPG")));
        assert!(is_image_path(Path::new("a/b/scan.tif")));
        assert!(is_image_path(Path::new("scan.tiff")));
        assert!(!is_image_path(Path::new("scan.gif")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn test_image_id_is_file_stem() {
        assert_eq!(image_id(Path::new("/data/run1/carrier_07.png")), "carrier_07");
    }

    #[test]
    fn test_collect_images_recurses_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        for name in ["b.png", "a.jpeg", "skip.txt", "nested/c.bmp"] {
            fs::write(root.join(name), b"").unwrap();
        }

        let images = collect_images(root).unwrap();
        let names: Vec<String> = images
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpeg", "b.png", "nested/c.bmp"]);
    }
}
