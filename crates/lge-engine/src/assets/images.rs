use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::UVec2;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, Result};
use crate::components::entity::Surface;

/// How loaded images are transformed before they are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Scale factor; ignored when not positive.
    pub scale: f32,
    /// Explicit size, used when no scale is given.
    pub size: Option<[u32; 2]>,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Named image sequences, loaded once and shared by every sprite.
pub struct ImageManager {
    images: HashMap<String, Vec<Surface>>,
}

impl ImageManager {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
        }
    }

    /// Load every file matching `pattern` (e.g. `assets/hero_*.png`) as the
    /// sequence `name`, in file-name order. Returns the number of frames.
    pub fn load(&mut self, name: &str, pattern: impl AsRef<Path>, options: ImageOptions) -> Result<usize> {
        let pattern = pattern.as_ref();
        let files = expand_pattern(pattern)?;
        if files.is_empty() {
            return Err(EngineError::AssetLoad {
                path: pattern.to_path_buf(),
                reason: "no file matches the pattern".to_string(),
            });
        }

        let mut frames = Vec::with_capacity(files.len());
        for file in &files {
            let image = image::open(file)?.to_rgba8();
            frames.push(transform(image, options));
        }
        log::debug!("images: loaded {} frame(s) as '{}'", frames.len(), name);
        self.insert(name, frames)
    }

    /// Register already decoded frames under `name`, replacing any previous
    /// sequence with that name.
    pub fn insert(&mut self, name: &str, frames: Vec<RgbaImage>) -> Result<usize> {
        if frames.is_empty() {
            return Err(EngineError::AssetLoad {
                path: PathBuf::from(name),
                reason: "an image sequence needs at least one frame".to_string(),
            });
        }
        let count = frames.len();
        self.images
            .insert(name.to_string(), frames.into_iter().map(Arc::new).collect());
        Ok(count)
    }

    /// All frames of the sequence `name`.
    pub fn get(&self, name: &str) -> Result<&[Surface]> {
        self.images
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::AssetNotFound {
                kind: "image",
                name: name.to_string(),
            })
    }

    /// First frame of the sequence `name`.
    pub fn first(&self, name: &str) -> Result<Surface> {
        self.get(name).map(|frames| frames[0].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Fully opaque black image.
    pub fn opaque(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    /// Fully transparent image.
    pub fn translucent(width: u32, height: u32) -> RgbaImage {
        RgbaImage::new(width, height)
    }
}

impl Default for ImageManager {
    fn default() -> Self {
        Self::new()
    }
}

fn transform(image: RgbaImage, options: ImageOptions) -> RgbaImage {
    let (w, h) = image.dimensions();
    let target = if options.scale > 0.0 {
        UVec2::new(
            (w as f32 * options.scale).round() as u32,
            (h as f32 * options.scale).round() as u32,
        )
    } else if let Some([sw, sh]) = options.size {
        UVec2::new(sw, sh)
    } else {
        UVec2::new(w, h)
    };

    let mut image = if target == UVec2::new(w, h) {
        image
    } else {
        imageops::resize(&image, target.x.max(1), target.y.max(1), FilterType::CatmullRom)
    };
    if options.flip_x {
        imageops::flip_horizontal_in_place(&mut image);
    }
    if options.flip_y {
        imageops::flip_vertical_in_place(&mut image);
    }
    image
}

/// Expand a `dir/pattern` path where the file-name part is a glob (`*`,
/// `?`, `[...]`). The directory part is taken literally. Results are
/// sorted and only regular files are kept.
fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>> {
    let bad_pattern = |reason: String| EngineError::AssetLoad {
        path: pattern.to_path_buf(),
        reason,
    };
    let file_pattern = pattern
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| bad_pattern("pattern has no file name".to_string()))?;
    let full = match pattern.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let dir = dir
                .to_str()
                .ok_or_else(|| bad_pattern("directory is not valid UTF-8".to_string()))?;
            format!("{}/{}", glob::Pattern::escape(dir), file_pattern)
        }
        _ => file_pattern.to_string(),
    };

    let mut files = Vec::new();
    for entry in glob::glob(&full).map_err(|e| bad_pattern(e.to_string()))? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
