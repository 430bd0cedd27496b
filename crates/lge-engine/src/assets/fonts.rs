use std::collections::HashMap;
use std::fs;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::api::error::{EngineError, Result};

/// A loaded typeface at a fixed pixel size.
pub struct FontFace {
    pub font: Font,
    /// Rasterization size in pixels.
    pub size: f32,
}

/// Named typefaces for canvas text.
pub struct FontManager {
    fonts: HashMap<String, FontFace>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TrueType/OpenType file as `name` at `size` pixels.
    pub fn load_ttf(&mut self, name: &str, path: impl AsRef<Path>, size: f32) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let font = Font::from_bytes(bytes, FontSettings { scale: size, ..FontSettings::default() })
            .map_err(|reason| EngineError::AssetLoad {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            })?;
        log::debug!("fonts: loaded '{}' from {}", name, path.display());
        self.fonts.insert(name.to_string(), FontFace { font, size });
        Ok(())
    }

    /// Register font data already in memory.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8], size: f32) -> Result<()> {
        let font = Font::from_bytes(bytes, FontSettings { scale: size, ..FontSettings::default() })
            .map_err(|reason| EngineError::AssetLoad {
                path: name.into(),
                reason: reason.to_string(),
            })?;
        self.fonts.insert(name.to_string(), FontFace { font, size });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&FontFace> {
        self.fonts.get(name).ok_or_else(|| EngineError::AssetNotFound {
            kind: "font",
            name: name.to_string(),
        })
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_font_is_not_found() {
        let fonts = FontManager::new();
        assert!(matches!(fonts.get("monospace"), Err(EngineError::AssetNotFound { kind: "font", .. })));
    }

    #[test]
    fn garbage_bytes_are_a_load_error() {
        let mut fonts = FontManager::new();
        let err = fonts.load_bytes("broken", b"not a font", 12.0).unwrap_err();
        assert!(matches!(err, EngineError::AssetLoad { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut fonts = FontManager::new();
        let err = fonts.load_ttf("gone", "/definitely/not/here.ttf", 12.0).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
