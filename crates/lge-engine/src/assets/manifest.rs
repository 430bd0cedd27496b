use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::error::Result;
use crate::assets::images::ImageOptions;
use crate::assets::Assets;

/// Asset manifest describing every image sequence, font and sound a game
/// loads at startup. Paths are relative to the directory passed to
/// [`AssetManifest::load_into`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Image sequences: name → file pattern + transform.
    #[serde(default)]
    pub images: BTreeMap<String, ImageDescriptor>,
    /// Fonts: name → TTF file + pixel size.
    #[serde(default)]
    pub fonts: BTreeMap<String, FontDescriptor>,
    /// Sound clips: name → file.
    #[serde(default)]
    pub sounds: BTreeMap<String, SoundDescriptor>,
}

/// Describes an image sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// File pattern, e.g. `"images/Betty/idle-*.png"`.
    pub pattern: String,
    #[serde(flatten)]
    pub options: ImageOptions,
}

/// Describes a TrueType font.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub path: String,
    #[serde(default = "default_font_size")]
    pub size: f32,
}

/// Describes an audio asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    pub path: String,
}

fn default_font_size() -> f32 {
    12.0
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load every listed asset into the managers, stopping at the first
    /// failure.
    pub fn load_into(&self, base: &Path, assets: &mut Assets) -> Result<()> {
        for (name, desc) in &self.images {
            assets.images.load(name, base.join(&desc.pattern), desc.options)?;
        }
        #[cfg(feature = "fonts")]
        {
            for (name, desc) in &self.fonts {
                assets.fonts.load_ttf(name, base.join(&desc.path), desc.size)?;
            }
        }
        #[cfg(not(feature = "fonts"))]
        {
            if !self.fonts.is_empty() {
                log::warn!("manifest lists {} font(s) but the `fonts` feature is disabled", self.fonts.len());
            }
        }
        for (name, desc) in &self.sounds {
            assets.sounds.load(name, base.join(&desc.path))?;
        }
        log::info!(
            "assets: {} image sequence(s), {} font(s), {} sound(s) loaded",
            self.images.len(),
            self.fonts.len(),
            self.sounds.len()
        );
        Ok(())
    }
}
