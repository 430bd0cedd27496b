//! Image-sequence visuals for game objects.
//!
//! A sprite cycles through the frames of a named sequence held by the
//! [`ImageManager`]. Switching frames resizes the object and resets its
//! collider to the frame's full size.

use crate::api::error::{EngineError, Result};
use crate::assets::images::ImageManager;
use crate::components::entity::{GameObject, Surface};
use crate::core::rect::Rect;

/// Animation state for an object showing an image sequence.
#[derive(Debug, Clone)]
pub struct SpriteAnimation {
    /// Name of the sequence in the image manager.
    pub sequence: String,
    frames: Vec<Surface>,
    /// Current frame index.
    pub index: usize,
    /// Time accumulated since the last frame change.
    pub elapsed: f32,
}

impl SpriteAnimation {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl GameObject {
    /// Create an object showing the first frame of `sequence` at (x, y).
    pub fn sprite(images: &ImageManager, sequence: &str, x: f32, y: f32) -> Result<Self> {
        let mut obj = GameObject::new(x, y, 0.0, 0.0);
        obj.set_image(images, sequence, None)?;
        Ok(obj)
    }

    /// Show `sequence`. With `index` unset the current frame index is kept;
    /// an index past the end of the sequence wraps to 0.
    /// Returns the frame index now shown.
    pub fn set_image(&mut self, images: &ImageManager, sequence: &str, index: Option<usize>) -> Result<usize> {
        let switch = self
            .sprite
            .as_ref()
            .map_or(true, |s| s.sequence != sequence);
        if switch {
            let frames = images.get(sequence)?.to_vec();
            if frames.is_empty() {
                return Err(EngineError::AssetNotFound {
                    kind: "image",
                    name: sequence.to_string(),
                });
            }
            let (index, elapsed) = self.sprite.as_ref().map_or((0, 0.0), |s| (s.index, s.elapsed));
            self.sprite = Some(SpriteAnimation {
                sequence: sequence.to_string(),
                frames,
                index,
                elapsed,
            });
        }

        let Some(sprite) = self.sprite.as_mut() else {
            return Ok(0);
        };
        let mut idx = index.unwrap_or(sprite.index);
        if idx >= sprite.frames.len() {
            idx = 0;
        }
        sprite.index = idx;
        self.show_frame();
        Ok(idx)
    }

    /// Advance to the next frame once `delay` seconds have accumulated.
    /// Returns the frame index now shown (0 for objects without a sprite).
    pub fn next_image(&mut self, dt: f32, delay: f32) -> usize {
        let Some(sprite) = self.sprite.as_mut() else {
            return 0;
        };
        sprite.elapsed += dt;
        if sprite.elapsed < delay {
            return sprite.index;
        }
        sprite.elapsed = 0.0;
        sprite.index = (sprite.index + 1) % sprite.frames.len();
        let idx = sprite.index;
        self.show_frame();
        idx
    }

    pub fn image_sequence(&self) -> Option<&str> {
        self.sprite.as_ref().map(|s| s.sequence.as_str())
    }

    pub fn image_index(&self) -> usize {
        self.sprite.as_ref().map_or(0, |s| s.index)
    }

    pub fn animation(&self) -> Option<&SpriteAnimation> {
        self.sprite.as_ref()
    }

    fn show_frame(&mut self) {
        let Some(frame) = self.sprite.as_ref().map(|s| s.frames[s.index].clone()) else {
            return;
        };
        let (w, h) = (frame.width() as f32, frame.height() as f32);
        self.surface = Some(frame);
        self.set_size(w, h);
        self.set_collider(Rect::new(0.0, 0.0, w, h));
    }
}
