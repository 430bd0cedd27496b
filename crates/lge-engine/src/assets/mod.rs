#[cfg(feature = "audio")]
pub mod audio;
#[cfg(feature = "fonts")]
pub mod fonts;
pub mod images;
pub mod manifest;
pub mod sounds;

/// The asset managers a game draws from.
#[derive(Default)]
pub struct Assets {
    pub images: images::ImageManager,
    #[cfg(feature = "fonts")]
    pub fonts: fonts::FontManager,
    pub sounds: sounds::SoundManager,
}
