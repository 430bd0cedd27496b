pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::behavior::Behavior;
pub use api::context::Context;
pub use api::engine::{Engine, EngineConfig};
pub use api::error::{EngineError, Result};
pub use api::host::{Display, HeadlessDisplay, HostLink, LoopState};
pub use api::types::{Color, EntityId};
pub use assets::Assets;
pub use assets::images::{ImageManager, ImageOptions};
pub use assets::manifest::AssetManifest;
pub use assets::sounds::{AudioSink, NullSink, PlayerId, SoundManager};
pub use components::entity::{GameObject, Surface};
pub use components::layer::Layer;
pub use components::sprite::SpriteAnimation;
pub use self::core::rect::Rect;
pub use self::core::scene::Scene;
pub use self::core::time::RateMeter;
pub use input::state::{InputEvent, MouseButton};
pub use renderer::{Camera, Canvas};

#[cfg(feature = "fonts")]
pub use assets::fonts::{FontFace, FontManager};
#[cfg(feature = "audio")]
pub use assets::audio::RodioSink;

/// Serializes unit tests that create an [`Engine`]; only one may exist at a
/// time per process.
#[cfg(test)]
pub(crate) fn test_lock() -> parking_lot::MutexGuard<'static, ()> {
    static LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());
    LOCK.lock()
}
