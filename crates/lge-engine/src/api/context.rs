use std::path::Path;
use std::sync::Arc;

use glam::{IVec2, Vec2};

use crate::api::behavior::Behavior;
use crate::api::error::{EngineError, Result};
use crate::api::host::{LoopState, Shared};
use crate::api::types::{Color, EntityId};
use crate::assets::images::ImageManager;
use crate::assets::manifest::AssetManifest;
use crate::assets::sounds::SoundManager;
use crate::assets::Assets;
use crate::components::entity::GameObject;
use crate::components::layer::Layer;
use crate::core::rect::Rect;
use crate::core::scene::Scene;
use crate::input::state::MouseButton;
use crate::renderer::camera::Camera;
#[cfg(feature = "fonts")]
use crate::assets::fonts::FontManager;

/// Mutable access to engine state, passed to every behavior hook and to
/// the main hook.
pub struct Context {
    pub(crate) scene: Scene,
    pub(crate) camera: Camera,
    pub(crate) shared: Arc<Shared>,
    pub(crate) collider_color: Option<Color>,
    assets: Assets,
}

impl Context {
    pub(crate) fn new(shared: Arc<Shared>, camera: Camera, collider_color: Option<Color>) -> Self {
        Self {
            scene: Scene::new(),
            camera,
            shared,
            collider_color,
            assets: Assets::default(),
        }
    }

    // -- Objects --

    /// Add `object` to `layer`. It is registered by name right away and
    /// joins the game at the start of the next iteration.
    pub fn add(&mut self, object: GameObject, behavior: impl Behavior + 'static, layer: impl Into<Layer>) -> Result<EntityId> {
        let layer = layer.into();
        let id = self.scene.register(object, Box::new(behavior), layer)?;
        log::trace!("add {:?} to {:?}", id, layer);
        Ok(id)
    }

    /// Add `object` to the screen-fixed GUI layer.
    pub fn add_gui(&mut self, object: GameObject, behavior: impl Behavior + 'static) -> Result<EntityId> {
        self.add(object, behavior, Layer::GUI)
    }

    /// Remove `id` at the start of the next iteration. It keeps taking part
    /// in the rest of the current one.
    pub fn remove(&mut self, id: EntityId) {
        self.scene.request_removal(id);
    }

    pub fn object(&self, id: EntityId) -> Option<&GameObject> {
        self.scene.get(id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.scene.get_mut(id)
    }

    pub fn find_id(&self, name: &str) -> Result<EntityId> {
        self.scene
            .id_of(name)
            .ok_or_else(|| EngineError::EntityNotFound(name.to_string()))
    }

    /// Look an object up by name.
    pub fn find(&self, name: &str) -> Result<&GameObject> {
        let id = self.find_id(name)?;
        self.scene
            .get(id)
            .ok_or_else(|| EngineError::EntityNotFound(name.to_string()))
    }

    pub fn find_mut(&mut self, name: &str) -> Result<&mut GameObject> {
        let id = self.find_id(name)?;
        self.scene
            .get_mut(id)
            .ok_or_else(|| EngineError::EntityNotFound(name.to_string()))
    }

    /// Objects on `layer` whose tag starts with `prefix`.
    pub fn find_by_tag(&self, layer: impl Into<Layer>, prefix: &str) -> Vec<EntityId> {
        self.scene.find_by_tag(layer.into(), prefix)
    }

    /// Number of registered objects, including ones not yet admitted.
    pub fn count(&self) -> usize {
        self.scene.len()
    }

    /// Same-layer objects with colliders enabled that overlap `object`.
    pub fn collisions_of(&self, object: &GameObject) -> Vec<EntityId> {
        self.scene.collisions_of(object)
    }

    /// Read access to every registered object.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    // -- Camera --

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn camera_position(&self) -> Vec2 {
        self.camera.position()
    }

    pub fn camera_size(&self) -> Vec2 {
        self.camera.size()
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32) {
        self.camera.set_position(x, y);
    }

    pub fn set_camera_bounds(&mut self, bounds: Rect) {
        self.camera.set_bounds(bounds);
    }

    /// Follow `id`, centering on it (`center`) or on its origin.
    pub fn set_camera_target(&mut self, id: EntityId, center: bool) {
        self.camera.set_target(id, center);
    }

    pub fn clear_camera_target(&mut self) {
        self.camera.clear_target();
    }

    // -- Input --

    /// Keys never reported read as not pressed.
    pub fn key_pressed(&self, key: &str) -> bool {
        self.shared.input.lock().key_pressed(key)
    }

    /// Left, middle and right button state.
    pub fn mouse_buttons(&self) -> [bool; 3] {
        self.shared.input.lock().buttons()
    }

    pub fn mouse_button(&self, index: usize) -> Result<bool> {
        let button = MouseButton::from_index(index)?;
        Ok(self.shared.input.lock().button(button))
    }

    /// Cursor in window coordinates, `None` while it is outside the window.
    pub fn mouse_position(&self) -> Option<IVec2> {
        self.shared.input.lock().cursor()
    }

    /// Where button `index` was last clicked. Reading the click consumes it.
    pub fn mouse_clicked(&mut self, index: usize) -> Result<Option<IVec2>> {
        let button = MouseButton::from_index(index)?;
        Ok(self.shared.input.lock().take_click(button))
    }

    // -- Timing and debug --

    /// Frames presented per second, averaged over the rate window.
    pub fn fps(&self) -> f32 {
        self.shared.fps.lock().rate()
    }

    /// Loop iterations per second, averaged over the rate window.
    pub fn lps(&self) -> f32 {
        self.shared.lps.lock().rate()
    }

    /// Outline every enabled collider in `color`, or stop with `None`.
    pub fn show_colliders(&mut self, color: Option<Color>) {
        self.collider_color = color;
    }

    /// Stop the loop once the current iteration has finished.
    pub fn quit(&mut self) {
        log::debug!("quit requested");
        self.shared.request_stop();
    }

    pub fn state(&self) -> LoopState {
        self.shared.state()
    }

    // -- Assets --

    pub fn images(&self) -> &ImageManager {
        &self.assets.images
    }

    pub fn images_mut(&mut self) -> &mut ImageManager {
        &mut self.assets.images
    }

    #[cfg(feature = "fonts")]
    pub fn fonts(&self) -> &FontManager {
        &self.assets.fonts
    }

    #[cfg(feature = "fonts")]
    pub fn fonts_mut(&mut self) -> &mut FontManager {
        &mut self.assets.fonts
    }

    pub fn sounds(&self) -> &SoundManager {
        &self.assets.sounds
    }

    pub fn sounds_mut(&mut self) -> &mut SoundManager {
        &mut self.assets.sounds
    }

    /// Load every asset listed in `manifest`, with paths relative to `base`.
    pub fn load_assets(&mut self, manifest: &AssetManifest, base: &Path) -> Result<()> {
        manifest.load_into(base, &mut self.assets)
    }
}
