use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;

use crate::api::error::{EngineError, Result};
use crate::api::types::EntityId;
use crate::components::layer::Layer;
use crate::components::sprite::SpriteAnimation;
use crate::core::rect::Rect;

/// A drawable image shared between the asset managers and game objects.
/// Drawing into a shared surface copies it first.
pub type Surface = Arc<RgbaImage>;

/// Fat game object: position, size, colliders and an optional visual.
///
/// Behaviour lives separately in a [`Behavior`](crate::api::behavior::Behavior)
/// so the engine can hand both the object and the engine context to a hook
/// at the same time.
#[derive(Debug, Clone)]
pub struct GameObject {
    id: EntityId,
    name: String,
    tag: String,
    rect: Rect,
    /// Local-space rectangles, relative to `rect.origin`.
    colliders: Vec<Rect>,
    layer: Option<Layer>,
    bounds: Option<Rect>,
    colliders_enabled: bool,
    notify_on_collision: bool,
    pub(crate) surface: Option<Surface>,
    pub(crate) sprite: Option<SpriteAnimation>,
}

impl GameObject {
    /// Create an invisible object with a single collider covering its size.
    /// Negative sizes are treated as zero.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let id = EntityId::next();
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            id,
            name: format!("__no_name__{}", id.0),
            tag: String::new(),
            rect: Rect::new(x, y, width, height),
            colliders: vec![Rect::new(0.0, 0.0, width, height)],
            layer: None,
            bounds: None,
            colliders_enabled: false,
            notify_on_collision: false,
            surface: None,
            sprite: None,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    // -- Builder pattern --

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_collider(mut self, collider: Rect) -> Self {
        self.set_collider(collider);
        self
    }

    pub fn with_colliders_enabled(mut self, enabled: bool, notify_on_collision: bool) -> Self {
        self.enable_collider(enabled, notify_on_collision);
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    // -- Reads --

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The layer assigned when the object was added, `None` while detached.
    pub fn layer(&self) -> Option<Layer> {
        self.layer
    }

    pub fn position(&self) -> Vec2 {
        self.rect.origin
    }

    pub fn x(&self) -> f32 {
        self.rect.x()
    }

    pub fn y(&self) -> f32 {
        self.rect.y()
    }

    pub fn size(&self) -> Vec2 {
        self.rect.size
    }

    pub fn width(&self) -> f32 {
        self.rect.width()
    }

    pub fn height(&self) -> f32 {
        self.rect.height()
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn colliders_enabled(&self) -> bool {
        self.colliders_enabled
    }

    pub fn notify_on_collision(&self) -> bool {
        self.notify_on_collision
    }

    pub fn local_colliders(&self) -> &[Rect] {
        &self.colliders
    }

    /// Colliders translated to world space.
    pub fn colliders(&self) -> impl Iterator<Item = Rect> + '_ {
        let origin = self.rect.origin;
        self.colliders.iter().map(move |c| c.translated(origin))
    }

    // -- Writes --

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn set_surface(&mut self, surface: Option<Surface>) {
        self.surface = surface;
    }

    /// Restrict future position updates to `bounds`. The current position is
    /// left untouched.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    /// Move the object. With bounds set, and only when the object fits inside
    /// them on both axes, each axis is clamped so the whole rectangle stays
    /// inside; the low edge wins over the high edge.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.rect.origin = Vec2::new(x, y);

        let Some(b) = self.bounds else {
            return;
        };
        let r = &mut self.rect;
        if r.width() > b.width() || r.height() > b.height() {
            return;
        }
        if r.origin.x < b.x() {
            r.origin.x = b.x();
        } else if r.origin.x + r.width() >= b.right() {
            r.origin.x = b.right() - r.width();
        }
        if r.origin.y < b.y() {
            r.origin.y = b.y();
        } else if r.origin.y + r.height() >= b.bottom() {
            r.origin.y = b.bottom() - r.height();
        }
    }

    pub fn set_position_vec(&mut self, position: Vec2) {
        self.set_position(position.x, position.y);
    }

    /// Resize the object. Colliders are left as they are.
    pub(crate) fn set_size(&mut self, width: f32, height: f32) {
        self.rect.size = Vec2::new(width.max(0.0), height.max(0.0));
    }

    /// Replace the collider with a single local rectangle.
    pub fn set_collider(&mut self, collider: Rect) {
        self.colliders = vec![collider];
    }

    /// Replace the collider with several local rectangles.
    pub fn set_colliders(&mut self, colliders: &[Rect]) -> Result<()> {
        if colliders.is_empty() {
            return Err(EngineError::EmptyCollider);
        }
        self.colliders = colliders.to_vec();
        Ok(())
    }

    /// Toggle participation in collision detection and whether this object
    /// receives `on_collision` callbacks.
    pub fn enable_collider(&mut self, enabled: bool, notify_on_collision: bool) {
        self.colliders_enabled = enabled;
        self.notify_on_collision = notify_on_collision;
    }

    /// Same layer and any pair of world colliders overlapping.
    /// The enable flags are not consulted here.
    pub fn collides_with(&self, other: &GameObject) -> bool {
        if self.layer != other.layer {
            return false;
        }
        self.colliders()
            .any(|mine| other.colliders().any(|theirs| mine.intersects(&theirs)))
    }

    pub(crate) fn attach(&mut self, layer: Layer) {
        self.layer = Some(layer);
    }

    pub(crate) fn detach(&mut self) {
        self.layer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_layer(rect: Rect, layer: i32) -> GameObject {
        let mut obj = GameObject::from_rect(rect);
        obj.attach(Layer(layer));
        obj
    }

    #[test]
    fn default_collider_covers_size() {
        let obj = GameObject::new(5.0, 6.0, 10.0, 20.0);
        assert_eq!(obj.local_colliders(), &[Rect::new(0.0, 0.0, 10.0, 20.0)]);
        let world: Vec<Rect> = obj.colliders().collect();
        assert_eq!(world, vec![Rect::new(5.0, 6.0, 10.0, 20.0)]);
        assert!(obj.layer().is_none());
    }

    #[test]
    fn auto_names_are_unique() {
        let a = GameObject::new(0.0, 0.0, 1.0, 1.0);
        let b = GameObject::new(0.0, 0.0, 1.0, 1.0);
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("__no_name__"));
    }

    #[test]
    fn negative_size_is_clamped() {
        let obj = GameObject::new(0.0, 0.0, -3.0, 4.0);
        assert_eq!(obj.size(), Vec2::new(0.0, 4.0));
    }

    #[test]
    fn position_is_clamped_into_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let mut obj = GameObject::new(0.0, 0.0, 10.0, 10.0).with_bounds(bounds);

        for (x, y) in [(-20.0, -5.0), (95.0, 45.0), (500.0, -500.0), (42.0, 17.0), (-1.0, 60.0)] {
            obj.set_position(x, y);
            assert!(bounds.contains_rect(&obj.rect()), "({x}, {y}) -> {:?}", obj.rect());
        }

        obj.set_position(-20.0, 100.0);
        assert_eq!(obj.position(), Vec2::new(0.0, 40.0));
    }

    #[test]
    fn in_bounds_position_is_kept() {
        let mut obj = GameObject::new(0.0, 0.0, 10.0, 10.0).with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        obj.set_position(30.0, 40.0);
        assert_eq!(obj.position(), Vec2::new(30.0, 40.0));
    }

    #[test]
    fn set_bounds_does_not_reposition() {
        let mut obj = GameObject::new(500.0, 500.0, 10.0, 10.0);
        obj.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(obj.position(), Vec2::new(500.0, 500.0));
    }

    #[test]
    fn oversized_object_is_not_clamped_on_any_axis() {
        // Wider than bounds but shorter: neither axis is clamped.
        let mut obj = GameObject::new(0.0, 0.0, 200.0, 10.0).with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        obj.set_position(-50.0, -50.0);
        assert_eq!(obj.position(), Vec2::new(-50.0, -50.0));
    }

    #[test]
    fn empty_collider_is_rejected() {
        let mut obj = GameObject::new(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(obj.set_colliders(&[]), Err(EngineError::EmptyCollider)));
        assert_eq!(obj.local_colliders().len(), 1);
    }

    #[test]
    fn collision_is_symmetric() {
        let cases = [
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 10.0, 10.0)),
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(10.0, 0.0, 10.0, 10.0)),
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 50.0, 1.0, 1.0)),
            (Rect::new(0.0, 0.0, 100.0, 2.0), Rect::new(40.0, -10.0, 2.0, 100.0)),
        ];
        for (ra, rb) in cases {
            let a = on_layer(ra, 0);
            let b = on_layer(rb, 0);
            assert_eq!(a.collides_with(&b), b.collides_with(&a), "{ra:?} vs {rb:?}");
        }
    }

    #[test]
    fn different_layers_never_collide() {
        let a = on_layer(Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let b = on_layer(Rect::new(0.0, 0.0, 10.0, 10.0), 1);
        assert!(!a.collides_with(&b));
        assert!(!b.collides_with(&a));
    }

    #[test]
    fn multi_rect_collider_uses_any_pair() {
        let mut a = on_layer(Rect::new(0.0, 0.0, 100.0, 100.0), 2);
        a.set_colliders(&[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(90.0, 90.0, 10.0, 10.0)])
            .unwrap();
        let near_second = on_layer(Rect::new(95.0, 95.0, 10.0, 10.0), 2);
        let in_the_gap = on_layer(Rect::new(40.0, 40.0, 10.0, 10.0), 2);
        assert!(a.collides_with(&near_second));
        assert!(!a.collides_with(&in_the_gap));
    }

    #[test]
    fn collides_ignores_enable_flags() {
        let a = on_layer(Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let b = on_layer(Rect::new(5.0, 5.0, 10.0, 10.0), 0);
        assert!(!a.colliders_enabled());
        assert!(a.collides_with(&b));
    }
}
