use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::entity::GameObject;
use crate::core::rect::Rect;

/// Viewport into the world.
///
/// The camera is a game object of its own: it has a position, a size equal
/// to the window and optional bounds that keep it inside the level. It can
/// follow another object by id; the engine calls [`Camera::follow_target`]
/// once per iteration, after pre-render and before composition.
#[derive(Debug, Clone)]
pub struct Camera {
    object: GameObject,
    target: Option<EntityId>,
    /// Center the view on the target (true) or put the target's origin at
    /// the middle of the view (false).
    pub center_on_target: bool,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            object: GameObject::new(0.0, 0.0, width, height).with_name("__camera__"),
            target: None,
            center_on_target: true,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.object.position()
    }

    pub fn size(&self) -> Vec2 {
        self.object.size()
    }

    pub fn rect(&self) -> Rect {
        self.object.rect()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.object.bounds()
    }

    /// Move the view; bounds clamping applies.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.object.set_position(x, y);
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.object.set_bounds(bounds);
    }

    pub fn clear_bounds(&mut self) {
        self.object.clear_bounds();
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn set_target(&mut self, target: EntityId, center: bool) {
        self.target = Some(target);
        self.center_on_target = center;
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Move so the target's anchor sits at the middle of the view. The new
    /// origin is truncated to whole pixels. Does nothing without a target
    /// or when its rectangle is unknown.
    pub fn follow_target(&mut self, target_rect: Option<Rect>) {
        if self.target.is_none() {
            return;
        }
        let Some(rect) = target_rect else {
            return;
        };
        let anchor = if self.center_on_target {
            rect.center()
        } else {
            rect.origin
        };
        let origin = (anchor - self.size() / 2.0).trunc();
        self.object.set_position(origin.x, origin.y);
    }

    /// Strict overlap between `rect` and the view.
    pub fn is_rect_visible(&self, rect: &Rect) -> bool {
        self.object.rect().intersects(rect)
    }
}
