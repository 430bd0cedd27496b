//! Debug rendering: opt-in collider outlines.
//!
//! Enable with `Context::show_colliders(Some(color))`. Each enabled
//! collider is stroked one pixel wide, camera-relative, covering
//! `[x, x + w - 1] x [y, y + h - 1]`.

use glam::Vec2;
use image::RgbaImage;

use crate::api::types::Color;
use crate::components::entity::GameObject;
use crate::renderer::canvas::stroke_rect;

/// Outline the world colliders of `object` as seen from `camera_origin`.
/// Objects with colliders disabled are skipped.
pub fn draw_colliders(frame: &mut RgbaImage, object: &GameObject, camera_origin: Vec2, color: Color) {
    if !object.colliders_enabled() {
        return;
    }
    for collider in object.colliders() {
        let p = (collider.origin - camera_origin).as_ivec2();
        let w = collider.width() as i32;
        let h = collider.height() as i32;
        let x1 = p.x.saturating_add(w).saturating_sub(1);
        let y1 = p.y.saturating_add(h).saturating_sub(1);
        stroke_rect(frame, p.x, p.y, x1, y1, color.into());
    }
}
