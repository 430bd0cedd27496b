use glam::IVec2;
use image::imageops;
use image::{Rgba, RgbaImage};

use crate::api::types::{Color, EntityId};
use crate::components::entity::GameObject;
use crate::core::scene::Scene;
use crate::renderer::camera::Camera;
use crate::systems::debug::draw_colliders;

/// Compose one frame.
///
/// World layers are drawn back to front, relative to the camera, skipping
/// objects outside the view. The GUI layer is drawn last at raw window
/// coordinates. With `collider_color` set, enabled colliders of world
/// objects are outlined on top of their own surface.
pub fn compose_frame(
    frame: &mut RgbaImage,
    scene: &Scene,
    camera: &Camera,
    background: Color,
    collider_color: Option<Color>,
) {
    let bg: Rgba<u8> = background.into();
    for p in frame.pixels_mut() {
        *p = bg;
    }

    let view = camera.rect();
    let mut gui: &[EntityId] = &[];
    for (layer, ids) in scene.layers() {
        if layer.is_gui() {
            gui = ids;
            continue;
        }
        for id in ids {
            let Some(obj) = scene.get(*id) else {
                continue;
            };
            if !camera.is_rect_visible(&obj.rect()) {
                continue;
            }
            blit(frame, obj, (obj.position() - view.origin).as_ivec2());
            if let Some(color) = collider_color {
                draw_colliders(frame, obj, view.origin, color);
            }
        }
    }

    for id in gui {
        if let Some(obj) = scene.get(*id) {
            blit(frame, obj, obj.position().as_ivec2());
        }
    }
}

fn blit(frame: &mut RgbaImage, obj: &GameObject, at: IVec2) {
    if let Some(surface) = obj.surface() {
        imageops::overlay(frame, &**surface, i64::from(at.x), i64::from(at.y));
    }
}
