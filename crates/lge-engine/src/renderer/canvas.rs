//! Immediate-mode drawing into a game object's surface.
//!
//! Coordinates are relative to the surface and truncated to whole pixels.
//! Shapes are alpha-blended; [`Canvas::fill`] overwrites.

use std::ops::Range;
use std::sync::Arc;

use glam::Vec2;
use image::imageops;
use image::{Pixel, Rgba, RgbaImage};

use crate::api::types::Color;
use crate::assets::images::ImageManager;
use crate::components::entity::GameObject;
#[cfg(feature = "fonts")]
use crate::assets::fonts::FontFace;

/// Drawing handle borrowed from a [`GameObject`].
pub struct Canvas<'a> {
    surface: &'a mut RgbaImage,
}

impl GameObject {
    /// Object with a transparent surface of its own size, ready to draw on.
    pub fn new_canvas(x: f32, y: f32, width: f32, height: f32) -> Self {
        let surface = ImageManager::translucent(width.max(0.0) as u32, height.max(0.0) as u32);
        GameObject::new(x, y, width, height).with_surface(Arc::new(surface))
    }

    /// Draw into this object's surface. A surface still shared with the
    /// image manager or another object is copied first.
    /// Returns `None` when the object has no surface.
    pub fn canvas(&mut self) -> Option<Canvas<'_>> {
        self.surface.as_mut().map(|s| Canvas {
            surface: Arc::make_mut(s),
        })
    }
}

impl<'a> Canvas<'a> {
    pub fn new(surface: &'a mut RgbaImage) -> Self {
        Self { surface }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let px: Rgba<u8> = color.into();
        for p in self.surface.pixels_mut() {
            *p = px;
        }
    }

    pub fn draw_point(&mut self, position: Vec2, color: Color) {
        let p = position.as_ivec2();
        blend_pixel(self.surface, p.x, p.y, color.into());
    }

    /// Rectangle at `position`. Filled rectangles cover `size` pixels; an
    /// outline is stroked along `position` and `position + size`.
    pub fn draw_rect(&mut self, position: Vec2, size: Vec2, color: Color, outline: bool) {
        let p = position.as_ivec2();
        let s = size.as_ivec2();
        if outline {
            stroke_rect(
                self.surface,
                p.x,
                p.y,
                p.x.saturating_add(s.x),
                p.y.saturating_add(s.y),
                color.into(),
            );
        } else {
            let px = color.into();
            let (xs, ys) = clip(self.surface, p.x, p.y, p.x.saturating_add(s.x), p.y.saturating_add(s.y));
            for y in ys {
                for x in xs.clone() {
                    blend_pixel(self.surface, x, y, px);
                }
            }
        }
    }

    /// Circle inscribed in the `diameter`-sized square whose top-left corner
    /// is `position`.
    pub fn draw_circle(&mut self, position: Vec2, diameter: f32, color: Color, outline: bool) {
        let p = position.as_ivec2();
        let d = diameter as i32;
        if d <= 0 {
            return;
        }
        let r = d as f32 / 2.0;
        let center = Vec2::new(p.x as f32 + r, p.y as f32 + r);
        let px = color.into();

        let (xs, ys) = clip(
            self.surface,
            p.x,
            p.y,
            p.x.saturating_add(d).saturating_add(1),
            p.y.saturating_add(d).saturating_add(1),
        );
        for y in ys {
            for x in xs.clone() {
                let dist = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let hit = if outline {
                    (dist - r).abs() <= 0.5
                } else {
                    dist <= r
                };
                if hit {
                    blend_pixel(self.surface, x, y, px);
                }
            }
        }
    }

    /// Alpha-blend `image` with its top-left corner at `position`.
    pub fn draw_surface(&mut self, position: Vec2, image: &RgbaImage) {
        let p = position.as_ivec2();
        imageops::overlay(self.surface, image, i64::from(p.x), i64::from(p.y));
    }

    /// Render `text` on a single line with its top-left corner at `position`.
    #[cfg(feature = "fonts")]
    pub fn draw_text(&mut self, text: &str, position: Vec2, font: &FontFace, color: Color) {
        let p = position.as_ivec2();
        let ascent = font
            .font
            .horizontal_line_metrics(font.size)
            .map_or(font.size, |m| m.ascent);
        let baseline = p.y + ascent.round() as i32;
        let mut pen_x = p.x as f32;

        for ch in text.chars() {
            let (metrics, coverage) = font.font.rasterize(ch, font.size);
            let left = pen_x.round() as i32 + metrics.xmin;
            let top = baseline - metrics.height as i32 - metrics.ymin;
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let c = coverage[gy * metrics.width + gx];
                    if c == 0 {
                        continue;
                    }
                    let alpha = (u16::from(color.a) * u16::from(c) / 255) as u8;
                    blend_pixel(
                        self.surface,
                        left + gx as i32,
                        top + gy as i32,
                        Rgba([color.r, color.g, color.b, alpha]),
                    );
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}

/// Blend `color` onto the pixel at (x, y); coordinates outside the image are
/// ignored.
pub(crate) fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }
    image.get_pixel_mut(x as u32, y as u32).blend(&color);
}

/// The part of `[x0, x1) x [y0, y1)` that lies inside `image`.
fn clip(image: &RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32) -> (Range<i32>, Range<i32>) {
    let w = i32::try_from(image.width()).unwrap_or(i32::MAX);
    let h = i32::try_from(image.height()).unwrap_or(i32::MAX);
    (x0.max(0)..x1.min(w), y0.max(0)..y1.min(h))
}

/// One-pixel outline through the inclusive corners (x0, y0) and (x1, y1).
/// Only the part inside `image` is visited.
pub(crate) fn stroke_rect(image: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    let (xs, _) = clip(image, x0, 0, x1.saturating_add(1), 0);
    for x in xs {
        blend_pixel(image, x, y0, color);
        if y1 != y0 {
            blend_pixel(image, x, y1, color);
        }
    }
    let (_, ys) = clip(image, 0, y0.saturating_add(1), 0, y1);
    for y in ys {
        blend_pixel(image, x0, y, color);
        if x1 != x0 {
            blend_pixel(image, x1, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_set(img: &RgbaImage, x: u32, y: u32) -> bool {
        img.get_pixel(x, y)[3] != 0
    }

    #[test]
    fn canvas_object_is_transparent() {
        let mut obj = GameObject::new_canvas(0.0, 0.0, 8.0, 4.0);
        let canvas = obj.canvas().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
        assert!(obj.surface().unwrap().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn plain_object_has_no_canvas() {
        let mut obj = GameObject::new(0.0, 0.0, 8.0, 4.0);
        assert!(obj.canvas().is_none());
    }

    #[test]
    fn fill_overwrites_every_pixel() {
        let mut obj = GameObject::new_canvas(0.0, 0.0, 3.0, 3.0);
        obj.canvas().unwrap().fill(Color::rgba(10, 20, 30, 40));
        assert!(obj.surface().unwrap().pixels().all(|p| *p == Rgba([10, 20, 30, 40])));
    }

    #[test]
    fn drawing_copies_a_shared_surface() {
        let shared = Arc::new(ImageManager::translucent(4, 4));
        let mut obj = GameObject::new(0.0, 0.0, 4.0, 4.0).with_surface(shared.clone());
        obj.canvas().unwrap().draw_point(Vec2::new(1.0, 1.0), Color::RED);
        assert!(!is_set(&shared, 1, 1));
        assert!(is_set(obj.surface().unwrap(), 1, 1));
    }

    #[test]
    fn points_outside_are_clipped() {
        let mut img = RgbaImage::new(2, 2);
        let mut canvas = Canvas::new(&mut img);
        canvas.draw_point(Vec2::new(-1.0, 0.0), Color::WHITE);
        canvas.draw_point(Vec2::new(2.0, 5.0), Color::WHITE);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn filled_and_outlined_rectangles() {
        let mut img = RgbaImage::new(10, 10);
        Canvas::new(&mut img).draw_rect(Vec2::new(1.0, 1.0), Vec2::new(3.0, 2.0), Color::WHITE, false);
        assert!(is_set(&img, 1, 1) && is_set(&img, 3, 2));
        assert!(!is_set(&img, 4, 1) && !is_set(&img, 1, 3));

        let mut img = RgbaImage::new(10, 10);
        Canvas::new(&mut img).draw_rect(Vec2::new(2.0, 2.0), Vec2::new(4.0, 4.0), Color::WHITE, true);
        assert!(is_set(&img, 2, 2) && is_set(&img, 6, 6) && is_set(&img, 6, 2));
        assert!(!is_set(&img, 4, 4));
    }

    #[test]
    fn circle_stays_inside_its_square() {
        let mut img = RgbaImage::new(20, 20);
        Canvas::new(&mut img).draw_circle(Vec2::new(5.0, 5.0), 10.0, Color::WHITE, false);
        assert!(is_set(&img, 10, 10));
        assert!(!is_set(&img, 5, 5));
        assert!(!is_set(&img, 4, 10) && !is_set(&img, 16, 10));

        let mut img = RgbaImage::new(20, 20);
        Canvas::new(&mut img).draw_circle(Vec2::new(5.0, 5.0), 10.0, Color::WHITE, true);
        assert!(!is_set(&img, 10, 10));
        assert!(is_set(&img, 5, 10));
    }

    #[test]
    fn draw_surface_blends_at_position() {
        let mut img = RgbaImage::new(6, 6);
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        Canvas::new(&mut img).draw_surface(Vec2::new(3.0, 4.0), &src);
        assert_eq!(*img.get_pixel(4, 5), Rgba([0, 255, 0, 255]));
        assert!(!is_set(&img, 2, 4));
    }

    #[test]
    fn huge_shapes_are_clipped_to_the_surface() {
        let mut img = RgbaImage::new(4, 4);
        let mut canvas = Canvas::new(&mut img);
        canvas.draw_rect(Vec2::splat(-1e6), Vec2::splat(3e12), Color::WHITE, false);
        canvas.draw_rect(Vec2::splat(1e12), Vec2::splat(1e12), Color::RED, true);
        canvas.draw_circle(Vec2::splat(-1e12), 3e12, Color::RED, true);
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));

        let mut img = RgbaImage::new(5, 5);
        stroke_rect(&mut img, 1, 1, i32::MAX, i32::MAX, Rgba([255, 255, 255, 255]));
        // Top edge x = 1..=4 and left edge y = 2..=4; the rest is off the image.
        assert_eq!(img.pixels().filter(|p| p[3] != 0).count(), 7);
    }

    #[test]
    fn stroke_rect_is_inclusive() {
        let mut img = RgbaImage::new(5, 5);
        stroke_rect(&mut img, 0, 0, 4, 4, Rgba([255, 255, 255, 255]));
        let set = img.pixels().filter(|p| p[3] != 0).count();
        assert_eq!(set, 16);
    }
}
