//! Bouncing balls, run headless.
//!
//! Usage: `bouncing [frames] [out.png]`
//!
//! Runs for `frames` iterations (default 300), then writes the last frame
//! to `out.png` when given. Set `LGE_FONT` to a TTF file to get the info
//! bar text.

use std::env;

use glam::Vec2;
use lge_engine::{
    Behavior, Color, Context, Engine, EngineConfig, EntityId, GameObject, HeadlessDisplay,
};
use rand::Rng;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 440;

struct Ball {
    vx: f32,
    vy: f32,
    gravity: f32,
    elasticity: f32,
    ground: EntityId,
}

impl Behavior for Ball {
    fn on_update(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32) {
        let x = this.x() + self.vx * dt;
        let y = this.y() + self.vy * dt;
        if x < 0.0 {
            ctx.remove(this.id());
            return;
        }
        self.vy += self.gravity * dt;
        this.set_position(x, y);
    }

    fn on_post_update(&mut self, this: &mut GameObject, ctx: &mut Context, _dt: f32) {
        let Some(ground) = ctx.object(self.ground) else {
            return;
        };
        if !this.collides_with(ground) {
            return;
        }
        this.set_position(this.x(), ground.y() - this.height());
        self.vy = -self.vy * self.elasticity;
        if self.vy.abs() < 50.0 {
            self.vx = 0.0;
            self.vy = 0.0;
            self.gravity = 0.0;
        }
    }
}

struct InfoBar;

impl Behavior for InfoBar {
    fn on_pre_render(&mut self, this: &mut GameObject, ctx: &mut Context, _dt: f32) {
        let mouse = ctx.mouse_position().map_or((-1, -1), |p| (p.x, p.y));
        let buttons = ctx.mouse_buttons().map(u8::from);
        let info = format!(
            "FPS: {:<6.2} - LPS: {:<6.2} - gObjs: {} - Mouse: ({},{}) ({},{},{})",
            ctx.fps(),
            ctx.lps(),
            ctx.count(),
            mouse.0,
            mouse.1,
            buttons[0],
            buttons[1],
            buttons[2]
        );

        let Some(mut canvas) = this.canvas() else {
            return;
        };
        canvas.fill(Color::rgba(0x20, 0x20, 0x20, 0x10));
        if let Ok(font) = ctx.fonts().get("monospace") {
            canvas.draw_text(&info, Vec2::new(40.0, 3.0), font, Color::BLACK);
        }
    }
}

fn main() -> lge_engine::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let frames: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(300);
    let output = args.next();

    let mut engine = Engine::new(EngineConfig {
        title: "Bouncing Balls".to_string(),
        width: WIDTH,
        height: HEIGHT,
        background: Color::WHITE,
        ..EngineConfig::default()
    })?;
    let ctx = engine.context();

    if let Ok(path) = env::var("LGE_FONT") {
        ctx.fonts_mut().load_ttf("monospace", path, 10.0)?;
    }

    let mut ground = GameObject::new_canvas(0.0, 340.0, WIDTH as f32, 100.0)
        .with_name("ground")
        .with_tag("ground")
        .with_colliders_enabled(true, false);
    if let Some(mut canvas) = ground.canvas() {
        canvas.fill(Color::GRAY);
    }
    let ground = ctx.add(ground, (), 1)?;

    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let x = 50.0 + rng.gen_range(0..700) as f32;
        let y = 50.0 + rng.gen_range(0..150) as f32;
        let vx = -50.0 + rng.gen_range(0..100) as f32;

        let mut ball = GameObject::new_canvas(x, y, 20.0, 20.0).with_colliders_enabled(true, false);
        if let Some(mut canvas) = ball.canvas() {
            canvas.fill(Color::rgba(255, 0, 64, 100));
        }
        let behavior = Ball {
            vx,
            vy: 0.0,
            gravity: 240.0,
            elasticity: 0.4,
            ground,
        };
        ctx.add(ball, behavior, 1)?;
    }

    ctx.add_gui(
        GameObject::new_canvas(0.0, 0.0, WIDTH as f32, 20.0).with_name("infobar"),
        InfoBar,
    )?;

    let mut frame = 0;
    engine.set_main_hook(move |ctx, _dt| {
        frame += 1;
        if ctx.key_pressed("Escape") || frame >= frames {
            ctx.quit();
        }
        if frame % 60 == 0 {
            log::info!("frame {}: {} objects, {:.1} lps", frame, ctx.count(), ctx.lps());
        }
    });

    engine.run(&mut HeadlessDisplay::new());

    if let Some(path) = output {
        engine.host().present(|image| image.save(&path))??;
        log::info!("last frame written to {}", path);
    }
    Ok(())
}
