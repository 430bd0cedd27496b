use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::api::context::Context;
use crate::api::error::{EngineError, Result};
use crate::api::host::{Display, HostLink, LoopState, Shared};
use crate::api::types::Color;
use crate::core::scheduler::{self, MainHook};
use crate::core::time::Pacer;
use crate::renderer::camera::Camera;
use crate::systems::render::compose_frame;

/// Set while an [`Engine`] exists.
static ENGINE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window title, passed through to the host.
    pub title: String,
    /// Window and camera width in pixels (default: 640).
    pub width: u32,
    /// Window and camera height in pixels (default: 480).
    pub height: u32,
    /// Frame clear colour.
    pub background: Color,
    /// Target loop rate (default: 60).
    pub fps: f32,
    /// Samples averaged for the FPS and LPS readings (default: 10).
    pub rate_window: usize,
    /// Outline colliders in this colour from the first frame.
    pub collider_color: Option<Color>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Little Game Engine".to_string(),
            width: 640,
            height: 480,
            background: Color::BLACK,
            fps: 60.0,
            rate_window: 10,
            collider_color: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Releases the single-instance flag when the engine goes away.
struct ActiveGuard;

impl ActiveGuard {
    fn acquire() -> Result<Self> {
        ENGINE_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ActiveGuard)
            .map_err(|_| EngineError::AlreadyActive)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ENGINE_ACTIVE.store(false, Ordering::Release);
    }
}

/// The game engine. Only one may exist at a time.
///
/// Build the scene through [`Engine::context`], hand a [`HostLink`] to the
/// window thread, then drive the loop with [`Engine::run`] (or
/// [`Engine::spawn`]), or step it by hand with [`Engine::tick`].
pub struct Engine {
    config: EngineConfig,
    ctx: Context,
    main_hook: Option<MainHook>,
    back_buffer: RgbaImage,
    _guard: ActiveGuard,
}

impl Engine {
    /// Fails with [`EngineError::AlreadyActive`] while another engine exists.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let guard = ActiveGuard::acquire()?;
        let shared = Arc::new(Shared::new(config.width, config.height, config.rate_window));
        let camera = Camera::new(config.width as f32, config.height as f32);
        let ctx = Context::new(shared, camera, config.collider_color);
        log::info!("engine '{}' created ({}x{} @ {} fps)", config.title, config.width, config.height, config.fps);
        Ok(Self {
            back_buffer: RgbaImage::new(config.width, config.height),
            config,
            ctx,
            main_hook: None,
            _guard: guard,
        })
    }

    /// Whether an engine currently exists in this process.
    pub fn is_active() -> bool {
        ENGINE_ACTIVE.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Handle for the host's UI thread.
    pub fn host(&self) -> HostLink {
        HostLink::new(&self.ctx.shared)
    }

    /// Run `hook` once per iteration, after the update phases and before
    /// collision detection.
    pub fn set_main_hook(&mut self, hook: impl FnMut(&mut Context, f32) + Send + 'static) {
        self.main_hook = Some(Box::new(hook));
    }

    pub fn state(&self) -> LoopState {
        self.ctx.shared.state()
    }

    /// Stop a running loop after its current iteration.
    pub fn quit(&mut self) {
        self.ctx.quit();
    }

    /// One iteration with an explicit `dt`: eviction, admission, updates,
    /// main hook, collisions, pre-render, camera tracking, then composition
    /// and publication of the frame.
    pub fn tick(&mut self, dt: f32, display: &mut dyn Display) {
        self.ctx.shared.lps.lock().record(dt);
        scheduler::step(&mut self.ctx, self.main_hook.as_mut(), dt);

        compose_frame(
            &mut self.back_buffer,
            &self.ctx.scene,
            &self.ctx.camera,
            self.config.background,
            self.ctx.collider_color,
        );
        mem::swap(&mut *self.ctx.shared.frame.lock(), &mut self.back_buffer);
        display.request_repaint();
    }

    /// Run the loop on this thread at the configured rate until
    /// [`Engine::quit`], [`Context::quit`] or [`HostLink::request_close`].
    /// Then `on_quit` fires for every object and the display is closed.
    pub fn run(&mut self, display: &mut dyn Display) {
        if self.start() {
            self.drive(display);
        }
    }

    /// Run the loop on a dedicated thread. Joining returns the engine.
    ///
    /// The loop is already `Running` when this returns, so a close
    /// requested right away still stops it.
    pub fn spawn<D: Display + 'static>(mut self, mut display: D) -> std::io::Result<JoinHandle<Engine>> {
        let started = self.start();
        thread::Builder::new()
            .name("lge-game-loop".to_string())
            .spawn(move || {
                if started {
                    self.drive(&mut display);
                }
                self
            })
    }

    fn start(&self) -> bool {
        let shared = &self.ctx.shared;
        if !shared.transition(LoopState::Stopped, LoopState::Running) {
            log::warn!("run called while the loop is {:?}", shared.state());
            return false;
        }
        log::info!("game loop started");
        true
    }

    /// The paced loop of a started engine, then shutdown.
    fn drive(&mut self, display: &mut dyn Display) {
        let shared = self.ctx.shared.clone();
        let mut pacer = Pacer::new(self.config.fps);
        while shared.state() == LoopState::Running {
            let dt = pacer.wait();
            self.tick(dt, display);
        }

        scheduler::shutdown(&mut self.ctx);
        display.close();
        shared.set_state(LoopState::Stopped);
        log::info!("game loop stopped");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.ctx.sounds_mut().stop_all();
        log::debug!("engine '{}' released", self.config.title);
    }
}
