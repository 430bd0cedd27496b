//! The boundary between the game loop thread and the host's UI thread.
//!
//! The host owns the window. It forwards input through a [`HostLink`],
//! blits the published frame when asked to repaint, and turns a window
//! close into [`HostLink::request_close`].

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use image::RgbaImage;
use parking_lot::Mutex;

use crate::api::error::{EngineError, Result};
use crate::core::time::RateMeter;
use crate::input::state::{InputEvent, InputState};

/// Game loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Stopped = 0,
    Running = 1,
    Stopping = 2,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            _ => LoopState::Stopped,
        }
    }
}

/// State touched by both threads.
pub(crate) struct Shared {
    pub input: Mutex<InputState>,
    pub frame: Mutex<RgbaImage>,
    pub fps: Mutex<RateMeter>,
    pub lps: Mutex<RateMeter>,
    last_present: Mutex<Option<Instant>>,
    state: AtomicU8,
}

impl Shared {
    pub fn new(width: u32, height: u32, rate_window: usize) -> Self {
        Self {
            input: Mutex::new(InputState::new()),
            frame: Mutex::new(RgbaImage::new(width, height)),
            fps: Mutex::new(RateMeter::new(rate_window)),
            lps: Mutex::new(RateMeter::new(rate_window)),
            last_present: Mutex::new(None),
            state: AtomicU8::new(LoopState::Stopped as u8),
        }
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: LoopState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Atomically move from `from` to `to`. Returns whether it happened.
    pub fn transition(&self, from: LoopState, to: LoopState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Ask a running loop to stop after its current iteration.
    pub fn request_stop(&self) {
        self.transition(LoopState::Running, LoopState::Stopping);
    }
}

/// Handle the host's UI thread uses to talk to the engine.
///
/// Holds only a weak reference: once the engine is dropped every call
/// fails with [`EngineError::NotActive`].
#[derive(Clone)]
pub struct HostLink {
    shared: Weak<Shared>,
}

impl HostLink {
    pub(crate) fn new(shared: &Arc<Shared>) -> Self {
        Self {
            shared: Arc::downgrade(shared),
        }
    }

    fn shared(&self) -> Result<Arc<Shared>> {
        self.shared.upgrade().ok_or(EngineError::NotActive)
    }

    /// Feed one input event into the engine.
    pub fn push(&self, event: InputEvent) -> Result<()> {
        self.shared()?.input.lock().apply(event);
        Ok(())
    }

    /// Hand the latest published frame to `blit`. Each call counts as one
    /// rendered frame for the FPS meter.
    pub fn present<R>(&self, blit: impl FnOnce(&RgbaImage) -> R) -> Result<R> {
        let shared = self.shared()?;
        let now = Instant::now();
        if let Some(prev) = shared.last_present.lock().replace(now) {
            shared.fps.lock().record(now.duration_since(prev).as_secs_f32());
        }
        let frame = shared.frame.lock();
        Ok(blit(&frame))
    }

    /// The window is closing: stop the loop after its current iteration.
    pub fn request_close(&self) -> Result<()> {
        self.shared()?.request_stop();
        Ok(())
    }

    pub fn state(&self) -> Result<LoopState> {
        Ok(self.shared()?.state())
    }
}

/// The surface finished frames are shown on.
pub trait Display: Send {
    /// A new frame has been published. Must not block on the UI thread.
    fn request_repaint(&mut self);

    /// The loop has ended; close the window. Runs once, after every
    /// `on_quit` hook.
    fn close(&mut self);
}

/// Display for tests and servers: counts repaints and records the close.
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDisplay {
    repaints: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repaints(&self) -> usize {
        self.repaints.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Display for HeadlessDisplay {
    fn request_repaint(&mut self) {
        self.repaints.fetch_add(1, Ordering::AcqRel);
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::state::MouseButton;

    #[test]
    fn link_forwards_input() {
        let shared = Arc::new(Shared::new(4, 4, 10));
        let link = HostLink::new(&shared);
        link.push(InputEvent::MouseDown { button: MouseButton::Left }).unwrap();
        assert!(shared.input.lock().button(MouseButton::Left));
    }

    #[test]
    fn link_fails_once_engine_is_gone() {
        let shared = Arc::new(Shared::new(4, 4, 10));
        let link = HostLink::new(&shared);
        drop(shared);
        assert!(matches!(link.push(InputEvent::PointerLeave), Err(EngineError::NotActive)));
        assert!(matches!(link.request_close(), Err(EngineError::NotActive)));
        assert!(link.present(|_| ()).is_err());
    }

    #[test]
    fn present_feeds_fps_meter() {
        let shared = Arc::new(Shared::new(4, 4, 2));
        let link = HostLink::new(&shared);
        let size = link.present(|frame| frame.dimensions()).unwrap();
        assert_eq!(size, (4, 4));
        assert_eq!(shared.fps.lock().rate(), 0.0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        link.present(|_| ()).unwrap();
        assert!(shared.fps.lock().rate() > 0.0);
    }

    #[test]
    fn close_only_stops_a_running_loop() {
        let shared = Arc::new(Shared::new(4, 4, 10));
        let link = HostLink::new(&shared);
        link.request_close().unwrap();
        assert_eq!(link.state().unwrap(), LoopState::Stopped);

        shared.set_state(LoopState::Running);
        link.request_close().unwrap();
        assert_eq!(link.state().unwrap(), LoopState::Stopping);
    }

    #[test]
    fn headless_display_clones_share_counters() {
        let display = HeadlessDisplay::new();
        let mut moved = display.clone();
        moved.request_repaint();
        moved.request_repaint();
        moved.close();
        assert_eq!(display.repaints(), 2);
        assert!(display.is_closed());
    }
}
