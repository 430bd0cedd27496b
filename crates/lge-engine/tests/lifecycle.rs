//! End-to-end checks of the game loop: deferred admission and eviction,
//! phase order, collision notification, camera tracking and shutdown.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use lge_engine::{
    Behavior, Context, Engine, EngineConfig, EngineError, EntityId, GameObject, HeadlessDisplay,
    InputEvent, Layer, LoopState, MouseButton, Rect,
};
use parking_lot::{Mutex, MutexGuard};

/// Only one engine may exist per process; tests take turns.
fn engine_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = parking_lot::const_mutex(());
    LOCK.lock()
}

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

/// Records every hook as `label:phase`.
struct Recorder {
    label: &'static str,
    log: Log,
}

impl Recorder {
    fn new(label: &'static str, log: &Log) -> Self {
        Self {
            label,
            log: log.clone(),
        }
    }

    fn push(&self, phase: &str) {
        self.log.lock().push(format!("{}:{}", self.label, phase));
    }
}

impl Behavior for Recorder {
    fn on_start(&mut self, _this: &mut GameObject, _ctx: &mut Context) {
        self.push("start");
    }

    fn on_delete(&mut self, _this: &mut GameObject, _ctx: &mut Context) {
        self.push("delete");
    }

    fn on_pre_update(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32) {
        self.push("pre");
    }

    fn on_update(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32) {
        self.push("update");
    }

    fn on_post_update(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32) {
        self.push("post");
    }

    fn on_collision(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32, others: &[EntityId]) {
        self.push(&format!("collision{}", others.len()));
    }

    fn on_pre_render(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32) {
        self.push("render");
    }

    fn on_quit(&mut self, _this: &mut GameObject, _ctx: &mut Context) {
        self.push("quit");
    }
}

fn small_engine() -> Engine {
    Engine::new(EngineConfig {
        width: 64,
        height: 64,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn solid(x: f32, y: f32, listens: bool) -> GameObject {
    GameObject::new(x, y, 10.0, 10.0).with_colliders_enabled(true, listens)
}

#[test]
fn phases_run_in_order() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let hook_log = log.clone();
    engine.set_main_hook(move |_ctx, _dt| hook_log.lock().push("main".to_string()));

    engine
        .context()
        .add(solid(0.0, 0.0, true), Recorder::new("a", &log), 0)
        .unwrap();
    engine.context().add(solid(5.0, 5.0, false), (), 0).unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);

    assert_eq!(
        take(&log),
        vec!["a:start", "a:pre", "a:update", "a:post", "main", "a:collision1", "a:render"]
    );
}

#[test]
fn each_phase_completes_before_the_next() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let ctx = engine.context();
    ctx.add(GameObject::new(0.0, 0.0, 1.0, 1.0), Recorder::new("hi", &log), 7).unwrap();
    ctx.add(GameObject::new(0.0, 0.0, 1.0, 1.0), Recorder::new("lo", &log), -3).unwrap();
    ctx.add(GameObject::new(0.0, 0.0, 1.0, 1.0), Recorder::new("lo2", &log), -3).unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    let entries = take(&log);
    assert_eq!(
        &entries[..6],
        &["hi:start", "lo:start", "lo2:start", "lo:pre", "lo2:pre", "hi:pre"]
    );
    assert_eq!(&entries[6..9], &["lo:update", "lo2:update", "hi:update"]);
}

#[test]
fn additions_wait_for_the_next_iteration() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    engine
        .context()
        .add(solid(0.0, 0.0, true), Recorder::new("listener", &log), 0)
        .unwrap();

    let late_log = log.clone();
    let mut added = false;
    engine.set_main_hook(move |ctx, _dt| {
        if !added {
            added = true;
            ctx.add(solid(2.0, 2.0, false).with_name("late"), Recorder::new("late", &late_log), 0)
                .unwrap();
        }
    });

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    let first = take(&log);
    assert!(first.iter().all(|e| !e.starts_with("late")), "{first:?}");
    assert!(!first.iter().any(|e| e.starts_with("listener:collision")), "{first:?}");
    // Registered by name right away, though not yet live.
    assert!(engine.context().find("late").is_ok());
    assert_eq!(engine.context().count(), 2);

    engine.tick(0.016, &mut display);
    let second = take(&log);
    assert!(second.contains(&"late:start".to_string()));
    assert!(second.contains(&"late:update".to_string()));
    assert!(second.contains(&"listener:collision1".to_string()));
}

/// Removes `victim` during its own update.
struct Remover {
    victim: EntityId,
}

impl Behavior for Remover {
    fn on_update(&mut self, _this: &mut GameObject, ctx: &mut Context, _dt: f32) {
        ctx.remove(self.victim);
    }
}

#[test]
fn removals_finish_the_current_iteration() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let victim = engine
        .context()
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0).with_name("victim"), Recorder::new("v", &log), 1)
        .unwrap();
    engine
        .context()
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0), Remover { victim }, 0)
        .unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(take(&log), vec!["v:start", "v:pre", "v:update", "v:post", "v:render"]);
    assert!(engine.context().object(victim).is_some());

    engine.tick(0.016, &mut display);
    assert_eq!(take(&log), vec!["v:delete"]);
    assert!(engine.context().object(victim).is_none());
    assert!(matches!(engine.context().find("victim"), Err(EngineError::EntityNotFound(_))));

    // The remover keeps asking; unknown ids are ignored.
    engine.tick(0.016, &mut display);
    assert!(take(&log).is_empty());
}

#[test]
fn removal_before_admission_skips_start() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let ctx = engine.context();
    let id = ctx
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0), Recorder::new("brief", &log), 0)
        .unwrap();
    ctx.remove(id);

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(take(&log), vec!["brief:delete"]);
    assert_eq!(engine.context().count(), 0);
}

#[test]
fn duplicate_names_are_rejected() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let ctx = engine.context();
    ctx.add(GameObject::new(0.0, 0.0, 1.0, 1.0).with_name("hero"), (), 0).unwrap();
    let err = ctx
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0).with_name("hero"), (), 2)
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName(_)));
    assert_eq!(ctx.count(), 1);
}

#[test]
fn collision_notification_is_one_sided() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let ctx = engine.context();
    ctx.add(solid(0.0, 0.0, true), Recorder::new("loud", &log), 0).unwrap();
    ctx.add(solid(5.0, 5.0, false), Recorder::new("quiet", &log), 0).unwrap();
    ctx.add(solid(5.0, 5.0, true), Recorder::new("elsewhere", &log), 1).unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    let entries = take(&log);
    assert!(entries.contains(&"loud:collision1".to_string()), "{entries:?}");
    assert!(!entries.iter().any(|e| e.starts_with("quiet:collision")));
    assert!(!entries.iter().any(|e| e.starts_with("elsewhere:collision")));
}

#[test]
fn gui_objects_never_collide() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let log = new_log();
    let ctx = engine.context();
    ctx.add_gui(solid(0.0, 0.0, true), Recorder::new("hud", &log)).unwrap();
    ctx.add_gui(solid(0.0, 0.0, true), ()).unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert!(!take(&log).iter().any(|e| e.contains("collision")));
}

/// Looks itself up while its own hook runs.
struct SelfLookup {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl Behavior for SelfLookup {
    fn on_update(&mut self, this: &mut GameObject, ctx: &mut Context, _dt: f32) {
        this.set_position(this.x() + 1.0, this.y());
        let hits = ctx.collisions_of(this).len();
        let tagged = ctx.find_by_tag(0, "crate").len();
        self.seen.lock().extend([hits, tagged]);
    }
}

#[test]
fn hooks_can_query_the_rest_of_the_scene() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let ctx = engine.context();
    let me = ctx
        .add(solid(0.0, 0.0, false), SelfLookup { seen: seen.clone() }, 0)
        .unwrap();
    ctx.add(solid(8.0, 0.0, false).with_tag("crate-1"), (), 0).unwrap();
    ctx.add(solid(30.0, 0.0, false).with_tag("crate-2"), (), 0).unwrap();

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(*seen.lock(), vec![1, 2]);
    assert_eq!(engine.context().object(me).unwrap().position(), Vec2::new(1.0, 0.0));
}

#[test]
fn camera_follows_and_forgets_its_target() {
    let _lock = engine_lock();
    let mut engine = Engine::new(EngineConfig {
        width: 50,
        height: 50,
        ..EngineConfig::default()
    })
    .unwrap();
    let ctx = engine.context();
    let target = ctx.add(GameObject::new(100.0, 100.0, 20.0, 20.0), (), 0).unwrap();
    ctx.set_camera_target(target, true);

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(engine.context().camera_position(), Vec2::new(85.0, 85.0));

    engine.context().remove(target);
    engine.tick(0.016, &mut display);
    assert_eq!(engine.context().camera().target(), None);
    assert_eq!(engine.context().camera_position(), Vec2::new(85.0, 85.0));
}

#[test]
fn camera_bounds_limit_tracking() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let ctx = engine.context();
    ctx.set_camera_bounds(Rect::new(0.0, 0.0, 200.0, 200.0));
    let target = ctx.add(GameObject::new(0.0, 0.0, 4.0, 4.0), (), 0).unwrap();
    ctx.set_camera_target(target, true);

    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(engine.context().camera_position(), Vec2::ZERO);
}

/// Requests a stop during its update and records what follows.
struct Quitter {
    log: Log,
}

impl Behavior for Quitter {
    fn on_update(&mut self, _this: &mut GameObject, ctx: &mut Context, _dt: f32) {
        self.log.lock().push("quit requested".to_string());
        ctx.quit();
    }

    fn on_post_update(&mut self, _this: &mut GameObject, _ctx: &mut Context, _dt: f32) {
        self.log.lock().push("post".to_string());
    }

    fn on_quit(&mut self, _this: &mut GameObject, ctx: &mut Context) {
        self.log.lock().push(format!("on_quit {:?}", ctx.state()));
    }
}

#[test]
fn quit_is_cooperative() {
    let _lock = engine_lock();
    let mut engine = Engine::new(EngineConfig {
        fps: 1000.0,
        width: 16,
        height: 16,
        ..EngineConfig::default()
    })
    .unwrap();
    let log = new_log();
    let others = new_log();
    engine
        .context()
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0), Quitter { log: log.clone() }, 0)
        .unwrap();
    engine
        .context()
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0), Recorder::new("bystander", &others), 2)
        .unwrap();

    let mut display = HeadlessDisplay::new();
    engine.run(&mut display);

    assert_eq!(take(&log), vec!["quit requested", "post", "on_quit Stopping"]);
    assert_eq!(take(&others).last().map(String::as_str), Some("bystander:quit"));
    assert_eq!(display.repaints(), 1);
    assert!(display.is_closed());
    assert_eq!(engine.state(), LoopState::Stopped);
}

#[test]
fn host_closes_a_spawned_loop() {
    let _lock = engine_lock();
    let engine = Engine::new(EngineConfig {
        fps: 200.0,
        width: 16,
        height: 16,
        ..EngineConfig::default()
    })
    .unwrap();
    let host = engine.host();
    let display = HeadlessDisplay::new();
    let handle = engine.spawn(display.clone()).unwrap();

    while display.repaints() < 3 {
        std::thread::sleep(Duration::from_millis(1));
    }
    host.push(InputEvent::KeyDown { key: "Space".into() }).unwrap();
    host.present(|frame| assert_eq!(frame.dimensions(), (16, 16))).unwrap();
    host.request_close().unwrap();

    let mut engine = handle.join().unwrap();
    assert!(display.is_closed());
    assert_eq!(engine.state(), LoopState::Stopped);
    assert!(engine.context().key_pressed("Space"));
    assert!(engine.context().lps() > 0.0);

    drop(engine);
    assert!(matches!(host.request_close(), Err(EngineError::NotActive)));
}

#[test]
fn close_right_after_spawn_stops_the_loop() {
    let _lock = engine_lock();
    let engine = small_engine();
    let host = engine.host();
    let display = HeadlessDisplay::new();

    let handle = engine.spawn(display.clone()).unwrap();
    assert_eq!(host.state().unwrap(), LoopState::Running);
    host.request_close().unwrap();

    let engine = handle.join().unwrap();
    assert!(display.is_closed());
    assert_eq!(engine.state(), LoopState::Stopped);
    // At most the iteration already under way ran before the stop.
    assert!(display.repaints() <= 1, "repaints = {}", display.repaints());
}

#[test]
fn input_reaches_the_context() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let host = engine.host();
    host.push(InputEvent::MouseDown { button: MouseButton::Left }).unwrap();
    host.push(InputEvent::MouseClick { button: MouseButton::Right, x: 3, y: 4 }).unwrap();
    host.push(InputEvent::PointerMove { x: 10, y: 11 }).unwrap();

    let ctx = engine.context();
    assert_eq!(ctx.mouse_buttons(), [true, false, false]);
    assert_eq!(ctx.mouse_clicked(2).unwrap(), Some(glam::IVec2::new(3, 4)));
    assert_eq!(ctx.mouse_clicked(2).unwrap(), None);
    assert_eq!(ctx.mouse_position(), Some(glam::IVec2::new(10, 11)));
    assert!(matches!(ctx.mouse_clicked(3), Err(EngineError::InvalidMouseButton(3))));
    assert!(!ctx.key_pressed("Escape"));

    host.push(InputEvent::PointerLeave).unwrap();
    assert_eq!(engine.context().mouse_position(), None);
}

#[test]
fn layer_survives_until_removal() {
    let _lock = engine_lock();
    let mut engine = small_engine();
    let id = engine
        .context()
        .add(GameObject::new(0.0, 0.0, 1.0, 1.0), (), Layer(4))
        .unwrap();
    let mut display = HeadlessDisplay::new();
    engine.tick(0.016, &mut display);
    assert_eq!(engine.context().object(id).unwrap().layer(), Some(Layer(4)));
}
