use crate::api::context::Context;
use crate::api::types::EntityId;
use crate::components::entity::GameObject;

/// Per-object lifecycle hooks. Override only what you need; every hook is
/// a no-op by default.
///
/// Each hook receives the object it belongs to as `this` and the engine
/// as `ctx`. While a hook runs its own object is lent out, so looking
/// that object up through `ctx` (by id, name, tag or collision query)
/// does not find it; use `this` instead.
///
/// A panic inside a hook is not caught. It unwinds through the game loop
/// and ends the run on that thread.
#[allow(unused_variables)]
pub trait Behavior: Send {
    /// The object was admitted into its layer, at the start of the
    /// iteration after it was added.
    fn on_start(&mut self, this: &mut GameObject, ctx: &mut Context) {}

    /// The object was evicted. It is already detached from the engine.
    fn on_delete(&mut self, this: &mut GameObject, ctx: &mut Context) {}

    fn on_pre_update(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32) {}

    fn on_update(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32) {}

    fn on_post_update(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32) {}

    /// Called only on objects with `notify_on_collision` set. `others`
    /// lists every same-layer object with colliders enabled that overlaps
    /// this one, in layer order.
    fn on_collision(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32, others: &[EntityId]) {}

    /// Last chance to change the visual before the frame is composed.
    fn on_pre_render(&mut self, this: &mut GameObject, ctx: &mut Context, dt: f32) {}

    /// The game loop is shutting down.
    fn on_quit(&mut self, this: &mut GameObject, ctx: &mut Context) {}
}

/// Objects with no behavior of their own.
impl Behavior for () {}
