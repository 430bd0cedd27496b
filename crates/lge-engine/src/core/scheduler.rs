//! One game loop iteration, phase by phase.
//!
//! Every phase walks a snapshot of the admitted ids, so additions and
//! removals requested by a hook only show up after the next eviction and
//! admission.

use crate::api::behavior::Behavior;
use crate::api::context::Context;
use crate::api::types::EntityId;
use crate::components::entity::GameObject;
use crate::systems::collision::detect_collisions;

/// Per-frame hook run after the update phases.
pub type MainHook = Box<dyn FnMut(&mut Context, f32) + Send>;

/// Run `hook` for each id still held by the scene, lending it its slot.
fn for_each(
    ctx: &mut Context,
    ids: &[EntityId],
    mut hook: impl FnMut(&mut dyn Behavior, &mut GameObject, &mut Context),
) {
    for &id in ids {
        let Some(mut slot) = ctx.scene.take(id) else {
            continue;
        };
        hook(slot.behavior.as_mut(), &mut slot.object, ctx);
        ctx.scene.restore(slot);
    }
}

/// Apply queued removals, then fire `on_delete` for each evicted object.
pub(crate) fn evict(ctx: &mut Context) -> usize {
    let evicted = ctx.scene.evict_pending();
    for slot in &evicted {
        if ctx.camera.target() == Some(slot.object.id()) {
            ctx.camera.clear_target();
        }
    }
    let count = evicted.len();
    for mut slot in evicted {
        slot.behavior.on_delete(&mut slot.object, ctx);
    }
    if count > 0 {
        log::debug!("evicted {} object(s)", count);
    }
    count
}

/// Admit queued additions, then fire `on_start` for each new arrival.
pub(crate) fn admit(ctx: &mut Context) -> usize {
    let admitted = ctx.scene.admit_pending();
    for_each(ctx, &admitted, |b, o, c| b.on_start(o, c));
    if !admitted.is_empty() {
        log::debug!("admitted {} object(s)", admitted.len());
    }
    admitted.len()
}

/// Eviction through camera tracking: everything except composition.
pub(crate) fn step(ctx: &mut Context, main_hook: Option<&mut MainHook>, dt: f32) {
    evict(ctx);
    admit(ctx);

    let live = ctx.scene.live_ids();
    for_each(ctx, &live, |b, o, c| b.on_pre_update(o, c, dt));
    for_each(ctx, &live, |b, o, c| b.on_update(o, c, dt));
    for_each(ctx, &live, |b, o, c| b.on_post_update(o, c, dt));

    if let Some(hook) = main_hook {
        hook(ctx, dt);
    }

    for (id, others) in detect_collisions(&ctx.scene) {
        for_each(ctx, &[id], |b, o, c| b.on_collision(o, c, dt, &others));
    }

    for_each(ctx, &live, |b, o, c| b.on_pre_render(o, c, dt));

    let target_rect = ctx
        .camera
        .target()
        .and_then(|id| ctx.scene.get(id))
        .map(GameObject::rect);
    ctx.camera.follow_target(target_rect);
}

/// Fire `on_quit` for every admitted object.
pub(crate) fn shutdown(ctx: &mut Context) {
    let live = ctx.scene.live_ids();
    for_each(ctx, &live, |b, o, c| b.on_quit(o, c));
}
