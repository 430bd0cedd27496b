use crate::api::types::EntityId;
use crate::core::scene::Scene;

/// Find every object that wants to hear about collisions and the objects it
/// overlaps. GUI objects are skipped.
///
/// Only objects with both `colliders_enabled` and `notify_on_collision`
/// appear as the first element; their partners only need colliders
/// enabled. Notification is therefore one-sided. Results follow layer
/// order, then insertion order.
pub fn detect_collisions(scene: &Scene) -> Vec<(EntityId, Vec<EntityId>)> {
    let mut hits = Vec::new();
    for (layer, ids) in scene.layers() {
        if layer.is_gui() {
            continue;
        }
        for &a in ids {
            let Some(obj_a) = scene.get(a) else {
                continue;
            };
            if !obj_a.notify_on_collision() || !obj_a.colliders_enabled() {
                continue;
            }
            let others: Vec<EntityId> = ids
                .iter()
                .copied()
                .filter(|&b| b != a)
                .filter(|b| {
                    scene
                        .get(*b)
                        .is_some_and(|obj_b| obj_b.colliders_enabled() && obj_a.collides_with(obj_b))
                })
                .collect();
            if !others.is_empty() {
                hits.push((a, others));
            }
        }
    }
    hits
}
