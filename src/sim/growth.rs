//! Growth and placement of the controlled snowball
//!
//! Each tick the snowball is snapped onto the ground under the pointer and
//! grows by the distance the pointer travelled.

use glam::{Vec2, Vec3};

use super::query::{Ray, SpatialQuery};
use super::store::{SphereHandle, SphereStore};
use crate::settings::Settings;

/// Where the snowball ended up after a growth step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Ground point under the pointer
    pub ground_point: Vec3,
    pub position: Vec3,
    pub scale: f32,
    /// Scale added this step (before any ceiling)
    pub delta: f32,
}

/// Scale gained from one tick of pointer motion
#[inline]
pub fn growth_delta(pointer_delta: Vec2, growth_rate: f32) -> f32 {
    let delta = (pointer_delta.x.abs() + pointer_delta.y.abs()) * growth_rate;
    if delta.is_finite() { delta.max(0.0) } else { 0.0 }
}

/// Snap the snowball to the ground hit by `ray` and grow it
///
/// Returns `None` (and changes nothing) when the handle is stale or the ray
/// misses the ground.
pub fn grow_and_place<Q: SpatialQuery + ?Sized>(
    store: &mut SphereStore,
    query: &Q,
    handle: SphereHandle,
    ray: Ray,
    pointer_delta: Vec2,
    settings: &Settings,
) -> Option<Placement> {
    if !store.is_alive(handle) {
        return None;
    }

    let hit = query.raycast(store, ray, settings.ray_distance(), settings.ground_layer)?;
    let sphere = store.get_mut(handle)?;

    // Half-height is taken before growth is applied
    let position = Vec3::new(hit.point.x, hit.point.y + sphere.half_height(), hit.point.z);
    let delta = growth_delta(pointer_delta, settings.growth_rate);
    let scale = settings.clamp_scale(sphere.scale + delta).max(sphere.scale);

    sphere.position = position;
    sphere.scale = scale;

    log::trace!(
        "snowball {:?} placed at {:?}, scale {:.3} (+{:.3})",
        handle,
        position,
        scale,
        delta
    );

    Some(Placement {
        ground_point: hit.point,
        position,
        scale,
        delta,
    })
}
