//! Per-frame simulation step
//!
//! Input transitions first, then growth, then contact resolution.

use glam::{Vec2, Vec3};

use super::growth::grow_and_place;
use super::query::{HitTarget, Ray, SpatialQuery};
use super::resolve::resolve_contacts;
use super::state::{Pointer, Session, SessionEvent};
use crate::settings::MissPolicy;

/// Input sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Trigger went down this frame
    pub trigger_down: bool,
    /// Trigger went up this frame
    pub trigger_up: bool,
    pub pointer: Pointer,
    /// Pointer movement since last frame (screen units)
    pub pointer_delta: Vec2,
}

impl TickInput {
    /// Holding still at `pointer`
    pub fn hold(pointer: Pointer) -> Self {
        Self {
            pointer,
            ..Default::default()
        }
    }

    pub fn press(pointer: Pointer) -> Self {
        Self {
            trigger_down: true,
            pointer,
            ..Default::default()
        }
    }

    pub fn release(pointer: Pointer) -> Self {
        Self {
            trigger_up: true,
            pointer,
            ..Default::default()
        }
    }

    pub fn drag(pointer: Pointer, pointer_delta: Vec2) -> Self {
        Self {
            pointer,
            pointer_delta,
            ..Default::default()
        }
    }
}

/// Advance the session by one frame
pub fn tick<Q: SpatialQuery + ?Sized>(session: &mut Session, query: &Q, input: &TickInput) {
    session.begin_tick();
    let ray = session.pointer_ray(input.pointer);

    if input.trigger_down {
        press(session, query, ray);
    }

    if input.trigger_up {
        if let Some(handle) = session.stop_growing() {
            log::debug!("released snowball {:?}", handle);
            session.push_event(SessionEvent::Released(handle));
        }
    }

    let Some(active) = session.phase.active() else {
        return;
    };

    if !session.spheres.is_alive(active) {
        if session.mark_lost() {
            log::warn!("snowball {:?} was destroyed while being rolled", active);
            session.push_event(SessionEvent::ActiveLost(active));
        }
        return;
    }

    if let Some(placement) = grow_and_place(
        &mut session.spheres,
        query,
        active,
        ray,
        input.pointer_delta,
        &session.settings,
    ) {
        session.push_event(SessionEvent::Grew {
            handle: active,
            scale: placement.scale,
        });
    }

    for contact in resolve_contacts(&mut session.spheres, query, active, &session.settings) {
        session.push_event(SessionEvent::Contact(contact));
    }
}

/// Grab the snowball under the pointer, or start a new one on the ground
fn press<Q: SpatialQuery + ?Sized>(session: &mut Session, query: &Q, ray: Ray) {
    let max_distance = session.settings.ray_distance();

    let picked = query
        .raycast(&session.spheres, ray, max_distance, session.settings.sphere_layer)
        .and_then(|hit| match hit.target {
            HitTarget::Sphere(handle) => Some(handle),
            HitTarget::Ground(_) => None,
        });
    if let Some(handle) = picked {
        log::debug!("picked up snowball {:?}", handle);
        session.start_growing(handle);
        session.push_event(SessionEvent::PickedUp(handle));
        return;
    }

    let ground = query.raycast(&session.spheres, ray, max_distance, session.settings.ground_layer);
    let position = match (ground, session.settings.miss_policy) {
        (Some(hit), _) => hit.point,
        (None, MissPolicy::SpawnAtOrigin) => Vec3::ZERO,
        (None, MissPolicy::Ignore) => {
            log::debug!("press hit nothing; ignored");
            session.push_event(SessionEvent::PressIgnored);
            return;
        }
    };

    let handle = session.spawn_sphere(position);
    log::debug!("spawned snowball {:?} at {:?}", handle, position);
    session.start_growing(handle);
    session.push_event(SessionEvent::Spawned { handle, position });
}
