//! Snowball Stack - grow, absorb and stack snowballs
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity store, growth, contact resolution, session)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `persistence`: Versioned save/load of a running session
//! - `error`: Error type for the fallible (non-simulation) surface

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{MissPolicy, Settings};

use glam::Vec3;

/// Simulation defaults
pub mod consts {
    /// Scale gained per unit of pointer movement
    pub const DEFAULT_GROWTH_RATE: f32 = 0.1;
    /// Scale of a freshly spawned snowball (the prefab's uniform scale)
    pub const DEFAULT_PREFAB_SCALE: f32 = 1.0;
    /// Layer bit used by ground geometry
    pub const GROUND_LAYER_BIT: u32 = 1 << 0;
    /// Layer bit used by snowballs
    pub const SPHERE_LAYER_BIT: u32 = 1 << 1;
    /// Squared-length threshold below which a direction is considered degenerate
    pub const DIRECTION_EPSILON: f32 = 1e-12;
}

/// Horizontal (xz-plane) distance between two points
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Combined scale after one sphere absorbs another
///
/// Treats scale as radius and "mass" as radius squared.
#[inline]
pub fn absorbed_scale(active: f32, other: f32) -> f32 {
    (active * active + other * other).sqrt()
}
