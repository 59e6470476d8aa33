//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per frame, no timers
//! - Stable iteration order (store slot order, nearest-first contacts)
//! - No rendering or input-device dependencies

pub mod camera;
pub mod growth;
pub mod query;
pub mod resolve;
pub mod state;
pub mod store;
pub mod tick;

pub use camera::Camera;
pub use growth::{Placement, grow_and_place, growth_delta};
pub use query::{GroundPatch, HitTarget, LayerMask, Ray, RayHit, Scene, SpatialQuery, raycast_sphere};
pub use resolve::{Contact, contact_candidates, resolve_contacts};
pub use state::{Pointer, Session, SessionEvent, SessionPhase};
pub use store::{Sphere, SphereHandle, SphereStore};
pub use tick::{TickInput, tick};
