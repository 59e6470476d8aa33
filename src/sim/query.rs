//! Spatial queries: rays and overlap tests
//!
//! The simulation only talks to [`SpatialQuery`]. [`Scene`] is the built-in
//! provider: static ground patches plus whatever snowballs the store holds at
//! the moment of the call.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::store::{SphereHandle, SphereStore};
use crate::consts::{DIRECTION_EPSILON, GROUND_LAYER_BIT, SPHERE_LAYER_BIT};

/// Bitmask of query layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const GROUND: LayerMask = LayerMask(GROUND_LAYER_BIT);
    pub const SPHERE: LayerMask = LayerMask(SPHERE_LAYER_BIT);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

/// A half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction` (zero directions stay zero and hit nothing)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Straight down from `origin`
    pub fn down(origin: Vec3) -> Self {
        Self::new(origin, Vec3::NEG_Y)
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    fn is_degenerate(&self) -> bool {
        self.direction.length_squared() < DIRECTION_EPSILON
    }
}

/// What a ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Ground patch, by index in the scene
    Ground(usize),
    Sphere(SphereHandle),
}

/// Nearest intersection along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub target: HitTarget,
}

/// Spatial query provider
///
/// Queries read the store passed in, so topology changes are visible to the
/// very next call.
pub trait SpatialQuery {
    /// Nearest hit within `max_distance` among geometry on `mask`
    fn raycast(
        &self,
        spheres: &SphereStore,
        ray: Ray,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Snowballs on `mask` touching the query sphere, in no particular order
    fn overlap_region(
        &self,
        spheres: &SphereStore,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
    ) -> Vec<SphereHandle>;
}

/// Horizontal rectangle of ground at a fixed height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPatch {
    /// Minimum (x, z) corner
    pub min: Vec2,
    /// Maximum (x, z) corner
    pub max: Vec2,
    pub height: f32,
    pub layer: LayerMask,
}

impl GroundPatch {
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            height,
            layer: LayerMask::GROUND,
        }
    }

    /// Unbounded plane
    pub fn plane(height: f32) -> Self {
        Self::new(Vec2::splat(f32::NEG_INFINITY), Vec2::splat(f32::INFINITY), height)
    }

    /// Square of half-extent `half` centered on the origin
    pub fn square(half: f32, height: f32) -> Self {
        Self::new(Vec2::splat(-half), Vec2::splat(half), height)
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.y && z <= self.max.y
    }

    /// Distance along `ray` to this patch
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if ray.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.height - ray.origin.y) / ray.direction.y;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        let p = ray.at(t);
        self.contains_xz(p.x, p.z).then_some(t)
    }
}

/// Distance along `ray` to the surface of a sphere
///
/// Rays starting inside the sphere do not hit it.
pub fn raycast_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    if to_center.length_squared() < radius * radius {
        return None;
    }
    let t = to_center.dot(ray.direction);
    if t < 0.0 {
        return None;
    }
    let closest_sq = to_center.length_squared() - t * t;
    let r_sq = radius * radius;
    if closest_sq > r_sq {
        return None;
    }
    Some(t - (r_sq - closest_sq).sqrt())
}

/// Built-in query provider: ground patches + live snowballs
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub ground: Vec<GroundPatch>,
}

impl Scene {
    pub fn new(ground: Vec<GroundPatch>) -> Self {
        Self { ground }
    }

    /// Scene with a single unbounded ground plane
    pub fn flat(height: f32) -> Self {
        Self::new(vec![GroundPatch::plane(height)])
    }

    /// Height of the highest patch covering (x, z)
    pub fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.ground
            .iter()
            .filter(|patch| patch.contains_xz(x, z))
            .map(|patch| patch.height)
            .reduce(f32::max)
    }
}

impl SpatialQuery for Scene {
    fn raycast(
        &self,
        spheres: &SphereStore,
        ray: Ray,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if ray.is_degenerate() {
            return None;
        }

        let mut best: Option<(f32, HitTarget)> = None;
        let mut consider = |t: f32, target: HitTarget| {
            if t <= max_distance && best.is_none_or(|(d, _)| t < d) {
                best = Some((t, target));
            }
        };

        for (i, patch) in self.ground.iter().enumerate() {
            if !patch.layer.intersects(mask) {
                continue;
            }
            if let Some(t) = patch.intersect(&ray) {
                consider(t, HitTarget::Ground(i));
            }
        }

        for (handle, sphere) in spheres.iter() {
            if !sphere.layer.intersects(mask) {
                continue;
            }
            if let Some(t) = raycast_sphere(&ray, sphere.position, sphere.radius()) {
                consider(t, HitTarget::Sphere(handle));
            }
        }

        best.map(|(distance, target)| RayHit {
            point: ray.at(distance),
            distance,
            target,
        })
    }

    fn overlap_region(
        &self,
        spheres: &SphereStore,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
    ) -> Vec<SphereHandle> {
        spheres
            .iter()
            .filter(|(_, sphere)| sphere.layer.intersects(mask))
            .filter(|(_, sphere)| {
                let reach = radius + sphere.radius();
                sphere.position.distance_squared(center) <= reach * reach
            })
            .map(|(handle, _)| handle)
            .collect()
    }
}
