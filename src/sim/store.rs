//! Sphere entity store
//!
//! Owns every live snowball. Handles carry a generation so a handle to a
//! destroyed snowball never resolves again, even after its slot is reused.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::query::LayerMask;

/// Weak reference to a snowball in a [`SphereStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SphereHandle {
    index: u32,
    generation: u32,
}

impl SphereHandle {
    /// Slot index, without checking liveness
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// A snowball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// World-space center
    pub position: Vec3,
    /// Uniform scale; doubles as collision radius
    pub scale: f32,
    /// Query layer
    pub layer: LayerMask,
}

impl Sphere {
    pub fn new(position: Vec3, scale: f32, layer: LayerMask) -> Self {
        Self {
            position,
            scale,
            layer,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.scale
    }

    /// Vertical extent of the bounding volume above the center
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.scale
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    sphere: Option<Sphere>,
}

/// Generational arena of snowballs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SphereStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl SphereStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snowball and return its handle
    ///
    /// Reuses the most recently freed slot when one exists. Callers outside
    /// the crate go through `Session::spawn_sphere_scaled`, which rejects
    /// non-positive scales.
    pub(crate) fn spawn(&mut self, position: Vec3, scale: f32, layer: LayerMask) -> SphereHandle {
        debug_assert!(scale > 0.0, "snowball scale must be positive");
        let sphere = Sphere::new(position, scale, layer);
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.sphere = Some(sphere);
            return SphereHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            sphere: Some(sphere),
        });
        SphereHandle {
            index,
            generation: 0,
        }
    }

    /// Returns `true` if the snowball was removed, `false` if the handle was
    /// already stale.
    pub fn despawn(&mut self, handle: SphereHandle) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.sphere.is_some())
        else {
            return false;
        };
        slot.sphere = None;
        // A slot whose generation would overflow is retired instead of reused
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(handle.index);
            }
            None => log::warn!("retiring snowball slot {} (generation exhausted)", handle.index),
        }
        self.live -= 1;
        true
    }

    pub fn is_alive(&self, handle: SphereHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: SphereHandle) -> Option<&Sphere> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.sphere.as_ref())
    }

    pub fn get_mut(&mut self, handle: SphereHandle) -> Option<&mut Sphere> {
        self.slot_mut(handle).and_then(|slot| slot.sphere.as_mut())
    }

    /// Live snowballs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SphereHandle, &Sphere)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.sphere.as_ref().map(|sphere| {
                (
                    SphereHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    sphere,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Check the bookkeeping of a deserialized store
    ///
    /// Free indices must point at distinct empty slots, the live count must
    /// match the occupied slots and every scale must be finite and positive.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = vec![false; self.slots.len()];
        for &index in &self.free {
            let Some(slot) = self.slots.get(index as usize) else {
                return Err(format!("free slot {index} out of range ({} slots)", self.slots.len()));
            };
            if slot.sphere.is_some() {
                return Err(format!("free slot {index} is occupied"));
            }
            if std::mem::replace(&mut seen[index as usize], true) {
                return Err(format!("free slot {index} listed twice"));
            }
        }

        let occupied = self.slots.iter().filter(|slot| slot.sphere.is_some()).count();
        if occupied != self.live {
            return Err(format!("live count {} but {occupied} occupied slots", self.live));
        }

        for (handle, sphere) in self.iter() {
            if !(sphere.scale.is_finite() && sphere.scale > 0.0) {
                return Err(format!("snowball {} has scale {}", handle.index, sphere.scale));
            }
            if !sphere.position.is_finite() {
                return Err(format!("snowball {} has non-finite position", handle.index));
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, handle: SphereHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.sphere.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_get() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::new(1.0, 2.0, 3.0), 1.5, LayerMask::SPHERE);
        let b = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(store.get(a).unwrap().half_height(), 1.5);
    }

    #[test]
    fn test_despawn_invalidates_handle() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        assert!(store.despawn(a));
        assert!(!store.is_alive(a));
        assert!(store.get(a).is_none());
        assert!(store.get_mut(a).is_none());
        assert!(!store.despawn(a), "double despawn must be a no-op");
        assert!(store.is_empty());
    }

    #[test]
    fn test_reused_slot_does_not_revive_stale_handle() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        store.despawn(a);
        let b = store.spawn(Vec3::ONE, 2.0, LayerMask::SPHERE);
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(store.get(a).is_none());
        assert_eq!(store.get(b).unwrap().scale, 2.0);
    }

    #[test]
    fn test_iter_skips_dead_slots() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        let b = store.spawn(Vec3::X, 1.0, LayerMask::SPHERE);
        let c = store.spawn(Vec3::Y, 1.0, LayerMask::SPHERE);
        store.despawn(b);
        let handles: Vec<_> = store.iter().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![a, c]);
    }

    #[test]
    fn test_serde_preserves_generations() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        store.despawn(a);
        let b = store.spawn(Vec3::X, 3.0, LayerMask::SPHERE);

        let json = serde_json::to_string(&store).unwrap();
        let restored: SphereStore = serde_json::from_str(&json).unwrap();
        assert!(restored.get(a).is_none());
        assert_eq!(restored.get(b).unwrap().scale, 3.0);
        assert_eq!(restored.len(), 1);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_broken_bookkeeping() {
        let mut store = SphereStore::new();
        let a = store.spawn(Vec3::ZERO, 1.0, LayerMask::SPHERE);
        store.spawn(Vec3::X, 1.0, LayerMask::SPHERE);
        store.despawn(a);
        assert!(store.validate().is_ok());

        let mut broken = store.clone();
        broken.free.push(7);
        assert!(broken.validate().unwrap_err().contains("out of range"));

        let mut broken = store.clone();
        broken.free = vec![1];
        assert!(broken.validate().unwrap_err().contains("occupied"));

        let mut broken = store.clone();
        broken.free = vec![0, 0];
        assert!(broken.validate().unwrap_err().contains("twice"));

        let mut broken = store.clone();
        broken.live = 0;
        assert!(broken.validate().unwrap_err().contains("live count"));

        let mut broken = store.clone();
        broken.slots[1].sphere.as_mut().unwrap().scale = -2.0;
        assert!(broken.validate().unwrap_err().contains("scale"));

        let mut broken = store;
        broken.slots[1].sphere.as_mut().unwrap().scale = f32::NAN;
        assert!(broken.validate().is_err());
    }
}
