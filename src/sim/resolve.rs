//! Contact resolution for the controlled snowball
//!
//! Every snowball touching the controlled one is either absorbed (if the
//! controlled one is strictly bigger) or climbed on top of.

use std::cmp::Ordering;

use glam::Vec3;

use super::query::SpatialQuery;
use super::store::{SphereHandle, SphereStore};
use crate::settings::Settings;
use crate::{absorbed_scale, horizontal_distance};

/// Outcome of one pairwise contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// `other` was destroyed and its size folded into the active snowball
    Absorbed {
        other: SphereHandle,
        other_scale: f32,
        scale_before: f32,
        scale_after: f32,
    },
    /// The active snowball was lifted onto `other`
    Stacked {
        other: SphereHandle,
        y_before: f32,
        y_after: f32,
    },
    /// Stack candidate too far off-center to climb
    OutOfReach {
        other: SphereHandle,
        horizontal_distance: f32,
    },
}

impl Contact {
    pub fn other(&self) -> SphereHandle {
        match *self {
            Contact::Absorbed { other, .. }
            | Contact::Stacked { other, .. }
            | Contact::OutOfReach { other, .. } => other,
        }
    }
}

/// Overlapping snowballs ordered nearest-first, ties by handle
///
/// The active snowball itself is excluded.
pub fn contact_candidates<Q: SpatialQuery + ?Sized>(
    store: &SphereStore,
    query: &Q,
    active: SphereHandle,
    settings: &Settings,
) -> Vec<SphereHandle> {
    let Some(sphere) = store.get(active) else {
        return Vec::new();
    };
    let center = sphere.position;

    let mut candidates: Vec<(f32, SphereHandle)> = query
        .overlap_region(store, center, sphere.scale, settings.sphere_layer)
        .into_iter()
        .filter(|&handle| handle != active)
        .filter_map(|handle| {
            store
                .get(handle)
                .map(|other| (other.position.distance_squared(center), handle))
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    candidates.dedup_by_key(|c| c.1);
    candidates.into_iter().map(|(_, handle)| handle).collect()
}

/// Apply the absorb-or-stack rule against every touching snowball
///
/// Each comparison reads the active snowball's current size, so an absorb
/// earlier in the pass can turn a later stack into another absorb.
pub fn resolve_contacts<Q: SpatialQuery + ?Sized>(
    store: &mut SphereStore,
    query: &Q,
    active: SphereHandle,
    settings: &Settings,
) -> Vec<Contact> {
    let candidates = contact_candidates(store, query, active, settings);
    let mut contacts = Vec::with_capacity(candidates.len());

    for other in candidates {
        let (Some(me), Some(them)) = (store.get(active).copied(), store.get(other).copied()) else {
            continue;
        };

        if me.scale > them.scale {
            store.despawn(other);
            let scale_after = settings
                .clamp_scale(absorbed_scale(me.scale, them.scale))
                .max(me.scale);
            if let Some(sphere) = store.get_mut(active) {
                sphere.scale = scale_after;
            }
            log::debug!(
                "snowball {:?} absorbed {:?}: {:.3} -> {:.3}",
                active,
                other,
                me.scale,
                scale_after
            );
            contacts.push(Contact::Absorbed {
                other,
                other_scale: them.scale,
                scale_before: me.scale,
                scale_after,
            });
            continue;
        }

        if let Some(reach) = settings.max_stack_distance {
            let horizontal = horizontal_distance(me.position, them.position);
            if horizontal > reach {
                log::trace!("{:?} out of stacking reach ({:.3} > {:.3})", other, horizontal, reach);
                contacts.push(Contact::OutOfReach {
                    other,
                    horizontal_distance: horizontal,
                });
                continue;
            }
        }

        let y_after = them.position.y + them.half_height() + me.scale;
        if let Some(sphere) = store.get_mut(active) {
            sphere.position = Vec3::new(me.position.x, y_after, me.position.z);
        }
        log::debug!("snowball {:?} stacked on {:?} at y={:.3}", active, other, y_after);
        contacts.push(Contact::Stacked {
            other,
            y_before: me.position.y,
            y_after,
        });
    }

    contacts
}
