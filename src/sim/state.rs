//! Session state
//!
//! Everything the simulation mutates lives here and is serializable, so a
//! session can be saved mid-growth and resumed.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::query::Ray;
use super::resolve::Contact;
use super::store::{Sphere, SphereHandle, SphereStore};
use crate::settings::Settings;

/// Which snowball, if any, the player is rolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Rolling this snowball. The handle may go stale if something else
    /// destroys it; the session then idles until release.
    Growing(SphereHandle),
}

impl SessionPhase {
    pub fn active(&self) -> Option<SphereHandle> {
        match *self {
            SessionPhase::Idle => None,
            SessionPhase::Growing(handle) => Some(handle),
        }
    }

    pub fn is_growing(&self) -> bool {
        matches!(self, SessionPhase::Growing(_))
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// A new snowball was made at the press point
    Spawned { handle: SphereHandle, position: Vec3 },
    /// An existing snowball was grabbed
    PickedUp(SphereHandle),
    /// Press hit nothing and was dropped
    PressIgnored,
    /// Snowball followed the pointer and grew
    Grew { handle: SphereHandle, scale: f32 },
    Contact(Contact),
    Released(SphereHandle),
    /// The rolled snowball no longer exists
    ActiveLost(SphereHandle),
}

/// Where the pointer is this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pointer {
    /// Pixels, top-left origin; projected through the session camera
    Screen(Vec2),
    /// World ray supplied by the host
    Ray(Ray),
}

impl Default for Pointer {
    fn default() -> Self {
        Pointer::Screen(Vec2::ZERO)
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub settings: Settings,
    pub camera: Camera,
    /// Viewport size in pixels, for screen-space pointers
    pub viewport: Vec2,
    pub spheres: SphereStore,
    pub phase: SessionPhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Set once a lost active snowball has been reported
    #[serde(default)]
    lost_reported: bool,
    /// Events from the most recent tick
    #[serde(skip)]
    events: Vec<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            camera: Camera::default(),
            viewport: Vec2::new(1280.0, 720.0),
            spheres: SphereStore::new(),
            phase: SessionPhase::Idle,
            time_ticks: 0,
            lost_reported: false,
            events: Vec::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera, viewport: Vec2) -> Self {
        self.camera = camera;
        self.viewport = viewport;
        self
    }

    /// Spawn a snowball at the prefab scale
    pub fn spawn_sphere(&mut self, position: Vec3) -> SphereHandle {
        let scale = self.settings.prefab_scale;
        self.spawn_sphere_scaled(position, scale)
    }

    /// Spawn a snowball of a given size; non-positive sizes fall back to the prefab scale
    pub fn spawn_sphere_scaled(&mut self, position: Vec3, scale: f32) -> SphereHandle {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            log::warn!("rejecting snowball scale {scale}, using prefab scale");
            self.settings.prefab_scale
        };
        self.spheres.spawn(position, scale, self.settings.sphere_layer)
    }

    /// Live snowball currently being rolled
    pub fn active(&self) -> Option<(SphereHandle, &Sphere)> {
        let handle = self.phase.active()?;
        self.spheres.get(handle).map(|sphere| (handle, sphere))
    }

    /// Events from the most recent tick
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// World ray for a pointer
    pub fn pointer_ray(&self, pointer: Pointer) -> Ray {
        match pointer {
            Pointer::Screen(screen) => self.camera.screen_point_to_ray(screen, self.viewport),
            Pointer::Ray(ray) => ray,
        }
    }

    pub(crate) fn begin_tick(&mut self) {
        self.events.clear();
        self.time_ticks += 1;
    }

    pub(crate) fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub(crate) fn start_growing(&mut self, handle: SphereHandle) {
        self.phase = SessionPhase::Growing(handle);
        self.lost_reported = false;
    }

    pub(crate) fn stop_growing(&mut self) -> Option<SphereHandle> {
        let released = self.phase.active();
        self.phase = SessionPhase::Idle;
        self.lost_reported = false;
        released
    }

    /// Returns `true` the first time a lost active snowball is noticed
    pub(crate) fn mark_lost(&mut self) -> bool {
        !std::mem::replace(&mut self.lost_reported, true)
    }
}
