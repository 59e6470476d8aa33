//! Save/load of a running session
//!
//! Versioned JSON envelope. The session is restored exactly, including the
//! snowball being rolled and the store's handle generations.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::Session;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub session: Session,
}

/// Serialize a session
pub fn save_to_string(session: &Session) -> Result<String> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        session: session.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Restore a session, rejecting other format versions, invalid settings and
/// inconsistent snowball stores
pub fn load_from_str(json: &str) -> Result<Session> {
    let envelope: SaveEnvelope = serde_json::from_str(json)?;
    if envelope.version != SAVE_VERSION {
        return Err(Error::UnsupportedVersion {
            found: envelope.version,
            expected: SAVE_VERSION,
        });
    }
    envelope.session.settings.validate()?;
    envelope
        .session
        .spheres
        .validate()
        .map_err(|reason| Error::CorruptSave { reason })?;
    log::info!(
        "Restored session at tick {} ({} snowballs)",
        envelope.session.time_ticks,
        envelope.session.spheres.len()
    );
    Ok(envelope.session)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::sim::{Pointer, Ray, Scene, SessionPhase, TickInput, tick};

    #[test]
    fn test_resume_mid_growth() {
        let scene = Scene::flat(0.0);
        let pointer = Pointer::Ray(Ray::down(Vec3::new(1.0, 10.0, 1.0)));
        let mut session = Session::default();
        tick(&mut session, &scene, &TickInput::press(pointer));
        let handle = session.phase.active().unwrap();

        let json = save_to_string(&session).unwrap();
        let mut restored = load_from_str(&json).unwrap();
        assert_eq!(restored.phase, SessionPhase::Growing(handle));
        assert_eq!(restored.time_ticks, session.time_ticks);
        assert_eq!(restored.spheres.get(handle), session.spheres.get(handle));

        // Both continue identically
        let drag = TickInput::drag(pointer, glam::Vec2::new(2.0, 2.0));
        tick(&mut session, &scene, &drag);
        tick(&mut restored, &scene, &drag);
        assert_eq!(restored.spheres.get(handle), session.spheres.get(handle));
    }

    #[test]
    fn test_rejects_future_version() {
        let session = Session::default();
        let json = save_to_string(&session).unwrap();
        let bumped = json.replacen("\"version\":1", "\"version\":99", 1);
        let err = load_from_str(&bumped).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedVersion {
                found: 99,
                expected: SAVE_VERSION
            }
        ));
    }

    #[test]
    fn test_rejects_tampered_store() {
        let mut session = Session::default();
        session.spawn_sphere(Vec3::new(0.0, 1.0, 0.0));
        let json = save_to_string(&session).unwrap();
        assert!(json.contains("\"scale\":1.0"));
        assert!(json.contains("\"free\":[]"));

        let negative = json.replacen("\"scale\":1.0", "\"scale\":-2.0", 1);
        assert!(matches!(load_from_str(&negative).unwrap_err(), Error::CorruptSave { .. }));

        let dangling_free = json.replacen("\"free\":[]", "\"free\":[7]", 1);
        assert!(matches!(load_from_str(&dangling_free).unwrap_err(), Error::CorruptSave { .. }));

        let live_mismatch = json.replacen("\"live\":1", "\"live\":0", 1);
        assert!(matches!(load_from_str(&live_mismatch).unwrap_err(), Error::CorruptSave { .. }));

        // The untouched save still restores and keeps working
        let mut restored = load_from_str(&json).unwrap();
        let scene = Scene::flat(0.0);
        tick(
            &mut restored,
            &scene,
            &TickInput::press(Pointer::Ray(Ray::down(Vec3::new(5.0, 10.0, 5.0)))),
        );
        assert_eq!(restored.spheres.len(), 2);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(load_from_str("nope").unwrap_err(), Error::Json(_)));
    }
}
