//! Snowball Stack headless demo
//!
//! Scatters snowballs over a field, rolls one through them with a scripted,
//! seeded pointer path and prints the final field as JSON.

use std::path::PathBuf;

use clap::Parser;
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use snowball_stack::Settings;
use snowball_stack::sim::{
    Camera, Contact, GroundPatch, Pointer, Scene, Session, SessionEvent, TickInput, tick,
};

#[derive(Parser, Debug)]
#[command(about = "Roll a snowball through a seeded field and report the result", version)]
struct Args {
    /// RNG seed for the field and the pointer path
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Frames to simulate while the trigger is held
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Snowballs scattered before rolling starts
    #[arg(long, default_value_t = 24)]
    spheres: u32,
    /// Half-width of the square field
    #[arg(long, default_value_t = 30.0)]
    field: f32,
    /// Settings JSON (defaults when omitted)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    ticks: u32,
    absorbed: usize,
    stacked: usize,
    spheres: Vec<SphereReport>,
}

#[derive(Serialize)]
struct SphereReport {
    position: [f32; 3],
    scale: f32,
    rolled: bool,
}

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if !(args.field > 0.0) {
        anyhow::bail!("--field must be positive");
    }

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    log::info!("Snowball Stack demo (seed {}, {} ticks)", args.seed, args.ticks);

    let scene = Scene::new(vec![GroundPatch::square(args.field, 0.0)]);
    let camera = Camera::look_at(Vec3::new(0.0, args.field * 1.5, args.field * 1.5), Vec3::ZERO);
    let mut session = Session::new(settings).with_camera(camera, VIEWPORT);
    let mut rng = Pcg32::seed_from_u64(args.seed);

    for _ in 0..args.spheres {
        let scale = rng.random_range(0.3f32..3.0);
        let x = rng.random_range(-args.field..args.field);
        let z = rng.random_range(-args.field..args.field);
        session.spawn_sphere_scaled(Vec3::new(x, scale, z), scale);
    }

    // Start near the bottom-center of the screen so the press lands on open ground
    let mut pointer = Vec2::new(VIEWPORT.x * 0.5, VIEWPORT.y * 0.9);
    tick(&mut session, &scene, &TickInput::press(Pointer::Screen(pointer)));
    let rolled = session.phase.active();

    let (mut absorbed, mut stacked) = (0, 0);
    let mut heading = -std::f32::consts::FRAC_PI_2;
    for _ in 0..args.ticks {
        heading += rng.random_range(-0.3f32..0.3);
        let delta = Vec2::new(heading.cos(), heading.sin()) * rng.random_range(1.0f32..6.0);
        pointer = (pointer + delta).clamp(Vec2::ZERO, VIEWPORT);

        tick(
            &mut session,
            &scene,
            &TickInput::drag(Pointer::Screen(pointer), delta),
        );
        for event in session.events() {
            match event {
                SessionEvent::Contact(Contact::Absorbed { .. }) => absorbed += 1,
                SessionEvent::Contact(Contact::Stacked { .. }) => stacked += 1,
                _ => {}
            }
        }
    }

    tick(&mut session, &scene, &TickInput::release(Pointer::Screen(pointer)));

    let summary = Summary {
        seed: args.seed,
        ticks: args.ticks,
        absorbed,
        stacked,
        spheres: session
            .spheres
            .iter()
            .map(|(handle, sphere)| SphereReport {
                position: sphere.position.to_array(),
                scale: sphere.scale,
                rolled: Some(handle) == rolled,
            })
            .collect(),
    };
    log::info!(
        "{} snowballs left, {} absorbed, {} stack contacts",
        summary.spheres.len(),
        absorbed,
        stacked
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
