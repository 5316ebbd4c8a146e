//! Curling Engine demo
//!
//! Plays one seeded end headlessly: eight stones per team, alternating
//! throws with a little random variation, then prints the final layout.
//!
//! Usage: `curling-engine [config.json] [seed]`

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use curling_engine::consts::*;
use curling_engine::sim::{EngineEvent, EventLog, StoneConfig, TeamColor, ThrowParams};
use curling_engine::{Engine, ManualClock, PhysicsConfig, SheetGeometry};

const STONES_PER_TEAM: u8 = 8;
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up on a throw that has not settled after this long (simulated)
const MAX_FRAMES_PER_THROW: usize = 60 * 120;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("Loaded physics config from {path}");
            PhysicsConfig::from_json(&json)?
        }
        None => PhysicsConfig::default(),
    };
    let seed = match args.next() {
        Some(seed) => seed.parse()?,
        None => 7,
    };

    log::info!("Curling Engine demo starting (seed {seed})");

    let clock = ManualClock::new(0.0);
    let events = EventLog::new();
    let mut engine = Engine::new(SheetGeometry::standard(), config)
        .with_clock(clock.clone())
        .with_events(events.clone());

    engine.initialize_stones(&home_trays());
    engine.set_out_tray_layouts(out_trays());
    engine.reset_out_tray_indices();

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut now = 0.0;

    for turn in 0..STONES_PER_TEAM * 2 {
        let color = if turn % 2 == 0 {
            TeamColor::Red
        } else {
            TeamColor::Yellow
        };
        let number = turn / 2 + 1;

        // Draw weight lands around the tee; spin direction alternates by team
        let speed = rng.random_range(4.85..5.25f32);
        let hand = if color == TeamColor::Red { -1.0 } else { 1.0 };
        let spin = rng.random_range(0.8..1.6f32) * hand;
        let offset = rng.random_range(-0.5..0.5f32);
        let aim = rng.random_range(-0.02..0.02f32);
        let velocity = Vec2::new(aim.sin(), aim.cos()) * speed;

        engine.throw_stone(
            ThrowParams::new(color, number, velocity)
                .with_spin(spin)
                .with_offset(offset),
        )?;

        let mut frames = 0;
        loop {
            now += FRAME_MS;
            clock.set(now);
            engine.update(now);
            frames += 1;
            if !engine.is_running() || frames >= MAX_FRAMES_PER_THROW {
                break;
            }
        }

        for event in events.drain() {
            match event {
                EngineEvent::Released { wall_clock_ms } => {
                    log::info!("{color} #{number} released at {wall_clock_ms:.0} ms");
                }
                EngineEvent::HogNearCross => log::info!("  near hog crossed"),
                EngineEvent::HogSplit { duration_ms } => {
                    log::info!("  hog-to-hog {:.2} s", duration_ms / 1000.0);
                }
                EngineEvent::Stopped { stone, is_out } => {
                    log::info!("  {stone} stopped{}", if is_out { " (out)" } else { "" });
                }
            }
        }
    }

    let tee = Vec2::new(0.0, FAR_TEE_Y);
    let mut in_play: Vec<_> = engine
        .stones()
        .iter()
        .filter(|s| s.in_play())
        .map(|s| (s.key(), s.position.distance(tee)))
        .collect();
    in_play.sort_by(|a, b| a.1.total_cmp(&b.1));
    for (key, distance) in &in_play {
        log::info!("{key}: {distance:.2} m from the tee");
    }

    println!("{}", engine.snapshot_json()?);
    Ok(())
}

/// Home slots beside the near end, one column per team
fn home_trays() -> Vec<StoneConfig> {
    let mut configs = Vec::new();
    for number in 1..=STONES_PER_TEAM {
        let y = SHEET_MIN_Y + number as f32 * 3.0 * STONE_RADIUS;
        configs.push(StoneConfig {
            color: TeamColor::Red,
            number,
            position: Vec2::new(SHEET_WIDTH / 2.0 + 0.5, y),
        });
        configs.push(StoneConfig {
            color: TeamColor::Yellow,
            number,
            position: Vec2::new(-SHEET_WIDTH / 2.0 - 0.5, y),
        });
    }
    configs
}

/// Out slots beside the far end
fn out_trays() -> HashMap<TeamColor, Vec<Vec2>> {
    let slots = |x: f32| {
        (0..STONES_PER_TEAM)
            .map(|i| Vec2::new(x, FAR_BACK_Y - i as f32 * 3.0 * STONE_RADIUS))
            .collect::<Vec<_>>()
    };
    HashMap::from([
        (TeamColor::Red, slots(SHEET_WIDTH / 2.0 + 0.5)),
        (TeamColor::Yellow, slots(-SHEET_WIDTH / 2.0 - 0.5)),
    ])
}
