//! Stone simulation module
//!
//! Everything that moves a stone lives here. The pipeline is synchronous and
//! single-threaded:
//! - Stable iteration order (registration order)
//! - Simulated time only inside a step; wall clock only for notifications
//! - No rendering or input dependencies

pub mod boundary;
pub mod collision;
pub mod engine;
pub mod events;
pub mod motion;
pub mod path;
pub mod stone;

pub use boundary::{HogReport, OutTray};
pub use collision::{advance_stone, resolve_collisions, rewind_stone};
pub use engine::{Engine, EngineState, ThrowParams};
pub use events::{EngineEvent, EngineEvents, EventLog, NoopEvents};
pub use motion::{MotionStep, curl_heading_delta, friction_magnitude};
pub use stone::{HogTiming, Stone, StoneConfig, StoneKey, TeamColor};
