//! Deterministic toy simulation
//!
//! Pure logic with no platform dependencies: entity stores, the per-frame
//! tick, and tap hit-testing. Everything here runs natively under `cargo
//! test`; the wasm layers feed it input and draw its state.

pub mod hit;
pub mod state;
pub mod tick;

pub use hit::{find_hit, to_canvas_space};
pub use state::{Bubble, BgStar, GameEvent, GameState, Mode, NameReveal, Sparkle, StarMark};
pub use tick::{tick, TickInput};
