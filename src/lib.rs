//! Bubble Pop - a gentle bubble-popping toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, hit-testing, modes)
//! - `renderer`: Canvas 2D frame painter (wasm only)
//! - `audio`: Procedural Web Audio feedback (wasm only)
//! - `roster`: Family roster configuration
//! - `settings`: Runtime preferences

pub mod palette;
pub mod roster;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use roster::Roster;
pub use settings::Settings;

/// Toy configuration constants
pub mod consts {
    /// Fixed simulation timestep (one 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Ticks between automatic spawns in normal mode (~600 ms)
    pub const SPAWN_INTERVAL_TICKS: u64 = 36;
    /// Ticks between automatic spawns in calm mode (~1200 ms)
    pub const CALM_SPAWN_INTERVAL_TICKS: u64 = 72;
    /// Ceiling on live (non-popping) bubbles
    pub const MAX_LIVE_BUBBLES: usize = 35;
    /// Chance a spawned bubble carries a family photo
    pub const FAMILY_CHANCE: f32 = 0.18;

    /// Bubble diameter ranges per category (pixels)
    pub const BUBBLE_SIZE_MIN: f32 = 40.0;
    pub const BUBBLE_SIZE_MAX: f32 = 110.0;
    pub const FAMILY_SIZE_MIN: f32 = 70.0;
    pub const FAMILY_SIZE_MAX: f32 = 120.0;

    /// Upward drift per tick (pixels)
    pub const RISE_SPEED_MIN: f32 = 0.5;
    pub const RISE_SPEED_MAX: f32 = 1.2;
    pub const CALM_RISE_SPEED_MIN: f32 = 0.3;
    pub const CALM_RISE_SPEED_MAX: f32 = 0.7;

    /// Sinusoidal horizontal wobble
    pub const WOBBLE_SPEED_MIN: f32 = 0.01;
    pub const WOBBLE_SPEED_MAX: f32 = 0.03;
    pub const WOBBLE_AMPLITUDE: f32 = 0.5;

    /// Popping animation: fade and growth per tick
    pub const POP_FADE_PER_TICK: f32 = 0.08;
    pub const POP_GROWTH_PER_TICK: f32 = 3.0;
    /// Extra tolerance around a bubble's radius when hit-testing taps
    pub const HIT_MARGIN: f32 = 10.0;

    /// Points per pop
    pub const NORMAL_POP_POINTS: u64 = 1;
    pub const FAMILY_POP_POINTS: u64 = 5;

    /// Sparkle burst sizes and physics
    pub const SPARKLES_PER_POP: usize = 8;
    pub const SPARKLES_PER_FAMILY_POP: usize = 14;
    pub const SPARKLE_GRAVITY: f32 = 0.05;
    pub const SPARKLE_FADE_PER_TICK: f32 = 0.025;

    /// Background starfield size (reseeded on resize)
    pub const BG_STAR_COUNT: usize = 40;
    /// Star mode keeps this many placed stars, oldest evicted first
    pub const MAX_PLACED_STARS: usize = 100;
    /// Star-mode tap counts that each reveal one family name
    pub const REVEAL_THRESHOLDS: [u32; 6] = [10, 20, 35, 50, 70, 90];

    /// Name reveal animation
    pub const REVEAL_RISE_PER_TICK: f32 = 0.8;
    pub const REVEAL_FADE_IN: f32 = 0.05;
    pub const REVEAL_SCALE_STEP: f32 = 0.04;
    pub const REVEAL_LIFE_DECAY: f32 = 0.006;
    pub const REVEAL_FADE_OUT: f32 = 0.02;
}

/// Twinkle alpha for stars: oscillates in [0.3, 1.0] over elapsed ticks
#[inline]
pub fn twinkle_alpha(time_ticks: u64, speed: f32, phase: f32) -> f32 {
    0.3 + 0.7 * (time_ticks as f32 * speed + phase).sin().abs()
}

#[cfg(test)]
mod tests {
    use super::twinkle_alpha;

    #[test]
    fn test_twinkle_alpha_range() {
        for t in 0..1000u64 {
            let a = twinkle_alpha(t, 0.015, 1.3);
            assert!((0.3..=1.0).contains(&a), "alpha {} out of range at {}", a, t);
        }
    }
}
