//! Entity stores and toy state
//!
//! Every transient visual entity lives in one of the `Vec` stores here and is
//! owned by it exclusively; nothing survives the page session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::palette;

/// A drifting bubble
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: u32,
    pub pos: Vec2,
    /// Diameter in pixels (grows while popping)
    pub size: f32,
    /// Index into the bubble fill/highlight palettes
    pub color_idx: usize,
    /// Upward drift per tick
    pub rise_speed: f32,
    pub wobble_phase: f32,
    pub wobble_speed: f32,
    /// `Some(roster slot)` for family photo bubbles
    pub family_idx: Option<usize>,
    pub opacity: f32,
    /// Set exactly once; a popping bubble fades out and cannot be popped again
    pub popping: bool,
    /// Tick on which the bubble was created
    pub spawned_tick: u64,
}

impl Bubble {
    pub fn is_family(&self) -> bool {
        self.family_idx.is_some()
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Score value when popped
    pub fn points(&self) -> u64 {
        if self.is_family() {
            FAMILY_POP_POINTS
        } else {
            NORMAL_POP_POINTS
        }
    }
}

/// A pop-burst sparkle (four-pointed star, fades by life)
#[derive(Debug, Clone)]
pub struct Sparkle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 -> 0, removed at zero
    pub life: f32,
    pub size: f32,
    /// Glow-ring palette index for family bursts, fill palette otherwise
    pub color_idx: usize,
    pub special: bool,
}

/// A background star, twinkling behind everything
#[derive(Debug, Clone)]
pub struct BgStar {
    pub pos: Vec2,
    pub size: f32,
    pub twinkle_speed: f32,
    pub phase: f32,
}

/// A star placed by a tap in star mode
#[derive(Debug, Clone)]
pub struct StarMark {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub color_idx: usize,
    pub twinkle_speed: f32,
    pub phase: f32,
}

/// A family name floating up after a reveal
#[derive(Debug, Clone)]
pub struct NameReveal {
    pub name: String,
    pub pos: Vec2,
    pub opacity: f32,
    pub scale: f32,
    /// 1 -> 0; fade-in above 0.5, fade-out below 0.3
    pub life: f32,
}

impl NameReveal {
    pub fn new(name: String, pos: Vec2) -> Self {
        Self {
            name,
            pos,
            opacity: 0.0,
            scale: 0.3,
            life: 1.0,
        }
    }
}

/// Independent mode toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Slower spawns, quieter audio, hidden score
    pub calm: bool,
    /// Taps place stars instead of popping bubbles
    pub star: bool,
}

/// Something the platform layer reacts to (audio, mostly)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A bubble transitioned to popping
    Popped { family_idx: Option<usize> },
    /// A family name reveal started
    NameRevealed { name: String },
    /// A new bubble entered the store
    Spawned { id: u32 },
}

/// Complete toy state. Deterministic: a seed plus an input sequence replays
/// to an identical state.
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    /// Canvas backing-store size in pixels
    pub canvas_size: Vec2,
    /// Frame counter (60 Hz nominal)
    pub time_ticks: u64,
    pub last_spawn_tick: u64,
    /// Monotonic; frozen while calm mode is active
    pub score: u64,
    pub mode: Mode,
    /// Star-mode cumulative tap count
    pub star_taps: u32,
    /// Next unfired entry in `REVEAL_THRESHOLDS`
    pub reveal_cursor: usize,
    /// Family member names, indexed by `Bubble::family_idx`
    pub family: Vec<String>,
    pub bubbles: Vec<Bubble>,
    pub sparkles: Vec<Sparkle>,
    pub bg_stars: Vec<BgStar>,
    pub star_marks: Vec<StarMark>,
    pub reveals: Vec<NameReveal>,
    /// Drained by the platform layer each frame
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, canvas_size: Vec2, family: Vec<String>) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            canvas_size,
            time_ticks: 0,
            last_spawn_tick: 0,
            score: 0,
            mode: Mode::default(),
            star_taps: 0,
            reveal_cursor: 0,
            family,
            bubbles: Vec::new(),
            sparkles: Vec::new(),
            bg_stars: Vec::new(),
            star_marks: Vec::with_capacity(MAX_PLACED_STARS),
            reveals: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.reseed_bg_stars();
        state
    }

    /// Allocate a new entity ID (monotone, never reused)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Bubbles that can still be popped or counted against the ceiling
    pub fn live_bubble_count(&self) -> usize {
        self.bubbles.iter().filter(|b| !b.popping).count()
    }

    /// Resize the canvas and rebuild the background starfield
    pub fn resize(&mut self, canvas_size: Vec2) {
        self.canvas_size = canvas_size;
        self.reseed_bg_stars();
    }

    /// Scatter a fresh background starfield across the canvas
    pub fn reseed_bg_stars(&mut self) {
        let (w, h) = (self.canvas_size.x.max(1.0), self.canvas_size.y.max(1.0));
        self.bg_stars.clear();
        for _ in 0..BG_STAR_COUNT {
            self.bg_stars.push(BgStar {
                pos: Vec2::new(
                    self.rng.random_range(0.0..w),
                    self.rng.random_range(0.0..h),
                ),
                size: self.rng.random_range(1.0..3.0),
                twinkle_speed: self.rng.random_range(0.005..0.02),
                phase: self.rng.random_range(0.0..std::f32::consts::TAU),
            });
        }
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pick a fill/highlight palette index
    pub(crate) fn random_color_idx(&mut self) -> usize {
        self.rng.random_range(0..palette::BUBBLE_FILLS.len())
    }
}
