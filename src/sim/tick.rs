//! Per-frame simulation tick
//!
//! Spawner, tap dispatch, and the physics/lifecycle updater. One call
//! advances exactly one nominal 60 Hz frame; the platform layer drives it
//! through a fixed-timestep accumulator.

use glam::Vec2;
use rand::Rng;

use super::hit::find_hit;
use super::state::{Bubble, GameEvent, GameState, NameReveal, Sparkle, StarMark};
use crate::consts::*;
use crate::palette;

/// Input for a single tick. Taps are already in canvas pixel space.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub taps: Vec<Vec2>,
    pub toggle_calm: bool,
    pub toggle_star: bool,
}

/// Advance the toy by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.toggle_calm {
        state.mode.calm = !state.mode.calm;
    }
    if input.toggle_star {
        state.mode.star = !state.mode.star;
    }

    state.time_ticks += 1;

    for &tap in &input.taps {
        if state.mode.star {
            place_star(state, tap);
        } else {
            dispatch_tap(state, tap);
        }
    }

    // Automatic spawner (bubbles only; star mode pauses it)
    let interval = if state.mode.calm {
        CALM_SPAWN_INTERVAL_TICKS
    } else {
        SPAWN_INTERVAL_TICKS
    };
    if !state.mode.star
        && state.time_ticks - state.last_spawn_tick >= interval
        && state.live_bubble_count() < MAX_LIVE_BUBBLES
    {
        spawn_bubble(state, None);
        state.last_spawn_tick = state.time_ticks;
    }

    update_bubbles(state);
    update_sparkles(state);
    update_reveals(state);
}

/// Pop the bubble under a tap, or blow a new one at the tapped point
fn dispatch_tap(state: &mut GameState, tap: Vec2) {
    if let Some(idx) = find_hit(&state.bubbles, tap) {
        pop_bubble(state, idx);
    } else if state.live_bubble_count() < MAX_LIVE_BUBBLES {
        spawn_bubble(state, Some(tap));
    }
}

/// Transition a bubble to popping. Idempotent: an already-popping bubble is
/// left alone (no double score, no second burst).
fn pop_bubble(state: &mut GameState, idx: usize) {
    if state.bubbles[idx].popping {
        return;
    }
    state.bubbles[idx].popping = true;

    let pos = state.bubbles[idx].pos;
    let family_idx = state.bubbles[idx].family_idx;
    let points = state.bubbles[idx].points();

    spawn_sparkles(state, pos, family_idx);

    if let Some(fi) = family_idx
        && let Some(name) = state.family.get(fi).cloned()
    {
        state.reveals.push(NameReveal::new(name.clone(), pos));
        state.events.push(GameEvent::NameRevealed { name });
    }

    if !state.mode.calm {
        state.score += points;
    }
    state.events.push(GameEvent::Popped { family_idx });
}

/// Append one bubble: at `at` when tapped into existence, otherwise at a
/// random spot just below the bottom edge.
fn spawn_bubble(state: &mut GameState, at: Option<Vec2>) -> u32 {
    let calm = state.mode.calm;
    let is_family = !state.family.is_empty() && state.rng.random::<f32>() < FAMILY_CHANCE;
    let family_idx = if is_family {
        Some(state.rng.random_range(0..state.family.len()))
    } else {
        None
    };
    let size = if is_family {
        state.rng.random_range(FAMILY_SIZE_MIN..FAMILY_SIZE_MAX)
    } else {
        state.rng.random_range(BUBBLE_SIZE_MIN..BUBBLE_SIZE_MAX)
    };
    let (speed_lo, speed_hi) = if calm {
        (CALM_RISE_SPEED_MIN, CALM_RISE_SPEED_MAX)
    } else {
        (RISE_SPEED_MIN, RISE_SPEED_MAX)
    };
    let pos = match at {
        Some(p) => p,
        None => {
            let span = (state.canvas_size.x - size).max(1.0);
            Vec2::new(
                state.rng.random_range(0.0..span) + size / 2.0,
                state.canvas_size.y + size,
            )
        }
    };

    let id = state.next_entity_id();
    let color_idx = state.random_color_idx();
    let bubble = Bubble {
        id,
        pos,
        size,
        color_idx,
        rise_speed: state.rng.random_range(speed_lo..speed_hi),
        wobble_phase: state.rng.random_range(0.0..std::f32::consts::TAU),
        wobble_speed: state.rng.random_range(WOBBLE_SPEED_MIN..WOBBLE_SPEED_MAX),
        family_idx,
        opacity: 1.0,
        popping: false,
        spawned_tick: state.time_ticks,
    };
    state.bubbles.push(bubble);
    state.events.push(GameEvent::Spawned { id });
    id
}

/// Radial sparkle burst at a pop point
fn spawn_sparkles(state: &mut GameState, pos: Vec2, family_idx: Option<usize>) {
    let special = family_idx.is_some();
    let count = if special {
        SPARKLES_PER_FAMILY_POP
    } else {
        SPARKLES_PER_POP
    };
    let speed_spread = if special { 4.0 } else { 3.0 };
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count as f32
            + state.rng.random_range(0.0..0.3);
        let speed = 2.0 + state.rng.random_range(0.0..speed_spread);
        let color_idx = match family_idx {
            Some(fi) => fi % palette::GLOW_RINGS.len(),
            None => state.random_color_idx(),
        };
        let id = state.next_entity_id();
        state.sparkles.push(Sparkle {
            id,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            size: if special { 5.0 } else { 3.0 },
            color_idx,
            special,
        });
    }
}

/// Star-mode tap: place a star, advance the tap counter, and fire a name
/// reveal when a milestone is crossed (each milestone fires at most once).
fn place_star(state: &mut GameState, tap: Vec2) {
    let id = state.next_entity_id();
    let size = state.rng.random_range(6.0..14.0);
    let color_idx = state.rng.random_range(0..palette::GLOW_RINGS.len());
    let twinkle_speed = state.rng.random_range(0.01..0.05);
    let phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    state.star_marks.push(StarMark {
        id,
        pos: tap,
        size,
        color_idx,
        twinkle_speed,
        phase,
    });
    if state.star_marks.len() > MAX_PLACED_STARS {
        state.star_marks.remove(0);
    }

    state.star_taps += 1;
    if state.reveal_cursor < REVEAL_THRESHOLDS.len()
        && state.star_taps == REVEAL_THRESHOLDS[state.reveal_cursor]
    {
        if !state.family.is_empty() {
            let name = state.family[state.reveal_cursor % state.family.len()].clone();
            state.reveals.push(NameReveal::new(name.clone(), tap));
            state.events.push(GameEvent::NameRevealed { name });
        }
        state.reveal_cursor += 1;
    }
}

/// Advance bubbles; iterate backward because removal happens mid-traversal
fn update_bubbles(state: &mut GameState) {
    let t = state.time_ticks as f32;
    for i in (0..state.bubbles.len()).rev() {
        let b = &mut state.bubbles[i];
        if b.popping {
            b.opacity -= POP_FADE_PER_TICK;
            b.size += POP_GROWTH_PER_TICK;
            if b.opacity <= 0.0 {
                state.bubbles.remove(i);
            }
        } else {
            b.pos.y -= b.rise_speed;
            b.pos.x += (t * b.wobble_speed + b.wobble_phase).sin() * WOBBLE_AMPLITUDE;
            if b.pos.y < -b.size {
                state.bubbles.remove(i);
            }
        }
    }
}

fn update_sparkles(state: &mut GameState) {
    for s in state.sparkles.iter_mut() {
        s.pos += s.vel;
        s.vel.y += SPARKLE_GRAVITY;
        s.life -= SPARKLE_FADE_PER_TICK;
    }
    state.sparkles.retain(|s| s.life > 0.0);
}

fn update_reveals(state: &mut GameState) {
    for nr in state.reveals.iter_mut() {
        if nr.opacity < 1.0 && nr.life > 0.5 {
            nr.opacity = (nr.opacity + REVEAL_FADE_IN).min(1.0);
            nr.scale = (nr.scale + REVEAL_SCALE_STEP).min(1.0);
        }
        nr.pos.y -= REVEAL_RISE_PER_TICK;
        nr.life -= REVEAL_LIFE_DECAY;
        if nr.life < 0.3 {
            nr.opacity = (nr.opacity - REVEAL_FADE_OUT).max(0.0);
        }
    }
    state.reveals.retain(|nr| nr.life > 0.0 && nr.opacity > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_state(seed: u64) -> GameState {
        GameState::new(
            seed,
            Vec2::new(800.0, 600.0),
            vec!["Ada".into(), "Diana".into(), "Santiago".into()],
        )
    }

    fn family_bubble(state: &mut GameState, pos: Vec2, family_idx: usize) -> u32 {
        let id = state.next_entity_id();
        state.bubbles.push(Bubble {
            id,
            pos,
            size: 80.0,
            color_idx: 0,
            rise_speed: 0.5,
            wobble_phase: 0.0,
            wobble_speed: 0.02,
            family_idx: Some(family_idx),
            opacity: 1.0,
            popping: false,
            spawned_tick: state.time_ticks,
        });
        id
    }

    #[test]
    fn test_tap_on_empty_space_spawns_one_bubble_there() {
        let mut state = test_state(1);
        let tap = Vec2::new(400.0, 300.0);
        tick(
            &mut state,
            &TickInput {
                taps: vec![tap],
                ..Default::default()
            },
        );
        assert_eq!(state.bubbles.len(), 1);
        // One frame of drift has been applied since the spawn
        assert!(state.bubbles[0].pos.distance(tap) < 2.0);
        let events = state.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Spawned { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_tap_on_bubble_pops_without_spawning() {
        let mut state = test_state(2);
        let tap = Vec2::new(400.0, 300.0);
        tick(
            &mut state,
            &TickInput {
                taps: vec![tap],
                ..Default::default()
            },
        );
        let points = state.bubbles[0].points();
        state.drain_events();

        tick(
            &mut state,
            &TickInput {
                taps: vec![tap],
                ..Default::default()
            },
        );
        assert_eq!(state.bubbles.len(), 1);
        assert!(state.bubbles[0].popping);
        assert_eq!(state.score, points);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Popped { .. })));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::Spawned { .. }))
        );
    }

    #[test]
    fn test_pop_is_idempotent() {
        let mut state = test_state(3);
        let id = family_bubble(&mut state, Vec2::new(200.0, 200.0), 0);
        let idx = state.bubbles.iter().position(|b| b.id == id).unwrap();

        pop_bubble(&mut state, idx);
        let score = state.score;
        let sparkles = state.sparkles.len();
        let reveals = state.reveals.len();

        pop_bubble(&mut state, idx);
        assert_eq!(state.score, score);
        assert_eq!(state.sparkles.len(), sparkles);
        assert_eq!(state.reveals.len(), reveals);
    }

    #[test]
    fn test_family_pop_scores_reveals_and_bursts() {
        let mut state = test_state(4);
        family_bubble(&mut state, Vec2::new(200.0, 200.0), 1);
        tick(
            &mut state,
            &TickInput {
                taps: vec![Vec2::new(200.0, 200.0)],
                ..Default::default()
            },
        );
        assert_eq!(state.score, FAMILY_POP_POINTS);
        assert_eq!(state.sparkles.len(), SPARKLES_PER_FAMILY_POP);
        assert_eq!(state.reveals.len(), 1);
        assert_eq!(state.reveals[0].name, "Diana");
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::NameRevealed { name } if name == "Diana"))
        );
    }

    #[test]
    fn test_calm_mode_suppresses_score() {
        let mut state = test_state(5);
        tick(
            &mut state,
            &TickInput {
                toggle_calm: true,
                ..Default::default()
            },
        );
        assert!(state.mode.calm);

        family_bubble(&mut state, Vec2::new(200.0, 200.0), 0);
        tick(
            &mut state,
            &TickInput {
                taps: vec![Vec2::new(200.0, 200.0)],
                ..Default::default()
            },
        );
        assert!(state.bubbles.iter().any(|b| b.popping));
        assert_eq!(state.score, 0);
        // Sparkles and the reveal still fire; only the score is held back
        assert_eq!(state.sparkles.len(), SPARKLES_PER_FAMILY_POP);
        assert_eq!(state.reveals.len(), 1);
    }

    #[test]
    fn test_spawner_respects_mode_interval() {
        let mut state = test_state(6);
        for _ in 0..SPAWN_INTERVAL_TICKS - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.bubbles.is_empty());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.bubbles.len(), 1);

        let mut calm = test_state(6);
        tick(
            &mut calm,
            &TickInput {
                toggle_calm: true,
                ..Default::default()
            },
        );
        for _ in 0..CALM_SPAWN_INTERVAL_TICKS - 2 {
            tick(&mut calm, &TickInput::default());
        }
        assert!(calm.bubbles.is_empty());
        tick(&mut calm, &TickInput::default());
        assert_eq!(calm.bubbles.len(), 1);
    }

    #[test]
    fn test_tap_spawn_stops_at_ceiling() {
        let mut state = test_state(7);
        // Far-apart grid so no tap lands on an earlier bubble
        let mut grid = Vec::new();
        for row in 0..5 {
            for col in 0..8 {
                grid.push(Vec2::new(50.0 + col as f32 * 100.0, 50.0 + row as f32 * 110.0));
            }
        }
        let taps: Vec<Vec2> = grid.iter().copied().take(MAX_LIVE_BUBBLES).collect();
        tick(
            &mut state,
            &TickInput {
                taps,
                ..Default::default()
            },
        );
        assert_eq!(state.live_bubble_count(), MAX_LIVE_BUBBLES);

        tick(
            &mut state,
            &TickInput {
                taps: vec![grid[MAX_LIVE_BUBBLES]],
                ..Default::default()
            },
        );
        assert!(state.live_bubble_count() <= MAX_LIVE_BUBBLES);
    }

    #[test]
    fn test_popped_bubble_fades_out_and_never_returns() {
        let mut state = test_state(8);
        let tap = Vec2::new(300.0, 300.0);
        tick(
            &mut state,
            &TickInput {
                taps: vec![tap],
                ..Default::default()
            },
        );
        let id = state.bubbles[0].id;
        tick(
            &mut state,
            &TickInput {
                taps: vec![tap],
                ..Default::default()
            },
        );
        assert!(state.bubbles[0].popping);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.bubbles.iter().all(|b| b.id != id));

        // Run on; the id must never reappear
        for _ in 0..120 {
            tick(&mut state, &TickInput::default());
            assert!(state.bubbles.iter().all(|b| b.id != id));
        }
    }

    #[test]
    fn test_unpopped_bubble_exits_top() {
        let mut state = test_state(9);
        let id = state.next_entity_id();
        state.bubbles.push(Bubble {
            id,
            pos: Vec2::new(400.0, 5.0),
            size: 40.0,
            color_idx: 0,
            rise_speed: 1.0,
            wobble_phase: 0.0,
            wobble_speed: 0.02,
            family_idx: None,
            opacity: 1.0,
            popping: false,
            spawned_tick: 0,
        });
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.bubbles.iter().all(|b| b.id != id));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_sparkles_die_out() {
        let mut state = test_state(10);
        family_bubble(&mut state, Vec2::new(200.0, 200.0), 0);
        tick(
            &mut state,
            &TickInput {
                taps: vec![Vec2::new(200.0, 200.0)],
                ..Default::default()
            },
        );
        assert!(!state.sparkles.is_empty());
        for _ in 0..45 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.sparkles.is_empty());
    }

    #[test]
    fn test_name_reveal_animates_and_expires() {
        let mut state = test_state(11);
        family_bubble(&mut state, Vec2::new(400.0, 400.0), 2);
        tick(
            &mut state,
            &TickInput {
                taps: vec![Vec2::new(400.0, 400.0)],
                ..Default::default()
            },
        );
        let y0 = state.reveals[0].pos.y;
        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
        }
        let nr = &state.reveals[0];
        assert!(nr.pos.y < y0);
        assert_eq!(nr.opacity, 1.0);
        assert_eq!(nr.scale, 1.0);

        for _ in 0..250 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.reveals.is_empty());
    }

    #[test]
    fn test_star_mode_reveal_thresholds_fire_exactly_once() {
        let mut state = test_state(12);
        tick(
            &mut state,
            &TickInput {
                toggle_star: true,
                ..Default::default()
            },
        );
        assert!(state.mode.star);

        let mut reveal_taps = Vec::new();
        for tap_no in 1..=95u32 {
            tick(
                &mut state,
                &TickInput {
                    taps: vec![Vec2::new(100.0, 100.0)],
                    ..Default::default()
                },
            );
            let reveals = state
                .drain_events()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::NameRevealed { .. }))
                .count();
            assert!(reveals <= 1);
            if reveals == 1 {
                reveal_taps.push(tap_no);
            }
        }
        assert_eq!(reveal_taps, REVEAL_THRESHOLDS.to_vec());
    }

    #[test]
    fn test_star_mode_pauses_spawner_and_popping() {
        let mut state = test_state(13);
        family_bubble(&mut state, Vec2::new(200.0, 200.0), 0);
        tick(
            &mut state,
            &TickInput {
                toggle_star: true,
                ..Default::default()
            },
        );
        for _ in 0..(SPAWN_INTERVAL_TICKS * 3) {
            tick(
                &mut state,
                &TickInput {
                    taps: vec![Vec2::new(200.0, 200.0)],
                    ..Default::default()
                },
            );
        }
        // Taps placed stars instead of popping or spawning bubbles
        assert!(state.bubbles.iter().all(|b| !b.popping));
        assert!(state.bubbles.len() <= 1);
        assert!(!state.star_marks.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_star_retention_cap_evicts_oldest() {
        let mut state = test_state(14);
        tick(
            &mut state,
            &TickInput {
                toggle_star: true,
                ..Default::default()
            },
        );
        let mut first_id = None;
        for _ in 0..(MAX_PLACED_STARS + 20) {
            tick(
                &mut state,
                &TickInput {
                    taps: vec![Vec2::new(50.0, 50.0)],
                    ..Default::default()
                },
            );
            if first_id.is_none() {
                first_id = state.star_marks.first().map(|s| s.id);
            }
        }
        assert_eq!(state.star_marks.len(), MAX_PLACED_STARS);
        let first_id = first_id.unwrap();
        assert!(state.star_marks.iter().all(|s| s.id != first_id));
    }

    #[test]
    fn test_score_is_monotone() {
        let mut state = test_state(15);
        let mut last = 0;
        for i in 0..400u32 {
            let mut input = TickInput::default();
            if i % 7 == 0 {
                input.taps.push(Vec2::new(
                    (i * 37 % 700) as f32 + 50.0,
                    (i * 53 % 500) as f32 + 50.0,
                ));
            }
            tick(&mut state, &input);
            assert!(state.score >= last);
            last = state.score;
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = test_state(99999);
        let mut b = test_state(99999);
        let inputs = [
            TickInput {
                taps: vec![Vec2::new(100.0, 100.0)],
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                taps: vec![Vec2::new(100.0, 100.0), Vec2::new(500.0, 400.0)],
                ..Default::default()
            },
            TickInput {
                toggle_calm: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for input in &inputs {
            tick(&mut a, input);
            tick(&mut b, input);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.bubbles.len(), b.bubbles.len());
        for (ba, bb) in a.bubbles.iter().zip(&b.bubbles) {
            assert_eq!(ba.id, bb.id);
            assert!((ba.pos - bb.pos).length() < 1e-4);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_spawned_bubbles_are_in_bounds(seed in any::<u64>()) {
            let mut state = test_state(seed);
            for _ in 0..400 {
                tick(&mut state, &TickInput::default());
                for ev in state.drain_events() {
                    if let GameEvent::Spawned { id } = ev {
                        let b = state.bubbles.iter().find(|b| b.id == id).unwrap();
                        // One frame of wobble may have been applied since spawn
                        prop_assert!(b.pos.x >= b.size / 2.0 - 1.0);
                        prop_assert!(b.pos.x <= state.canvas_size.x - b.size / 2.0 + 1.0);
                        prop_assert!(b.pos.y > state.canvas_size.y);
                        if b.is_family() {
                            prop_assert!(b.size >= FAMILY_SIZE_MIN && b.size < FAMILY_SIZE_MAX);
                        } else {
                            prop_assert!(b.size >= BUBBLE_SIZE_MIN && b.size < BUBBLE_SIZE_MAX);
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_live_count_never_exceeds_ceiling(
            seed in any::<u64>(),
            mut taps in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 0..80),
        ) {
            let mut state = test_state(seed);
            for _ in 0..600 {
                let mut input = TickInput::default();
                for _ in 0..2 {
                    if let Some((x, y)) = taps.pop() {
                        input.taps.push(Vec2::new(x, y));
                    }
                }
                tick(&mut state, &input);
                prop_assert!(state.live_bubble_count() <= MAX_LIVE_BUBBLES);
            }
        }
    }
}
