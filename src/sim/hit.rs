//! Pointer hit-testing
//!
//! Maps client coordinates into canvas pixel space and resolves a tap against
//! the bubble store. The scan runs newest-to-oldest with first-match-wins so
//! overlapping bubbles resolve deterministically toward the visually topmost
//! one (bubbles draw in store order).

use glam::Vec2;

use super::state::Bubble;
use crate::consts::HIT_MARGIN;

/// Convert a client (CSS pixel) coordinate to canvas backing-store pixels.
///
/// `rect_origin`/`rect_size` describe the canvas's bounding client rect;
/// `backing_size` is the canvas width/height attribute pair. The two differ
/// whenever the device pixel ratio is not 1 or CSS scales the element.
pub fn to_canvas_space(
    client: Vec2,
    rect_origin: Vec2,
    rect_size: Vec2,
    backing_size: Vec2,
) -> Vec2 {
    let rel = client - rect_origin;
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return rel;
    }
    Vec2::new(
        rel.x * backing_size.x / rect_size.x,
        rel.y * backing_size.y / rect_size.y,
    )
}

/// Find the bubble a tap lands on, if any.
///
/// A bubble matches when the point's Euclidean distance from its center is
/// under its radius plus [`HIT_MARGIN`]. Popping bubbles never match.
pub fn find_hit(bubbles: &[Bubble], point: Vec2) -> Option<usize> {
    for i in (0..bubbles.len()).rev() {
        let b = &bubbles[i];
        if b.popping {
            continue;
        }
        if point.distance(b.pos) < b.radius() + HIT_MARGIN {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(id: u32, x: f32, y: f32, size: f32) -> Bubble {
        Bubble {
            id,
            pos: Vec2::new(x, y),
            size,
            color_idx: 0,
            rise_speed: 1.0,
            wobble_phase: 0.0,
            wobble_speed: 0.02,
            family_idx: None,
            opacity: 1.0,
            popping: false,
            spawned_tick: 0,
        }
    }

    #[test]
    fn test_client_to_canvas_scaling() {
        // Canvas displayed at 200x100 CSS px, backed by 400x200 device px
        let p = to_canvas_space(
            Vec2::new(110.0, 60.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(200.0, 100.0),
            Vec2::new(400.0, 200.0),
        );
        assert_eq!(p, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn test_degenerate_rect_falls_back_to_relative() {
        let p = to_canvas_space(
            Vec2::new(50.0, 40.0),
            Vec2::new(10.0, 10.0),
            Vec2::ZERO,
            Vec2::new(400.0, 200.0),
        );
        assert_eq!(p, Vec2::new(40.0, 30.0));
    }

    #[test]
    fn test_hit_within_margin() {
        let bubbles = vec![bubble(1, 100.0, 100.0, 60.0)];
        // radius 30 + margin 10 = 40
        assert_eq!(find_hit(&bubbles, Vec2::new(139.0, 100.0)), Some(0));
        assert_eq!(find_hit(&bubbles, Vec2::new(141.0, 100.0)), None);
    }

    #[test]
    fn test_newest_bubble_wins_on_overlap() {
        let bubbles = vec![
            bubble(1, 100.0, 100.0, 60.0),
            bubble(2, 110.0, 100.0, 60.0),
        ];
        assert_eq!(find_hit(&bubbles, Vec2::new(105.0, 100.0)), Some(1));
    }

    #[test]
    fn test_popping_bubbles_are_skipped() {
        let mut bubbles = vec![
            bubble(1, 100.0, 100.0, 60.0),
            bubble(2, 100.0, 100.0, 60.0),
        ];
        bubbles[1].popping = true;
        assert_eq!(find_hit(&bubbles, Vec2::new(100.0, 100.0)), Some(0));
        bubbles[0].popping = true;
        assert_eq!(find_hit(&bubbles, Vec2::new(100.0, 100.0)), None);
    }
}
