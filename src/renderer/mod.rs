//! Canvas 2D frame painter
//!
//! Draws the whole scene back-to-front each animation frame: night-sky
//! gradient, twinkling starfield, placed stars, bubbles, sparkle bursts,
//! floating name reveals, and the score badge. Pure drawing - the renderer
//! never mutates simulation state.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::palette;
use crate::roster::Roster;
use crate::sim::{Bubble, GameState};
use crate::twinkle_alpha;

/// Background gradient stops, top to bottom
const SKY_STOPS: [&str; 3] = ["#0a0a2e", "#1a1a4e", "#2d1b69"];
/// Base font size for name reveals at scale 1.0
const REVEAL_FONT_PX: f32 = 36.0;

pub struct Canvas2dRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Photo per roster slot; `None` until the browser creates the element
    images: Vec<Option<HtmlImageElement>>,
    /// User-uploaded photo shown for slots whose file never loads
    fallback_image: Option<HtmlImageElement>,
    reduced_motion: bool,
}

impl Canvas2dRenderer {
    pub fn new(canvas: HtmlCanvasElement, roster: &Roster) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        // Kick off photo loads immediately; drawing checks `complete()`
        let images = roster
            .members
            .iter()
            .map(|m| {
                HtmlImageElement::new()
                    .map(|img| {
                        img.set_src(&format!("family/{}", m.file));
                        img
                    })
                    .ok()
            })
            .collect();

        Ok(Self {
            canvas,
            ctx,
            images,
            fallback_image: None,
            reduced_motion: false,
        })
    }

    /// Install a user-provided photo for roster slots with no loadable file
    pub fn set_fallback_image(&mut self, img: HtmlImageElement) {
        self.fallback_image = Some(img);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Paint one frame
    pub fn render(&self, state: &GameState, roster: &Roster) -> Result<(), JsValue> {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;

        self.draw_sky(w, h)?;
        self.draw_bg_stars(state);
        self.draw_star_marks(state);
        for b in &state.bubbles {
            self.draw_bubble(state, b, roster)?;
        }
        self.draw_sparkles(state);
        self.draw_reveals(state)?;
        self.draw_badge(state, w)?;

        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn draw_sky(&self, w: f64, h: f64) -> Result<(), JsValue> {
        let grad = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        for (i, stop) in SKY_STOPS.iter().enumerate() {
            grad.add_color_stop(i as f32 / (SKY_STOPS.len() - 1) as f32, stop)?;
        }
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_canvas_gradient(&grad);
        self.ctx.fill_rect(0.0, 0.0, w, h);
        Ok(())
    }

    fn draw_bg_stars(&self, state: &GameState) {
        self.ctx.set_fill_style_str("#ffffff");
        for star in &state.bg_stars {
            let alpha = if self.reduced_motion {
                0.6
            } else {
                twinkle_alpha(state.time_ticks, star.twinkle_speed, star.phase)
            };
            self.ctx.set_global_alpha(alpha as f64);
            self.ctx.fill_rect(
                (star.pos.x - star.size / 2.0) as f64,
                (star.pos.y - star.size / 2.0) as f64,
                star.size as f64,
                star.size as f64,
            );
        }
    }

    fn draw_star_marks(&self, state: &GameState) {
        for mark in &state.star_marks {
            let color = palette::GLOW_RINGS[mark.color_idx % palette::GLOW_RINGS.len()];
            let alpha = if self.reduced_motion {
                0.8
            } else {
                twinkle_alpha(state.time_ticks, mark.twinkle_speed, mark.phase)
            };
            self.ctx.set_global_alpha(alpha as f64);
            self.ctx.set_fill_style_str(&color.with_alpha(1.0).css());
            self.star_path(mark.pos.x as f64, mark.pos.y as f64, mark.size as f64);
            self.ctx.fill();
        }
    }

    fn draw_bubble(&self, state: &GameState, b: &Bubble, roster: &Roster) -> Result<(), JsValue> {
        let (x, y, r) = (b.pos.x as f64, b.pos.y as f64, b.radius() as f64);
        self.ctx.set_global_alpha(b.opacity.clamp(0.0, 1.0) as f64);

        match b.family_idx {
            Some(fi) => self.draw_family_bubble(state, b, roster, fi, x, y, r)?,
            None => self.draw_plain_bubble(b, x, y, r)?,
        }
        Ok(())
    }

    fn draw_plain_bubble(&self, b: &Bubble, x: f64, y: f64, r: f64) -> Result<(), JsValue> {
        let fill = palette::BUBBLE_FILLS[b.color_idx % palette::BUBBLE_FILLS.len()];
        let highlight = palette::BUBBLE_HIGHLIGHTS[b.color_idx % palette::BUBBLE_HIGHLIGHTS.len()];

        // Off-center radial gradient reads as a glossy sphere
        let grad = self
            .ctx
            .create_radial_gradient(x - r * 0.3, y - r * 0.3, r * 0.1, x, y, r)?;
        grad.add_color_stop(0.0, &highlight.css())?;
        grad.add_color_stop(1.0, &fill.css())?;

        self.ctx.begin_path();
        self.ctx.arc(x, y, r, 0.0, TAU)?;
        self.ctx.set_fill_style_canvas_gradient(&grad);
        self.ctx.fill();

        self.ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
        self.ctx.set_line_width(2.0);
        self.ctx.stroke();
        Ok(())
    }

    fn draw_family_bubble(
        &self,
        state: &GameState,
        b: &Bubble,
        roster: &Roster,
        fi: usize,
        x: f64,
        y: f64,
        r: f64,
    ) -> Result<(), JsValue> {
        let photo = self
            .images
            .get(fi)
            .and_then(|img| img.as_ref())
            .filter(|img| img.complete() && img.natural_width() > 0)
            .or(self.fallback_image.as_ref());

        match photo {
            Some(img) => {
                self.ctx.save();
                self.ctx.begin_path();
                self.ctx.arc(x, y, r, 0.0, TAU)?;
                self.ctx.clip();
                self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    x - r,
                    y - r,
                    r * 2.0,
                    r * 2.0,
                )?;
                self.ctx.restore();
                // restore() drops global alpha along with the clip
                self.ctx.set_global_alpha(b.opacity.clamp(0.0, 1.0) as f64);
            }
            None => {
                // No photo yet: warm gold bubble with the member's initial
                let grad = self
                    .ctx
                    .create_radial_gradient(x - r * 0.3, y - r * 0.3, r * 0.1, x, y, r)?;
                grad.add_color_stop(0.0, "rgba(255, 235, 170, 0.9)")?;
                grad.add_color_stop(1.0, "rgba(255, 200, 80, 0.6)")?;
                self.ctx.begin_path();
                self.ctx.arc(x, y, r, 0.0, TAU)?;
                self.ctx.set_fill_style_canvas_gradient(&grad);
                self.ctx.fill();

                if let Some(member) = roster.members.get(fi)
                    && let Some(initial) = member.name.chars().next()
                {
                    self.ctx.set_fill_style_str("#5a3e00");
                    self.ctx.set_font(&format!("600 {}px Fredoka, sans-serif", r));
                    self.ctx.set_text_align("center");
                    self.ctx.set_text_baseline("middle");
                    self.ctx.fill_text(&initial.to_string(), x, y)?;
                }
            }
        }

        // Pulsing glow ring marks the bubble as special
        let ring = palette::GLOW_RINGS[fi % palette::GLOW_RINGS.len()];
        let pulse = if self.reduced_motion {
            0.6
        } else {
            0.5 + 0.3 * (state.time_ticks as f64 * 0.05 + fi as f64).sin()
        };
        self.ctx
            .set_global_alpha((b.opacity as f64 * pulse).clamp(0.0, 1.0));
        self.ctx
            .set_stroke_style_str(&ring.with_alpha(1.0).css());
        self.ctx.set_line_width(3.0);
        if !self.reduced_motion {
            self.ctx.set_shadow_color(&ring.with_alpha(1.0).css());
            self.ctx.set_shadow_blur(12.0);
        }
        self.ctx.begin_path();
        self.ctx.arc(x, y, r + 3.0, 0.0, TAU)?;
        self.ctx.stroke();
        self.ctx.set_shadow_blur(0.0);
        Ok(())
    }

    fn draw_sparkles(&self, state: &GameState) {
        for s in &state.sparkles {
            let color = if s.special {
                palette::GLOW_RINGS[s.color_idx % palette::GLOW_RINGS.len()].with_alpha(1.0)
            } else {
                palette::BUBBLE_FILLS[s.color_idx % palette::BUBBLE_FILLS.len()].with_alpha(0.9)
            };
            self.ctx.set_global_alpha(s.life.clamp(0.0, 1.0) as f64);
            self.ctx.set_fill_style_str(&color.css());
            self.star_path(s.pos.x as f64, s.pos.y as f64, s.size as f64);
            self.ctx.fill();
        }
    }

    fn draw_reveals(&self, state: &GameState) -> Result<(), JsValue> {
        for nr in &state.reveals {
            let (x, y) = (nr.pos.x as f64, nr.pos.y as f64);
            self.ctx.set_global_alpha(nr.opacity.clamp(0.0, 1.0) as f64);
            self.ctx.set_fill_style_str("#ffd700");
            self.ctx.set_font(&format!(
                "600 {}px Fredoka, sans-serif",
                REVEAL_FONT_PX * nr.scale
            ));
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");

            if self.reduced_motion {
                self.ctx.fill_text(&nr.name, x, y)?;
            } else {
                self.ctx.set_shadow_color("#ffd700");
                self.ctx.set_shadow_blur(15.0);
                self.ctx.fill_text(&nr.name, x, y)?;
                self.ctx.set_shadow_blur(30.0);
                self.ctx.fill_text(&nr.name, x, y)?;
                self.ctx.set_shadow_blur(0.0);
            }
        }
        Ok(())
    }

    /// Score badge in the top-right corner. Calm mode hides it entirely;
    /// star mode shows the star tally instead of the score.
    fn draw_badge(&self, state: &GameState, w: f64) -> Result<(), JsValue> {
        if state.mode.calm {
            return Ok(());
        }
        let label = if state.mode.star {
            format!("🌟 {}", state.star_taps)
        } else {
            format!("⭐ {}", state.score)
        };

        self.ctx.set_global_alpha(1.0);
        self.ctx.set_font("600 24px Fredoka, sans-serif");
        let text_w = self.ctx.measure_text(&label)?.width();
        let pad = 14.0;
        let (bw, bh) = (text_w + pad * 2.0, 44.0);
        let (bx, by) = (w - bw - 16.0, 16.0);

        self.ctx.set_fill_style_str("rgba(255, 255, 255, 0.15)");
        self.rounded_rect(bx, by, bw, bh, 22.0);
        self.ctx.fill();

        self.ctx.set_fill_style_str("#ffffff");
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.fill_text(&label, bx + bw / 2.0, by + bh / 2.0)?;
        Ok(())
    }

    /// Four-pointed star centered at (x, y); `size` is the outer radius
    fn star_path(&self, x: f64, y: f64, size: f64) {
        self.ctx.begin_path();
        for j in 0..8 {
            let radius = if j % 2 == 0 { size } else { size * 0.4 };
            let angle = j as f64 * TAU / 8.0 - TAU / 4.0;
            let (px, py) = (x + angle.cos() * radius, y + angle.sin() * radius);
            if j == 0 {
                self.ctx.move_to(px, py);
            } else {
                self.ctx.line_to(px, py);
            }
        }
        self.ctx.close_path();
    }

    fn rounded_rect(&self, x: f64, y: f64, w: f64, h: f64, r: f64) {
        let r = r.min(w / 2.0).min(h / 2.0);
        self.ctx.begin_path();
        self.ctx.move_to(x + r, y);
        self.ctx.line_to(x + w - r, y);
        self.ctx.quadratic_curve_to(x + w, y, x + w, y + r);
        self.ctx.line_to(x + w, y + h - r);
        self.ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        self.ctx.line_to(x + r, y + h);
        self.ctx.quadratic_curve_to(x, y + h, x, y + h - r);
        self.ctx.line_to(x, y + r);
        self.ctx.quadratic_curve_to(x, y, x + r, y);
        self.ctx.close_path();
    }
}
