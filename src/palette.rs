//! Color palettes shared by the simulation and the renderer
//!
//! The simulation stores palette *indices* so it stays free of any string or
//! canvas types; the renderer resolves indices to CSS colors at draw time.

/// An RGBA color (8-bit channels, float alpha)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for canvas fill/stroke styles
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Soft translucent bubble bodies
pub const BUBBLE_FILLS: [Rgba; 6] = [
    Rgba::new(255, 182, 193, 0.45),
    Rgba::new(173, 216, 230, 0.45),
    Rgba::new(144, 238, 144, 0.45),
    Rgba::new(255, 255, 150, 0.45),
    Rgba::new(200, 162, 255, 0.45),
    Rgba::new(255, 200, 150, 0.45),
];

/// Brighter top-left highlight for each bubble fill
pub const BUBBLE_HIGHLIGHTS: [Rgba; 6] = [
    Rgba::new(255, 220, 230, 0.7),
    Rgba::new(210, 240, 255, 0.7),
    Rgba::new(200, 255, 200, 0.7),
    Rgba::new(255, 255, 210, 0.7),
    Rgba::new(230, 210, 255, 0.7),
    Rgba::new(255, 230, 210, 0.7),
];

/// Glow ring colors for family bubbles, one per roster slot (cycled)
pub const GLOW_RINGS: [Rgba; 10] = [
    Rgba::new(255, 100, 150, 0.7),
    Rgba::new(100, 180, 255, 0.7),
    Rgba::new(100, 220, 100, 0.7),
    Rgba::new(255, 215, 0, 0.7),
    Rgba::new(180, 130, 255, 0.7),
    Rgba::new(255, 160, 100, 0.7),
    Rgba::new(255, 130, 200, 0.7),
    Rgba::new(130, 255, 200, 0.7),
    Rgba::new(200, 200, 255, 0.7),
    Rgba::new(255, 200, 200, 0.7),
];
