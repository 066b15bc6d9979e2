//! Runtime preferences
//!
//! Nothing here is persisted; the toy resets completely on reload.

/// Preferences for audio and motion
#[derive(Debug, Clone)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute audio while the tab is hidden
    pub mute_on_blur: bool,
    /// Reduced motion (no glow shadows or pulse rings)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Combined volume fed to the audio manager
    pub fn effective_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }
}
