//! User-tunable TAA settings, written by the HUD and read by the compositor.

use std::ops::RangeInclusive;

/// Accepted blend weights; the history rate is `1 / weight`.
pub const BLEND_WEIGHT_RANGE: RangeInclusive<u32> = 1..=32;

/// Accepted blur sizes, in tenths of a texel.
pub const BLUR_SIZE_RANGE: RangeInclusive<u32> = 0..=10;

/// Composite path for the frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Mode {
    /// Scene straight to the back buffer, no jitter.
    Off,
    /// Jittered scene blended into the history buffers.
    #[default]
    TemporalAa,
    /// Jittered scene shown raw, to inspect the jitter itself.
    CameraMove,
}

impl Mode {
    pub fn jitter_enabled(self) -> bool {
        matches!(self, Mode::TemporalAa | Mode::CameraMove)
    }

    pub fn taa_enabled(self) -> bool {
        self == Mode::TemporalAa
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TaaSettings {
    pub mode: Mode,
    blend_weight: u32,
    blur_size: u32,
}

impl Default for TaaSettings {
    fn default() -> Self {
        Self { mode: Mode::TemporalAa, blend_weight: 8, blur_size: 2 }
    }
}

impl TaaSettings {
    pub fn new(mode: Mode, blend_weight: u32, blur_size: u32) -> Self {
        let mut s = Self { mode, blend_weight: 1, blur_size: 0 };
        s.set_blend_weight(blend_weight as i32);
        s.set_blur_size(blur_size as i32);
        s
    }

    pub fn blend_weight(&self) -> u32 {
        self.blend_weight
    }

    pub fn blur_size(&self) -> u32 {
        self.blur_size
    }

    /// Clamps into [`BLEND_WEIGHT_RANGE`].
    pub fn set_blend_weight(&mut self, value: i32) {
        self.blend_weight = clamp_into(value, &BLEND_WEIGHT_RANGE);
    }

    /// Clamps into [`BLUR_SIZE_RANGE`].
    pub fn set_blur_size(&mut self, value: i32) {
        self.blur_size = clamp_into(value, &BLUR_SIZE_RANGE);
    }

    /// Exponential-moving-average rate applied to new samples.
    pub fn blend_rate(&self) -> f32 {
        1.0 / self.blend_weight as f32
    }

    /// Blur radius handed to the shader.
    pub fn blur_scale(&self) -> f32 {
        0.1 * self.blur_size as f32
    }

    pub fn blend_weight_label(&self) -> String {
        format!("Blend Weight: 1/{:2}", self.blend_weight)
    }

    pub fn blur_size_label(&self) -> String {
        format!("Blur Size: {:2.1}", self.blur_scale())
    }
}

fn clamp_into(value: i32, range: &RangeInclusive<u32>) -> u32 {
    (value.max(0) as u32).clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_initial_panel() {
        let s = TaaSettings::default();
        assert_eq!(s.mode, Mode::TemporalAa);
        assert_eq!(s.blend_weight(), 8);
        assert_eq!(s.blur_size(), 2);
    }

    #[test]
    fn blend_rate_is_reciprocal_for_every_weight() {
        let mut s = TaaSettings::default();
        for w in BLEND_WEIGHT_RANGE {
            s.set_blend_weight(w as i32);
            assert_eq!(s.blend_rate(), 1.0 / w as f32);
        }
    }

    #[test]
    fn out_of_range_values_clamp() {
        let mut s = TaaSettings::default();
        s.set_blend_weight(0);
        assert_eq!(s.blend_weight(), 1);
        s.set_blend_weight(-7);
        assert_eq!(s.blend_weight(), 1);
        s.set_blur_size(99);
        assert_eq!(s.blur_size(), 10);
    }

    #[test]
    fn labels_use_fixed_width_formatting() {
        let s = TaaSettings::new(Mode::Off, 8, 2);
        assert_eq!(s.blend_weight_label(), "Blend Weight: 1/ 8");
        assert_eq!(s.blur_size_label(), "Blur Size: 0.2");
    }

    #[test]
    fn mode_flags() {
        assert!(!Mode::Off.jitter_enabled());
        assert!(Mode::CameraMove.jitter_enabled() && !Mode::CameraMove.taa_enabled());
        assert!(Mode::TemporalAa.jitter_enabled() && Mode::TemporalAa.taa_enabled());
    }
}
