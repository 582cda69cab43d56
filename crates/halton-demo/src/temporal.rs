//! Per-frame temporal state: jitter sequence, history parity, first-frame priming.

use glam::{Mat4, Vec2, Vec3};

use crate::settings::TaaSettings;

/// Halton (2, 3) sample positions inside a pixel.
pub const JITTER_TABLE: [Vec2; 8] = [
    Vec2::new(1.0 / 2.0, 1.0 / 3.0),
    Vec2::new(1.0 / 4.0, 2.0 / 3.0),
    Vec2::new(3.0 / 4.0, 1.0 / 9.0),
    Vec2::new(1.0 / 8.0, 4.0 / 9.0),
    Vec2::new(5.0 / 8.0, 7.0 / 9.0),
    Vec2::new(3.0 / 8.0, 2.0 / 9.0),
    Vec2::new(7.0 / 8.0, 5.0 / 9.0),
    Vec2::new(1.0 / 16.0, 8.0 / 9.0),
];

/// Inputs for the history blend pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TaaPass {
    /// History buffer written this frame.
    pub write: usize,
    /// History buffer read as the previous result.
    pub read: usize,
    pub rate: f32,
    pub blur_size: f32,
    pub inv_screen_size: Vec2,
}

/// Everything the compositor needs to know about one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePlan {
    /// Clip-space translation applied after the projection, if any.
    pub jitter: Option<Vec2>,
    pub taa: Option<TaaPass>,
    /// State once this frame has been drawn.
    next: TemporalState,
}

impl FramePlan {
    /// `view_proj` with the jitter translation applied.
    pub fn jittered(&self, view_proj: Mat4) -> Mat4 {
        match self.jitter {
            Some(offset) => Mat4::from_translation(Vec3::new(offset.x, offset.y, 0.0)) * view_proj,
            None => view_proj,
        }
    }
}

/// Jitter index, history parity and the primed flag.
///
/// The jitter index and parity advance once per rendered frame in every
/// mode, so switching modes never resets them. Planning a frame changes
/// nothing; the state moves only when the drawn plan is committed, so a
/// frame that is lost or fails leaves it where it was.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TemporalState {
    jitter_index: usize,
    parity: usize,
    primed: bool,
}

impl TemporalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jitter_index(&self) -> usize {
        self.jitter_index
    }

    pub fn parity(&self) -> usize {
        self.parity
    }

    /// Plans the next frame for a `width`×`height` back buffer.
    pub fn plan(&self, settings: &TaaSettings, width: u32, height: u32) -> FramePlan {
        let mut next = *self;
        next.jitter_index = (self.jitter_index + 1) % JITTER_TABLE.len();
        next.parity = 1 - self.parity;

        let inv_screen_size = Vec2::new(1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32);

        let jitter = settings
            .mode
            .jitter_enabled()
            .then(|| JITTER_TABLE[next.jitter_index] * inv_screen_size);

        let taa = settings.mode.taa_enabled().then(|| {
            // Until the history holds a real frame, replace it outright.
            let rate = if self.primed { settings.blend_rate() } else { 1.0 };
            next.primed = true;
            TaaPass {
                write: next.parity,
                read: 1 - next.parity,
                rate,
                blur_size: settings.blur_scale(),
                inv_screen_size,
            }
        });

        FramePlan { jitter, taa, next }
    }

    /// Records `plan` as drawn. Call only after every pass of the frame
    /// was recorded.
    pub fn commit(&mut self, plan: &FramePlan) {
        *self = plan.next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Mode;

    fn taa() -> TaaSettings {
        TaaSettings::new(Mode::TemporalAa, 8, 2)
    }

    /// Plans and commits one drawn frame.
    fn draw(t: &mut TemporalState, settings: &TaaSettings) -> FramePlan {
        let plan = t.plan(settings, 640, 480);
        t.commit(&plan);
        plan
    }

    // ── jitter ────────────────────────────────────────────────────────────

    #[test]
    fn jitter_index_has_period_eight() {
        let mut t = TemporalState::new();
        let start = t.jitter_index();
        for k in 1..=4 {
            for _ in 0..8 {
                draw(&mut t, &taa());
            }
            assert_eq!(t.jitter_index(), start, "after {k} cycles");
        }
    }

    #[test]
    fn jitter_is_scaled_to_the_screen() {
        let mut t = TemporalState::new();
        let plan = draw(&mut t, &taa());
        let expected = JITTER_TABLE[1] * Vec2::new(1.0 / 640.0, 1.0 / 480.0);
        assert_eq!(plan.jitter, Some(expected));
    }

    #[test]
    fn off_mode_has_no_jitter_but_still_advances() {
        let mut t = TemporalState::new();
        let plan = draw(&mut t, &TaaSettings::new(Mode::Off, 8, 2));
        assert_eq!(plan.jitter, None);
        assert_eq!(plan.taa, None);
        assert_eq!(t.jitter_index(), 1);
        assert_eq!(plan.jittered(Mat4::IDENTITY), Mat4::IDENTITY);
    }

    #[test]
    fn camera_move_jitters_without_blending() {
        let mut t = TemporalState::new();
        let plan = draw(&mut t, &TaaSettings::new(Mode::CameraMove, 8, 2));
        assert!(plan.jitter.is_some());
        assert!(plan.taa.is_none());
    }

    #[test]
    fn jitter_translates_after_projection() {
        let plan = FramePlan {
            jitter: Some(Vec2::new(0.5, -0.25)),
            taa: None,
            next: TemporalState::new(),
        };
        let p = plan.jittered(Mat4::IDENTITY) * glam::Vec4::new(0.0, 0.0, 0.5, 2.0);
        // Clip-space offset scales with w.
        assert_eq!(p, glam::Vec4::new(1.0, -0.5, 0.5, 2.0));
    }

    // ── parity ────────────────────────────────────────────────────────────

    #[test]
    fn parity_alternates_every_frame() {
        let mut t = TemporalState::new();
        for n in 1..=10 {
            let plan = draw(&mut t, &taa());
            assert_eq!(t.parity(), n % 2);
            let pass = plan.taa.unwrap();
            assert_eq!(pass.write, t.parity());
            assert_eq!(pass.read, 1 - t.parity());
        }
    }

    #[test]
    fn planning_alone_changes_nothing() {
        let mut t = TemporalState::new();
        draw(&mut t, &taa());
        let before = t;
        for _ in 0..3 {
            t.plan(&taa(), 640, 480);
        }
        assert_eq!(t, before);
        assert_eq!((t.jitter_index(), t.parity()), (1, 1));
    }

    #[test]
    fn lost_frame_repeats_its_plan() {
        let mut t = TemporalState::new();
        let lost = t.plan(&taa(), 640, 480);
        let drawn = draw(&mut t, &taa());
        assert_eq!(drawn, lost);
        assert_eq!((t.jitter_index(), t.parity()), (1, 1));
    }

    #[test]
    fn mode_switches_do_not_reset_index_or_parity() {
        let mut t = TemporalState::new();
        draw(&mut t, &taa());
        draw(&mut t, &taa());
        draw(&mut t, &TaaSettings::new(Mode::Off, 8, 2));
        assert_eq!((t.jitter_index(), t.parity()), (3, 1));
        draw(&mut t, &taa());
        assert_eq!((t.jitter_index(), t.parity()), (4, 0));
    }

    // ── blend rate ────────────────────────────────────────────────────────

    #[test]
    fn first_blend_replaces_history_then_uses_weight() {
        let mut t = TemporalState::new();
        let first = draw(&mut t, &taa()).taa.unwrap();
        assert_eq!(first.rate, 1.0);
        assert_eq!(first.blur_size, 0.2);
        assert_eq!(first.inv_screen_size, Vec2::new(1.0 / 640.0, 1.0 / 480.0));

        let second = draw(&mut t, &taa()).taa.unwrap();
        assert_eq!(second.rate, 0.125);
    }

    #[test]
    fn lost_first_frame_keeps_history_unprimed() {
        let mut t = TemporalState::new();
        // Acquire failed: planned, never committed.
        t.plan(&taa(), 640, 480);
        let first = draw(&mut t, &taa()).taa.unwrap();
        assert_eq!(first.rate, 1.0);
        assert_eq!(t.parity(), 1);
        assert_eq!(draw(&mut t, &taa()).taa.unwrap().rate, 0.125);
    }

    #[test]
    fn priming_waits_for_the_first_taa_frame() {
        let mut t = TemporalState::new();
        draw(&mut t, &TaaSettings::new(Mode::Off, 8, 2));
        assert_eq!(draw(&mut t, &taa()).taa.unwrap().rate, 1.0);
    }

    #[test]
    fn rate_follows_every_weight_after_priming() {
        let mut t = TemporalState::new();
        draw(&mut t, &taa());
        for w in 1..=32 {
            let plan = draw(&mut t, &TaaSettings::new(Mode::TemporalAa, w, 0));
            assert_eq!(plan.taa.unwrap().rate, 1.0 / w as f32);
        }
    }
}
