//! The demo's dialogs: toolbar, TAA settings panel and the device settings
//! dialog, plus the frame statistics text.

use halton_engine::coords::{Rect, Vec2};
use halton_engine::input::{InputEvent, Key};
use halton_engine::paint::Color;
use halton_hud::layer::stats_color;
use halton_hud::painter::TEXT_SIZE;
use halton_hud::{ControlId, Dialog, EventResult, GuiEvent, GuiEventKind, HudEvent, Painter};

use crate::settings::{Mode, TaaSettings, BLEND_WEIGHT_RANGE, BLUR_SIZE_RANGE};

pub const IDC_TOGGLEFULLSCREEN: ControlId = 1;
pub const IDC_TOGGLEREF: ControlId = 3;
pub const IDC_CHANGEDEVICE: ControlId = 4;
pub const IDC_BLEND_WEIGHT: ControlId = 5;
pub const IDC_BLEND_WEIGHT_STATIC: ControlId = 6;
pub const IDC_BLUR_SIZE: ControlId = 7;
pub const IDC_BLUR_SIZE_STATIC: ControlId = 8;
pub const IDC_MODE_GROUP: u32 = 10;
pub const IDC_MODE_OFF: ControlId = 11;
pub const IDC_MODE_TAA: ControlId = 12;
pub const IDC_MODE_CAMMOVE: ControlId = 13;

pub const IDC_PRESENT_GROUP: u32 = 100;
pub const IDC_PRESENT_FIFO: ControlId = 101;
pub const IDC_PRESENT_IMMEDIATE: ControlId = 102;
pub const IDC_PRESENT_MAILBOX: ControlId = 103;
pub const IDC_DEVICE_CLOSE: ControlId = 104;
pub const IDC_PRESENT_STATIC: ControlId = 105;

const PANEL_WIDTH: f32 = 170.0;
const TOOLBAR_HEIGHT: f32 = 170.0;
const SAMPLE_HEIGHT: f32 = 300.0;
const DEVICE_SIZE: Vec2 = Vec2::new(250.0, 160.0);
const LINE_HEIGHT: f32 = 16.0;

const PRESENT_MODES: [(ControlId, wgpu::PresentMode); 3] = [
    (IDC_PRESENT_FIFO, wgpu::PresentMode::Fifo),
    (IDC_PRESENT_IMMEDIATE, wgpu::PresentMode::Immediate),
    (IDC_PRESENT_MAILBOX, wgpu::PresentMode::Mailbox),
];

/// Requests the application forwards to the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HudCommand {
    ToggleFullscreen,
    ToggleReference,
    SetPresentMode(wgpu::PresentMode),
}

/// Outcome of routing one input event through the dialogs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Routed {
    /// A dialog took the event; the camera must not see it.
    pub consumed: bool,
    pub commands: Vec<HudCommand>,
}

/// Per-frame numbers shown in the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub present_mode: wgpu::PresentMode,
    pub width: u32,
    pub height: u32,
    pub adapter: String,
    pub backend: wgpu::Backend,
    pub reference: bool,
}

impl FrameStats {
    pub fn frame_line(&self) -> String {
        let vsync = match self.present_mode {
            wgpu::PresentMode::Fifo | wgpu::PresentMode::FifoRelaxed | wgpu::PresentMode::AutoVsync => "on",
            _ => "off",
        };
        format!("{:.2} fps (vsync {vsync}) {}x{}", self.fps, self.width, self.height)
    }

    pub fn device_line(&self) -> String {
        let reference = if self.reference { " [REF]" } else { "" };
        format!("{} ({:?}){reference}", self.adapter, self.backend)
    }
}

pub struct DemoHud {
    toolbar: Dialog,
    sample: Dialog,
    device: Dialog,
    device_active: bool,
}

impl DemoHud {
    pub fn new(settings: &TaaSettings, width: u32, height: u32) -> Self {
        let mut hud = Self {
            toolbar: build_toolbar(),
            sample: build_sample(settings),
            device: build_device(),
            device_active: false,
        };
        hud.resize(width, height);
        hud
    }

    pub fn is_device_dialog_active(&self) -> bool {
        self.device_active
    }

    /// Re-anchors every dialog to the back-buffer corners.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);
        self.toolbar.set_location(w - PANEL_WIDTH, 0.0);
        self.sample.set_location(w - PANEL_WIDTH, h - SAMPLE_HEIGHT);
        self.device
            .set_location(((w - DEVICE_SIZE.x) * 0.5).max(0.0), ((h - DEVICE_SIZE.y) * 0.5).max(0.0));
    }

    /// Checks the radio matching the swapchain's present mode.
    pub fn sync_present_mode(&mut self, mode: wgpu::PresentMode) {
        if let Some((id, _)) = PRESENT_MODES.iter().find(|(_, m)| *m == mode) {
            self.device.set_radio_checked(*id);
        }
    }

    /// Routes `event` through the dialogs: the device dialog alone while it
    /// is open, otherwise toolbar then settings panel. Settings changes are
    /// applied to `settings` immediately.
    pub fn route(&mut self, event: &InputEvent, settings: &mut TaaSettings) -> Routed {
        let mut routed = Routed::default();
        let hud_event = HudEvent::from_input(event);
        let mut fired = Vec::new();

        if self.device_active {
            if let Some(ev) = hud_event {
                self.device.on_event(&ev, &mut fired);
            }
            routed.consumed = true;
        } else if let Some(ev) = hud_event {
            routed.consumed = self.toolbar.on_event(&ev, &mut fired) == EventResult::Consumed
                || self.sample.on_event(&ev, &mut fired) == EventResult::Consumed;
        }

        for gui in fired {
            self.on_gui_event(gui, settings, &mut routed.commands);
        }
        routed
    }

    fn on_gui_event(&mut self, event: GuiEvent, settings: &mut TaaSettings, commands: &mut Vec<HudCommand>) {
        match (event.control_id, event.kind) {
            (IDC_TOGGLEFULLSCREEN, _) => commands.push(HudCommand::ToggleFullscreen),
            (IDC_TOGGLEREF, _) => commands.push(HudCommand::ToggleReference),
            (IDC_CHANGEDEVICE, _) | (IDC_DEVICE_CLOSE, _) => {
                self.device_active = !self.device_active;
                log::debug!("device settings dialog {}", if self.device_active { "opened" } else { "closed" });
            }
            (IDC_BLEND_WEIGHT, GuiEventKind::SliderChanged(v)) => {
                settings.set_blend_weight(v);
                self.sample.set_static_text(IDC_BLEND_WEIGHT_STATIC, settings.blend_weight_label());
                log::debug!("blend weight {}", settings.blend_weight());
            }
            (IDC_BLUR_SIZE, GuiEventKind::SliderChanged(v)) => {
                settings.set_blur_size(v);
                self.sample.set_static_text(IDC_BLUR_SIZE_STATIC, settings.blur_size_label());
                log::debug!("blur size {}", settings.blur_size());
            }
            (id, GuiEventKind::RadioSelected) => {
                if let Some(mode) = mode_for(id) {
                    settings.mode = mode;
                    log::info!("mode: {mode:?}");
                } else if let Some((_, present)) = PRESENT_MODES.iter().find(|(c, _)| *c == id) {
                    commands.push(HudCommand::SetPresentMode(*present));
                }
            }
            _ => {}
        }
    }

    /// Paints either the device dialog alone or the statistics and both panels.
    pub fn paint(&self, painter: &mut Painter<'_>, stats: &FrameStats) {
        if self.device_active {
            self.device.paint(painter);
            return;
        }
        painter.text(stats.frame_line(), TEXT_SIZE, stats_color(), Vec2::new(2.0, 0.0));
        painter.text(stats.device_line(), TEXT_SIZE, stats_color(), Vec2::new(2.0, LINE_HEIGHT));
        self.toolbar.paint(painter);
        self.sample.paint(painter);
    }

    pub fn sample_dialog(&self) -> &Dialog {
        &self.sample
    }
}

fn mode_for(id: ControlId) -> Option<Mode> {
    match id {
        IDC_MODE_OFF => Some(Mode::Off),
        IDC_MODE_TAA => Some(Mode::TemporalAa),
        IDC_MODE_CAMMOVE => Some(Mode::CameraMove),
        _ => None,
    }
}

fn build_toolbar() -> Dialog {
    let mut d = Dialog::new();
    d.set_size(PANEL_WIDTH, TOOLBAR_HEIGHT);
    d.add_button(IDC_TOGGLEFULLSCREEN, "Toggle full screen", Rect::new(0.0, 20.0, 170.0, 22.0), None);
    d.add_button(IDC_TOGGLEREF, "Toggle REF (F3)", Rect::new(0.0, 46.0, 170.0, 22.0), Some(Key::F(3)));
    d.add_button(IDC_CHANGEDEVICE, "Change device (F2)", Rect::new(0.0, 72.0, 170.0, 22.0), Some(Key::F(2)));
    d
}

fn build_sample(settings: &TaaSettings) -> Dialog {
    let mut d = Dialog::new();
    d.set_size(PANEL_WIDTH, SAMPLE_HEIGHT);

    d.add_static(IDC_BLEND_WEIGHT_STATIC, &settings.blend_weight_label(), Rect::new(10.0, 60.0, 150.0, 22.0));
    d.add_slider(
        IDC_BLEND_WEIGHT,
        Rect::new(10.0, 84.0, 150.0, 22.0),
        *BLEND_WEIGHT_RANGE.start() as i32,
        *BLEND_WEIGHT_RANGE.end() as i32,
        settings.blend_weight() as i32,
    );

    d.add_static(IDC_BLUR_SIZE_STATIC, &settings.blur_size_label(), Rect::new(10.0, 134.0, 150.0, 22.0));
    d.add_slider(
        IDC_BLUR_SIZE,
        Rect::new(10.0, 158.0, 150.0, 22.0),
        *BLUR_SIZE_RANGE.start() as i32,
        *BLUR_SIZE_RANGE.end() as i32,
        settings.blur_size() as i32,
    );

    let radios = [
        (IDC_MODE_OFF, "OFF", Mode::Off, 208.0),
        (IDC_MODE_TAA, "TAA", Mode::TemporalAa, 234.0),
        (IDC_MODE_CAMMOVE, "Move Camera", Mode::CameraMove, 260.0),
    ];
    for (id, label, mode, y) in radios {
        d.add_radio(id, IDC_MODE_GROUP, label, Rect::new(20.0, y, 170.0, 22.0), settings.mode == mode);
    }
    d
}

fn build_device() -> Dialog {
    let mut d = Dialog::new();
    d.set_size(DEVICE_SIZE.x, DEVICE_SIZE.y);
    d.set_background(Some(Color::from_argb(0xe020_2028)));
    d.add_static(IDC_PRESENT_STATIC, "Present mode", Rect::new(10.0, 10.0, 230.0, 22.0));
    let labels = ["VSync on", "VSync off", "Mailbox"];
    for (i, ((id, mode), label)) in PRESENT_MODES.iter().zip(labels).enumerate() {
        let y = 36.0 + i as f32 * 26.0;
        let checked = *mode == wgpu::PresentMode::Fifo;
        d.add_radio(*id, IDC_PRESENT_GROUP, label, Rect::new(20.0, y, 210.0, 22.0), checked);
    }
    d.add_button(IDC_DEVICE_CLOSE, "Close (F2)", Rect::new(40.0, 120.0, 170.0, 22.0), Some(Key::F(2)));
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use halton_engine::input::MouseButton;

    fn hud() -> (DemoHud, TaaSettings) {
        let settings = TaaSettings::default();
        (DemoHud::new(&settings, 640, 480), settings)
    }

    fn button(x: f32, y: f32, pressed: bool) -> InputEvent {
        InputEvent::PointerButton { button: MouseButton::Left, pressed, x, y }
    }

    fn click(hud: &mut DemoHud, settings: &mut TaaSettings, x: f32, y: f32) -> Vec<HudCommand> {
        let mut commands = hud.route(&button(x, y, true), settings).commands;
        commands.extend(hud.route(&button(x, y, false), settings).commands);
        commands
    }

    fn key(k: Key) -> InputEvent {
        InputEvent::Key { key: k, pressed: true, repeat: false }
    }

    // ── settings panel ────────────────────────────────────────────────────

    #[test]
    fn initial_labels_reflect_settings() {
        let (hud, _) = hud();
        assert_eq!(hud.sample_dialog().static_text(IDC_BLEND_WEIGHT_STATIC), Some("Blend Weight: 1/ 8"));
        assert_eq!(hud.sample_dialog().static_text(IDC_BLUR_SIZE_STATIC), Some("Blur Size: 0.2"));
        assert!(hud.sample_dialog().radio(IDC_MODE_TAA).is_some_and(|r| r.is_checked()));
    }

    #[test]
    fn mode_radio_sets_mode() {
        let (mut hud, mut settings) = hud();
        // Sample panel origin is (470, 180).
        click(&mut hud, &mut settings, 500.0, 180.0 + 215.0);
        assert_eq!(settings.mode, Mode::Off);
        click(&mut hud, &mut settings, 500.0, 180.0 + 267.0);
        assert_eq!(settings.mode, Mode::CameraMove);
        assert!(!hud.sample_dialog().radio(IDC_MODE_TAA).is_some_and(|r| r.is_checked()));
    }

    #[test]
    fn slider_updates_weight_and_label() {
        let (mut hud, mut settings) = hud();
        let routed = hud.route(&button(480.0, 180.0 + 95.0, true), &mut settings);
        assert!(routed.consumed);
        assert_eq!(settings.blend_weight(), 1);
        assert_eq!(hud.sample_dialog().static_text(IDC_BLEND_WEIGHT_STATIC), Some("Blend Weight: 1/ 1"));
    }

    #[test]
    fn blur_slider_updates_label() {
        let (mut hud, mut settings) = hud();
        hud.route(&button(629.0, 180.0 + 169.0, true), &mut settings);
        assert_eq!(settings.blur_size(), 10);
        assert_eq!(hud.sample_dialog().static_text(IDC_BLUR_SIZE_STATIC), Some("Blur Size: 1.0"));
    }

    // ── toolbar ───────────────────────────────────────────────────────────

    #[test]
    fn toolbar_buttons_issue_commands() {
        let (mut hud, mut settings) = hud();
        assert_eq!(click(&mut hud, &mut settings, 500.0, 30.0), vec![HudCommand::ToggleFullscreen]);
        assert_eq!(hud.route(&key(Key::F(3)), &mut settings).commands, vec![HudCommand::ToggleReference]);
    }

    #[test]
    fn unhandled_events_fall_through() {
        let (mut hud, mut settings) = hud();
        assert!(!hud.route(&button(100.0, 100.0, true), &mut settings).consumed);
        let wheel = InputEvent::Wheel { notches: 1.0 };
        assert!(!hud.route(&wheel, &mut settings).consumed);
    }

    // ── device dialog ─────────────────────────────────────────────────────

    #[test]
    fn device_dialog_is_exclusive_while_open() {
        let (mut hud, mut settings) = hud();
        hud.route(&key(Key::F(2)), &mut settings);
        assert!(hud.is_device_dialog_active());

        // Would hit the OFF radio if the panel were routed.
        let routed = hud.route(&button(500.0, 395.0, true), &mut settings);
        assert!(routed.consumed);
        hud.route(&button(500.0, 395.0, false), &mut settings);
        assert_eq!(settings.mode, Mode::TemporalAa);

        hud.route(&key(Key::F(2)), &mut settings);
        assert!(!hud.is_device_dialog_active());
    }

    #[test]
    fn present_mode_radio_issues_command() {
        let (mut hud, mut settings) = hud();
        hud.route(&key(Key::F(2)), &mut settings);
        // Device dialog origin is (195, 160); "VSync off" sits at y = 62.
        let commands = click(&mut hud, &mut settings, 250.0, 160.0 + 70.0);
        assert_eq!(commands, vec![HudCommand::SetPresentMode(wgpu::PresentMode::Immediate)]);
    }

    // ── stats ─────────────────────────────────────────────────────────────

    #[test]
    fn stats_lines() {
        let stats = FrameStats {
            fps: 59.94,
            present_mode: wgpu::PresentMode::Fifo,
            width: 640,
            height: 480,
            adapter: "Test GPU".into(),
            backend: wgpu::Backend::Vulkan,
            reference: true,
        };
        assert_eq!(stats.frame_line(), "59.94 fps (vsync on) 640x480");
        assert_eq!(stats.device_line(), "Test GPU (Vulkan) [REF]");
    }
}
