//! Dialogs: positioned groups of controls with event routing.

use halton_engine::coords::{Rect, Vec2};
use halton_engine::input::Key;
use halton_engine::paint::Color;

use crate::event::{ControlId, EventResult, GuiEvent, GuiEventKind, HudEvent, Response};
use crate::painter::Painter;
use crate::widget::{Control, Widget};
use crate::widgets::{Button, RadioButton, Slider, Static};

/// A dialog owns its controls and turns input into [`GuiEvent`]s.
pub struct Dialog {
    location: Vec2,
    size: Vec2,
    background: Option<Color>,
    controls: Vec<(ControlId, Control)>,
    /// Control that took the last pointer press; it sees every event until release.
    captured: Option<usize>,
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialog {
    pub fn new() -> Self {
        Self {
            location: Vec2::zero(),
            size: Vec2::zero(),
            background: None,
            controls: Vec::new(),
            captured: None,
        }
    }

    pub fn set_location(&mut self, x: f32, y: f32) {
        self.location = Vec2::new(x, y);
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    pub fn location(&self) -> Vec2 {
        self.location
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.location, self.size)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    // ── building ──────────────────────────────────────────────────────────

    pub fn add_button(&mut self, id: ControlId, text: &str, bounds: Rect, hotkey: Option<Key>) {
        let mut button = Button::new(text, bounds);
        if let Some(key) = hotkey {
            button = button.hotkey(key);
        }
        self.push(id, Control::Button(button));
    }

    pub fn add_static(&mut self, id: ControlId, text: &str, bounds: Rect) {
        self.push(id, Control::Static(Static::new(text, bounds)));
    }

    pub fn add_slider(&mut self, id: ControlId, bounds: Rect, min: i32, max: i32, value: i32) {
        self.push(id, Control::Slider(Slider::new(bounds, min, max, value)));
    }

    /// Adds a radio button; checking it unchecks the others in `group`.
    pub fn add_radio(&mut self, id: ControlId, group: u32, text: &str, bounds: Rect, checked: bool) {
        if checked {
            self.uncheck_group(group, None);
        }
        self.push(id, Control::Radio(RadioButton::new(text, bounds, group, checked)));
    }

    fn push(&mut self, id: ControlId, control: Control) {
        if self.controls.iter().any(|(existing, _)| *existing == id) {
            log::warn!("duplicate control id {id}; lookups return the first");
        }
        self.controls.push((id, control));
    }

    // ── lookup ────────────────────────────────────────────────────────────

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|(cid, _)| *cid == id).map(|(_, c)| c)
    }

    fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.controls.iter_mut().find(|(cid, _)| *cid == id).map(|(_, c)| c)
    }

    pub fn slider(&self, id: ControlId) -> Option<&Slider> {
        match self.control(id)? {
            Control::Slider(s) => Some(s),
            _ => None,
        }
    }

    pub fn radio(&self, id: ControlId) -> Option<&RadioButton> {
        match self.control(id)? {
            Control::Radio(r) => Some(r),
            _ => None,
        }
    }

    pub fn static_text(&self, id: ControlId) -> Option<&str> {
        match self.control(id)? {
            Control::Static(s) => Some(s.text()),
            _ => None,
        }
    }

    /// Replaces a static's text. Returns `false` when `id` is not a static.
    pub fn set_static_text(&mut self, id: ControlId, text: impl Into<String>) -> bool {
        match self.control_mut(id) {
            Some(Control::Static(s)) => {
                s.set_text(text);
                true
            }
            _ => false,
        }
    }

    /// Checks a radio button without firing an event.
    pub fn set_radio_checked(&mut self, id: ControlId) -> bool {
        let group = match self.radio(id) {
            Some(r) => r.group(),
            None => return false,
        };
        self.uncheck_group(group, Some(id));
        if let Some(Control::Radio(r)) = self.control_mut(id) {
            r.set_checked(true);
        }
        true
    }

    fn uncheck_group(&mut self, group: u32, except: Option<ControlId>) {
        for (cid, control) in &mut self.controls {
            if let Control::Radio(r) = control {
                if r.group() == group && Some(*cid) != except {
                    r.set_checked(false);
                }
            }
        }
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Routes `event` to the controls. Fired control events are appended to
    /// `out`; the result tells the caller whether to keep routing.
    pub fn on_event(&mut self, event: &HudEvent, out: &mut Vec<GuiEvent>) -> EventResult {
        let origin = self.location;

        if let Some(index) = self.captured {
            let response = self.controls[index].1.widget_mut().on_event(event, origin);
            if matches!(event, HudEvent::PointerUp { .. }) {
                self.captured = None;
            }
            self.dispatch(index, response, out);
            return response.result();
        }

        for index in 0..self.controls.len() {
            let response = self.controls[index].1.widget_mut().on_event(event, origin);
            if response == Response::Ignored {
                continue;
            }
            if matches!(event, HudEvent::PointerDown { .. }) {
                self.captured = Some(index);
            }
            self.dispatch(index, response, out);
            return response.result();
        }
        EventResult::Ignored
    }

    fn dispatch(&mut self, index: usize, response: Response, out: &mut Vec<GuiEvent>) {
        let Response::Fired(kind) = response else { return };
        let control_id = self.controls[index].0;

        if kind == GuiEventKind::RadioSelected {
            if let Control::Radio(r) = &self.controls[index].1 {
                let group = r.group();
                self.uncheck_group(group, Some(control_id));
            }
        }
        out.push(GuiEvent { control_id, kind });
    }

    // ── painting ──────────────────────────────────────────────────────────

    pub fn paint(&self, painter: &mut Painter<'_>) {
        if let Some(bg) = self.background {
            painter.fill_rect(self.bounds(), bg);
        }
        for (_, control) in &self.controls {
            control.widget().paint(painter, self.location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: u32 = 1;

    fn dialog() -> Dialog {
        let mut d = Dialog::new();
        d.set_location(100.0, 50.0);
        d.set_size(170.0, 300.0);
        d.add_static(1, "Blend Weight: 1/ 8", Rect::new(0.0, 0.0, 170.0, 20.0));
        d.add_slider(2, Rect::new(0.0, 20.0, 110.0, 20.0), 1, 32, 8);
        d.add_radio(3, GROUP, "OFF", Rect::new(0.0, 60.0, 100.0, 20.0), false);
        d.add_radio(4, GROUP, "TAA", Rect::new(0.0, 80.0, 100.0, 20.0), true);
        d.add_radio(5, GROUP, "Move Camera", Rect::new(0.0, 100.0, 100.0, 20.0), false);
        d.add_button(6, "Change device (F2)", Rect::new(0.0, 130.0, 170.0, 22.0), Some(Key::F(2)));
        d
    }

    fn click(d: &mut Dialog, x: f32, y: f32) -> Vec<GuiEvent> {
        let mut out = Vec::new();
        let pos = Vec2::new(x, y);
        d.on_event(&HudEvent::PointerDown { pos }, &mut out);
        d.on_event(&HudEvent::PointerUp { pos }, &mut out);
        out
    }

    // ── radios ────────────────────────────────────────────────────────────

    #[test]
    fn selecting_a_radio_unchecks_the_group() {
        let mut d = dialog();
        let events = click(&mut d, 110.0, 120.0);
        assert_eq!(events, vec![GuiEvent { control_id: 3, kind: GuiEventKind::RadioSelected }]);
        assert!(d.radio(3).is_some_and(|r| r.is_checked()));
        assert!(d.radio(4).is_some_and(|r| !r.is_checked()));
        assert!(d.radio(5).is_some_and(|r| !r.is_checked()));
    }

    #[test]
    fn set_radio_checked_is_silent_and_exclusive() {
        let mut d = dialog();
        assert!(d.set_radio_checked(5));
        assert!(d.radio(5).is_some_and(|r| r.is_checked()));
        assert!(d.radio(4).is_some_and(|r| !r.is_checked()));
        assert!(!d.set_radio_checked(2));
    }

    // ── sliders ───────────────────────────────────────────────────────────

    #[test]
    fn slider_drag_is_captured_outside_the_dialog() {
        let mut d = dialog();
        let mut out = Vec::new();
        d.on_event(&HudEvent::PointerDown { pos: Vec2::new(100.0, 80.0) }, &mut out);
        let r = d.on_event(&HudEvent::PointerMoved { pos: Vec2::new(900.0, 900.0) }, &mut out);
        assert!(r.is_consumed());
        assert_eq!(out.last(), Some(&GuiEvent { control_id: 2, kind: GuiEventKind::SliderChanged(32) }));
        assert_eq!(d.slider(2).map(Slider::value), Some(32));

        d.on_event(&HudEvent::PointerUp { pos: Vec2::new(900.0, 900.0) }, &mut out);
        let after = d.on_event(&HudEvent::PointerMoved { pos: Vec2::new(0.0, 0.0) }, &mut out);
        assert_eq!(after, EventResult::Ignored);
    }

    // ── routing ───────────────────────────────────────────────────────────

    #[test]
    fn clicks_on_empty_space_fall_through() {
        let mut d = dialog();
        let mut out = Vec::new();
        let r = d.on_event(&HudEvent::PointerDown { pos: Vec2::new(5.0, 5.0) }, &mut out);
        assert_eq!(r, EventResult::Ignored);
        assert!(out.is_empty());
    }

    #[test]
    fn hotkeys_fire_buttons() {
        let mut d = dialog();
        let mut out = Vec::new();
        assert!(d.on_event(&HudEvent::KeyDown { key: Key::F(2) }, &mut out).is_consumed());
        assert_eq!(out, vec![GuiEvent { control_id: 6, kind: GuiEventKind::ButtonClicked }]);
    }

    #[test]
    fn static_text_updates() {
        let mut d = dialog();
        assert!(d.set_static_text(1, "Blend Weight: 1/32"));
        assert_eq!(d.static_text(1), Some("Blend Weight: 1/32"));
        assert!(!d.set_static_text(2, "nope"));
    }
}
