use halton_engine::coords::Vec2;
use halton_engine::input::{InputEvent, Key};

/// Identifier of a control within its dialog.
pub type ControlId = u32;

/// Input routed through dialogs, in back-buffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HudEvent {
    PointerMoved { pos: Vec2 },
    /// Primary button pressed at `pos`.
    PointerDown { pos: Vec2 },
    /// Primary button released at `pos`.
    PointerUp { pos: Vec2 },
    /// Key pressed (repeats excluded).
    KeyDown { key: Key },
}

impl HudEvent {
    /// Translates an engine input event. Events dialogs never react to map to `None`.
    pub fn from_input(event: &InputEvent) -> Option<Self> {
        if let Some(key) = event.key_pressed() {
            return Some(HudEvent::KeyDown { key });
        }
        if let Some((x, y, pressed)) = event.left_button() {
            let pos = Vec2::new(x, y);
            return Some(if pressed { HudEvent::PointerDown { pos } } else { HudEvent::PointerUp { pos } });
        }
        match *event {
            InputEvent::PointerMoved { x, y } => Some(HudEvent::PointerMoved { pos: Vec2::new(x, y) }),
            _ => None,
        }
    }
}

/// What a control reports after it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiEventKind {
    ButtonClicked,
    SliderChanged(i32),
    RadioSelected,
}

/// Control-changed notification delivered to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiEvent {
    pub control_id: ControlId,
    pub kind: GuiEventKind,
}

/// Result of routing a [`HudEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled; stop routing to later consumers.
    Consumed,
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }
}

/// A control's answer to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignored,
    Consumed,
    /// Consumed, and the control's value changed.
    Fired(GuiEventKind),
}

impl Response {
    pub fn result(self) -> EventResult {
        match self {
            Response::Ignored => EventResult::Ignored,
            Response::Consumed | Response::Fired(_) => EventResult::Consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halton_engine::input::MouseButton;

    fn button(button: MouseButton, pressed: bool) -> InputEvent {
        InputEvent::PointerButton { button, pressed, x: 4.0, y: 8.0 }
    }

    #[test]
    fn left_button_maps_to_down_and_up() {
        assert_eq!(
            HudEvent::from_input(&button(MouseButton::Left, true)),
            Some(HudEvent::PointerDown { pos: Vec2::new(4.0, 8.0) })
        );
        assert_eq!(
            HudEvent::from_input(&button(MouseButton::Left, false)),
            Some(HudEvent::PointerUp { pos: Vec2::new(4.0, 8.0) })
        );
    }

    #[test]
    fn other_buttons_are_not_translated() {
        assert_eq!(HudEvent::from_input(&button(MouseButton::Right, true)), None);
    }

    #[test]
    fn key_repeats_are_dropped() {
        let key = |repeat| InputEvent::Key { key: Key::F(2), pressed: true, repeat };
        assert_eq!(HudEvent::from_input(&key(false)), Some(HudEvent::KeyDown { key: Key::F(2) }));
        assert_eq!(HudEvent::from_input(&key(true)), None);
    }

    #[test]
    fn pointer_move_keeps_position() {
        let ev = InputEvent::PointerMoved { x: 1.5, y: 2.5 };
        assert_eq!(HudEvent::from_input(&ev), Some(HudEvent::PointerMoved { pos: Vec2::new(1.5, 2.5) }));
    }

    #[test]
    fn fired_response_is_consumed() {
        assert!(Response::Fired(GuiEventKind::ButtonClicked).result().is_consumed());
        assert!(!Response::Ignored.result().is_consumed());
    }
}
