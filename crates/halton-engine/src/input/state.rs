use std::collections::HashSet;

use super::event::{InputEvent, Key, Modifiers, MouseButton};

/// What is held down right now, folded from the event stream.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    /// Last pointer position; `None` once the pointer leaves the window.
    pub pointer: Option<(f32, f32)>,
    keys: HashSet<Key>,
    buttons: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key { key, pressed, .. } => {
                if pressed {
                    self.keys.insert(key);
                } else {
                    self.keys.remove(&key);
                }
            }
            InputEvent::PointerMoved { x, y } => self.pointer = Some((x, y)),
            InputEvent::PointerButton { button, pressed, x, y } => {
                self.pointer = Some((x, y));
                if pressed {
                    self.buttons.insert(button);
                } else {
                    self.buttons.remove(&button);
                }
            }
            InputEvent::ModifiersChanged(m) => self.modifiers = m,
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Focused(focused) => {
                self.focused = focused;
                // No releases arrive for what was held when focus went away.
                if !focused {
                    self.keys.clear();
                    self.buttons.clear();
                    self.modifiers = Modifiers::default();
                }
            }
            InputEvent::Wheel { .. } => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Pointer position for events that carry none (button presses).
    pub fn pointer_or_origin(&self) -> (f32, f32) {
        self.pointer.unwrap_or((0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(pressed: bool) -> InputEvent {
        InputEvent::PointerButton { button: MouseButton::Left, pressed, x: 4.0, y: 8.0 }
    }

    #[test]
    fn button_press_and_release() {
        let mut s = InputState::default();
        s.apply(&left(true));
        assert!(s.button_down(MouseButton::Left));
        assert_eq!(s.pointer, Some((4.0, 8.0)));
        s.apply(&left(false));
        assert!(!s.button_down(MouseButton::Left));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut s = InputState::default();
        s.apply(&left(true));
        s.apply(&InputEvent::Key { key: Key::F(3), pressed: true, repeat: false });
        s.apply(&InputEvent::ModifiersChanged(Modifiers { alt: true, ..Default::default() }));
        s.apply(&InputEvent::Focused(false));
        assert!(!s.button_down(MouseButton::Left));
        assert!(!s.key_down(Key::F(3)));
        assert!(!s.modifiers.alt);
    }

    #[test]
    fn pointer_leave_forgets_position() {
        let mut s = InputState::default();
        s.apply(&InputEvent::PointerMoved { x: 1.0, y: 2.0 });
        assert_eq!(s.pointer_or_origin(), (1.0, 2.0));
        s.apply(&InputEvent::PointerLeft);
        assert_eq!(s.pointer, None);
        assert_eq!(s.pointer_or_origin(), (0.0, 0.0));
    }
}
