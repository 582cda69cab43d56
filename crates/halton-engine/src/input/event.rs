/// Keys the demo and its dialogs react to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,
    /// Function key `F1`..=`F12`.
    F(u8),
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Window input in back-buffer pixels, independent of winit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool, repeat: bool },
    PointerMoved { x: f32, y: f32 },
    PointerButton { button: MouseButton, pressed: bool, x: f32, y: f32 },
    /// Vertical scroll in wheel notches; positive scrolls away from the user.
    Wheel { notches: f32 },
    ModifiersChanged(Modifiers),
    PointerLeft,
    Focused(bool),
}

impl InputEvent {
    /// The key of a first press. Releases and auto-repeats give `None`.
    pub fn key_pressed(&self) -> Option<Key> {
        match *self {
            InputEvent::Key { key, pressed: true, repeat: false } => Some(key),
            _ => None,
        }
    }

    /// Position and press state of a left-button transition.
    pub fn left_button(&self) -> Option<(f32, f32, bool)> {
        match *self {
            InputEvent::PointerButton { button: MouseButton::Left, pressed, x, y } => Some((x, y, pressed)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_and_releases_are_not_presses() {
        let key = |pressed, repeat| InputEvent::Key { key: Key::F(2), pressed, repeat };
        assert_eq!(key(true, false).key_pressed(), Some(Key::F(2)));
        assert_eq!(key(true, true).key_pressed(), None);
        assert_eq!(key(false, false).key_pressed(), None);
    }

    #[test]
    fn only_left_button_transitions_are_reported() {
        let ev = |button| InputEvent::PointerButton { button, pressed: true, x: 3.0, y: 4.0 };
        assert_eq!(ev(MouseButton::Left).left_button(), Some((3.0, 4.0, true)));
        assert_eq!(ev(MouseButton::Right).left_button(), None);
        assert_eq!(InputEvent::PointerLeft.left_button(), None);
    }
}
