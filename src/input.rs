//! Input types handed to [`Application`](crate::app::Application) callbacks,
//! and their translation from winit events.
//!
//! The callback API does not expose winit types; the runtime converts with
//! the `map_*` functions below.

use std::fmt;

use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixel scroll deltas (touchpads) are divided by this to yield lines.
pub const PIXELS_PER_LINE: f64 = 20.0;

/// Keyboard key, identified by physical position.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    /// Any other key, carrying winit's `KeyCode` discriminant (0 when the
    /// platform could not identify it).
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What happened to a key or button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    /// Went down.
    Press,
    /// Went up.
    Release,
    /// Held down long enough to auto-repeat.
    Repeat,
}

/// Mouse button identifier.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Convert a winit element state plus its repeat flag.
#[must_use]
pub fn map_action(state: ElementState, repeat: bool) -> Action {
    match (state, repeat) {
        (ElementState::Pressed, false) => Action::Press,
        (ElementState::Pressed, true) => Action::Repeat,
        (ElementState::Released, _) => Action::Release,
    }
}

/// Convert a winit mouse button.
#[must_use]
pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Vertical wheel movement in lines; positive scrolls up/away.
#[must_use]
pub fn wheel_offset(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => f64::from(y),
        MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_LINE,
    }
}

/// Convert a winit physical key.
#[must_use]
pub fn map_key(key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = key else {
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn letter_and_control_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyM)), Key::M);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Space)), Key::Space);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Digit7);
    }

    #[test]
    fn unmapped_key_keeps_its_code() {
        let key = map_key(PhysicalKey::Code(KeyCode::F5));
        assert_eq!(key, Key::Unknown(KeyCode::F5 as u32));
    }

    #[test]
    fn unidentified_key_is_unknown_zero() {
        let key = map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified));
        assert_eq!(key, Key::Unknown(0));
    }

    #[test]
    fn repeat_only_applies_to_presses() {
        assert_eq!(map_action(ElementState::Pressed, false), Action::Press);
        assert_eq!(map_action(ElementState::Pressed, true), Action::Repeat);
        assert_eq!(map_action(ElementState::Released, false), Action::Release);
        assert_eq!(map_action(ElementState::Released, true), Action::Release);
    }

    #[test]
    fn mouse_buttons() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(
            map_mouse_button(WinitMouseButton::Other(9)),
            MouseButton::Other(9)
        );
    }

    #[test]
    fn line_delta_uses_vertical_component() {
        let offset = wheel_offset(MouseScrollDelta::LineDelta(3.0, -2.0));
        assert!((offset + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pixel_delta_is_converted_to_lines() {
        let offset = wheel_offset(MouseScrollDelta::PixelDelta(PhysicalPosition::new(
            0.0, 40.0,
        )));
        assert!((offset - 2.0).abs() < f64::EPSILON);
    }
}
