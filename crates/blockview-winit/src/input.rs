//! Translates winit keyboard events into [`Msg`] values.
//!
//! Physical key codes are used so the bindings follow key position, not
//! layout.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use blockview_core::{Key, Msg};

pub(crate) fn translate_keyboard(event: &KeyEvent) -> Option<Msg> {
    // Only key-down (pressed) events.
    if event.state != ElementState::Pressed {
        return None;
    }
    match translate_physical(event.physical_key)? {
        Key::Escape => Some(Msg::Quit),
        key => Some(Msg::key(key)),
    }
}

pub(crate) fn translate_physical(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Space => Key::Space,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::AltRight => Key::AltRight,
        other => return letter_or_digit(other),
    };
    Some(key)
}

fn letter_or_digit(code: KeyCode) -> Option<Key> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    if let Some(i) = LETTERS.iter().position(|&k| k == code) {
        return Some(Key::Letter((b'a' + i as u8) as char));
    }
    DIGITS
        .iter()
        .position(|&k| k == code)
        .map(|i| Key::Digit(i as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn play_keys() {
        let cases = [
            (KeyCode::KeyA, Key::Letter('a')),
            (KeyCode::KeyD, Key::Letter('d')),
            (KeyCode::KeyW, Key::Letter('w')),
            (KeyCode::KeyQ, Key::Letter('q')),
            (KeyCode::KeyE, Key::Letter('e')),
            (KeyCode::ControlLeft, Key::ControlLeft),
            (KeyCode::Space, Key::Space),
        ];
        for (code, key) in cases {
            assert_eq!(translate_physical(PhysicalKey::Code(code)), Some(key));
        }
    }

    #[test]
    fn letters_and_digits_by_position() {
        assert_eq!(
            translate_physical(PhysicalKey::Code(KeyCode::KeyZ)),
            Some(Key::Letter('z'))
        );
        assert_eq!(
            translate_physical(PhysicalKey::Code(KeyCode::Digit7)),
            Some(Key::Digit(7))
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(translate_physical(PhysicalKey::Code(KeyCode::F5)), None);
        assert_eq!(
            translate_physical(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            None
        );
    }
}
