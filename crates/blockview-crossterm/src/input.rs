//! Crossterm key events → [`Msg`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use blockview_core::{Key, Msg};

/// Maps a crossterm [`KeyCode`] to a [`Key`].
pub(crate) fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Key::letter(c).or_else(|| Key::digit(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        KeyCode::Modifier(m) => modifier_key(m),
        _ => None,
    }
}

/// Bare modifier presses only arrive with keyboard enhancement enabled.
fn modifier_key(m: crossterm::event::ModifierKeyCode) -> Option<Key> {
    use crossterm::event::ModifierKeyCode as M;
    match m {
        M::LeftControl => Some(Key::ControlLeft),
        M::RightControl => Some(Key::ControlRight),
        M::LeftShift => Some(Key::ShiftLeft),
        M::RightShift => Some(Key::ShiftRight),
        M::LeftAlt => Some(Key::AltLeft),
        M::RightAlt => Some(Key::AltRight),
        _ => None,
    }
}

/// Translate a key event. Escape and Ctrl-C quit; releases are ignored.
pub(crate) fn to_msg(ev: KeyEvent) -> Option<Msg> {
    if ev.kind == KeyEventKind::Release {
        return None;
    }
    if ev.code == KeyCode::Esc
        || (ev.modifiers.contains(KeyModifiers::CONTROL) && ev.code == KeyCode::Char('c'))
    {
        return Some(Msg::Quit);
    }
    to_key(ev.code).map(Msg::key)
}
