//! Input events: [`Msg`] and [`Key`].

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A physical keyboard key, independent of layout and modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    /// A letter key, stored as its lowercase ASCII letter. Build with
    /// [`Key::letter`].
    Letter(char),
    /// A digit key `0..=9` from the main row.
    Digit(u8),
}

impl Key {
    /// The key for an ASCII letter, case-insensitive.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self::Letter(c.to_ascii_lowercase()))
    }

    /// The key for an ASCII digit.
    pub fn digit(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self::Digit(d as u8))
    }
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// An input message delivered by a host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    /// A key was pressed.
    KeyDown { key: Key },
    /// The host wants to stop.
    Quit,
}

impl Msg {
    #[inline]
    pub fn key(key: Key) -> Self {
        Self::KeyDown { key }
    }
}
