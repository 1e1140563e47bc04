//! Key-to-command mapping: [`InputDispatcher`] and [`Binding`].

use std::collections::HashMap;

use crate::engine::{Command, Engine};
use crate::messages::Key;

/// One entry of the key table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    pub key: Key,
    pub command: Command,
}

impl Binding {
    pub const fn new(key: Key, command: Command) -> Self {
        Self { key, command }
    }
}

/// The stock layout: `A`/`D` move, `W` drops, `Q`/`E` rotate, `Space` and
/// left `Ctrl` step down. Arrow keys mirror the move/drop keys.
pub fn default_bindings() -> Vec<Binding> {
    use Command::*;
    vec![
        Binding::new(Key::Letter('a'), MoveLeft),
        Binding::new(Key::Letter('d'), MoveRight),
        Binding::new(Key::Letter('w'), DropDown),
        Binding::new(Key::Letter('q'), RotateLeft),
        Binding::new(Key::Letter('e'), RotateRight),
        Binding::new(Key::ControlLeft, MoveDown),
        Binding::new(Key::Space, MoveDown),
        Binding::new(Key::ArrowLeft, MoveLeft),
        Binding::new(Key::ArrowRight, MoveRight),
        Binding::new(Key::ArrowDown, MoveDown),
        Binding::new(Key::ArrowUp, DropDown),
    ]
}

/// Stateless key → [`Command`] table.
///
/// Every mapped key press turns into exactly one engine call, right away.
/// There is no queue, no repeat suppression and no rate limit.
#[derive(Clone, Debug)]
pub struct InputDispatcher {
    table: HashMap<Key, Command>,
}

impl InputDispatcher {
    /// Build from a binding list. A later binding for the same key wins.
    pub fn new(bindings: &[Binding]) -> Self {
        Self {
            table: bindings.iter().map(|b| (b.key, b.command)).collect(),
        }
    }

    pub fn lookup(&self, key: Key) -> Option<Command> {
        self.table.get(&key).copied()
    }

    /// Forward `key` to `engine` if it is mapped. Returns the command sent.
    pub fn dispatch<E: Engine + ?Sized>(&self, key: Key, engine: &mut E) -> Option<Command> {
        let command = self.lookup(key)?;
        engine.apply(command);
        Some(command)
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new(&default_bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[derive(Default)]
    struct Log {
        sent: Vec<Command>,
    }

    impl Engine for Log {
        fn run_step(&mut self) -> Result<bool, EngineError> {
            Ok(false)
        }
        fn board_color_at(&self, _x: i32, _y: i32) -> Result<i32, EngineError> {
            Ok(-1)
        }
        fn active_piece_at(&self, _x: i32, _y: i32) -> Result<i32, EngineError> {
            Ok(-1)
        }
        fn active_piece_x(&self) -> Result<i32, EngineError> {
            Ok(0)
        }
        fn active_piece_y(&self) -> Result<i32, EngineError> {
            Ok(0)
        }
        fn apply(&mut self, command: Command) {
            self.sent.push(command);
        }
    }

    #[test]
    fn default_layout() {
        let d = InputDispatcher::default();
        assert_eq!(d.lookup(Key::Letter('a')), Some(Command::MoveLeft));
        assert_eq!(d.lookup(Key::Letter('d')), Some(Command::MoveRight));
        assert_eq!(d.lookup(Key::Letter('w')), Some(Command::DropDown));
        assert_eq!(d.lookup(Key::Letter('q')), Some(Command::RotateLeft));
        assert_eq!(d.lookup(Key::Letter('e')), Some(Command::RotateRight));
        assert_eq!(d.lookup(Key::Space), Some(Command::MoveDown));
        assert_eq!(d.lookup(Key::ControlLeft), Some(Command::MoveDown));
        assert_eq!(d.lookup(Key::ControlRight), None);
    }

    #[test]
    fn every_command_is_reachable_by_default() {
        let d = InputDispatcher::default();
        let bound: Vec<_> = default_bindings().iter().map(|b| b.command).collect();
        for cmd in Command::ALL {
            assert!(bound.contains(&cmd), "{cmd:?} unbound");
        }
        assert!(default_bindings().iter().all(|b| d.lookup(b.key) == Some(b.command)));
    }

    #[test]
    fn unmapped_key_sends_nothing() {
        let d = InputDispatcher::default();
        let mut engine = Log::default();
        assert_eq!(d.dispatch(Key::Letter('z'), &mut engine), None);
        assert_eq!(d.dispatch(Key::Escape, &mut engine), None);
        assert!(engine.sent.is_empty());
    }

    #[test]
    fn repeated_keys_are_not_coalesced() {
        let d = InputDispatcher::default();
        let mut engine = Log::default();
        for _ in 0..3 {
            d.dispatch(Key::Letter('a'), &mut engine);
        }
        d.dispatch(Key::Letter('e'), &mut engine);
        assert_eq!(
            engine.sent,
            vec![Command::MoveLeft, Command::MoveLeft, Command::MoveLeft, Command::RotateRight]
        );
    }

    #[test]
    fn later_binding_overrides() {
        let d = InputDispatcher::new(&[
            Binding::new(Key::Space, Command::MoveDown),
            Binding::new(Key::Space, Command::DropDown),
        ]);
        assert_eq!(d.lookup(Key::Space), Some(Command::DropDown));
    }
}
