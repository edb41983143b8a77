//! # Operator Command Encoder
//!
//! Turns operator keypresses into debug commands for the power subsystem.
//!
//! A command is latched by pressing its letter and sent by pressing Enter:
//!
//! ```text
//!            a | b | c                 a | b | c
//!   Idle ──────────────▶ Armed(x) ◀───────────────┐
//!    ▲                     │   └──────────────────┘
//!    └──────── Enter ──────┘   (emits command for x)
//! ```
//!
//! Any other key, or no key at all, leaves the state unchanged.
//!
//! ## Usage
//!
//! ```
//! use power_monitor::protocol::command::{Command, CommandEncoder, Key};
//!
//! let mut encoder = CommandEncoder::new();
//! assert_eq!(encoder.handle_key(Some(Key::Char('c'))), None);
//! assert_eq!(encoder.handle_key(Some(Key::Enter)), Some(Command::C));
//! assert_eq!(Command::C.wire(), "dbgmaicob1");
//! ```

/// A key as seen by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Enter / Return
    Enter,
    /// Anything else
    Other,
}

/// Debug command understood by the power subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Bound to key `a`
    A,
    /// Bound to key `b`
    B,
    /// Bound to key `c`
    C,
}

impl Command {
    /// Every command, in key order
    pub const ALL: [Command; 3] = [Command::A, Command::B, Command::C];

    /// Look up the command bound to a key letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Command::A),
            'b' => Some(Command::B),
            'c' => Some(Command::C),
            _ => None,
        }
    }

    /// The key letter this command is bound to.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Command::A => 'a',
            Command::B => 'b',
            Command::C => 'c',
        }
    }

    /// ASCII string sent over the serial link.
    #[must_use]
    pub fn wire(self) -> &'static str {
        match self {
            Command::A => "dbgmaicou1",
            Command::B => "dbgmaicd2",
            Command::C => "dbgmaicob1",
        }
    }
}

/// Encoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderState {
    /// No command latched
    #[default]
    Idle,
    /// Command latched, waiting for Enter
    Armed(Command),
}

/// Latch-then-confirm command state machine
#[derive(Debug, Clone, Default)]
pub struct CommandEncoder {
    state: EncoderState,
}

impl CommandEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Latched command, if any
    #[must_use]
    pub fn armed(&self) -> Option<Command> {
        match self.state {
            EncoderState::Idle => None,
            EncoderState::Armed(command) => Some(command),
        }
    }

    /// Feed one key (or `None` when no key was pressed this cycle).
    ///
    /// # Returns
    ///
    /// The command to send when Enter confirms a latched command.
    pub fn handle_key(&mut self, key: Option<Key>) -> Option<Command> {
        let key = key?;

        match (self.state, key) {
            (_, Key::Char(letter)) => {
                if let Some(command) = Command::from_letter(letter) {
                    self.state = EncoderState::Armed(command);
                }
                None
            }
            (EncoderState::Armed(command), Key::Enter) => {
                self.state = EncoderState::Idle;
                Some(command)
            }
            (EncoderState::Idle, Key::Enter) | (_, Key::Other) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(encoder: &mut CommandEncoder, keys: &[Key]) -> Vec<Command> {
        keys.iter()
            .filter_map(|&k| encoder.handle_key(Some(k)))
            .collect()
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(Command::A.wire(), "dbgmaicou1");
        assert_eq!(Command::B.wire(), "dbgmaicd2");
        assert_eq!(Command::C.wire(), "dbgmaicob1");
    }

    #[test]
    fn test_letter_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_letter(command.letter()), Some(command));
        }
        assert_eq!(Command::from_letter('d'), None);
        assert_eq!(Command::from_letter('A'), None);
    }

    #[test]
    fn test_starts_idle() {
        let encoder = CommandEncoder::new();
        assert_eq!(encoder.state(), EncoderState::Idle);
        assert_eq!(encoder.armed(), None);
    }

    #[test]
    fn test_c_enter_emits_c() {
        let mut encoder = CommandEncoder::new();
        let sent = feed(&mut encoder, &[Key::Char('c'), Key::Enter]);
        assert_eq!(sent, vec![Command::C]);
        assert_eq!(sent[0].wire(), "dbgmaicob1");
    }

    #[test]
    fn test_last_armed_wins() {
        let mut encoder = CommandEncoder::new();
        let sent = feed(&mut encoder, &[Key::Char('a'), Key::Char('b'), Key::Enter]);
        assert_eq!(sent, vec![Command::B]);
    }

    #[test]
    fn test_enter_while_idle_emits_nothing() {
        let mut encoder = CommandEncoder::new();
        assert!(feed(&mut encoder, &[Key::Enter, Key::Enter]).is_empty());
        assert_eq!(encoder.state(), EncoderState::Idle);
    }

    #[test]
    fn test_enter_returns_to_idle() {
        let mut encoder = CommandEncoder::new();
        let sent = feed(&mut encoder, &[Key::Char('a'), Key::Enter, Key::Enter]);
        assert_eq!(sent, vec![Command::A]);
        assert_eq!(encoder.state(), EncoderState::Idle);
    }

    #[test]
    fn test_other_keys_keep_latch() {
        let mut encoder = CommandEncoder::new();
        let sent = feed(
            &mut encoder,
            &[Key::Char('b'), Key::Char('x'), Key::Other, Key::Char('B'), Key::Enter],
        );
        assert_eq!(sent, vec![Command::B]);
    }

    #[test]
    fn test_no_key_is_noop() {
        let mut encoder = CommandEncoder::new();
        encoder.handle_key(Some(Key::Char('a')));
        assert_eq!(encoder.handle_key(None), None);
        assert_eq!(encoder.armed(), Some(Command::A));
    }

    #[test]
    fn test_unbound_letters_ignored_when_idle() {
        let mut encoder = CommandEncoder::new();
        assert!(feed(&mut encoder, &[Key::Char('z'), Key::Enter]).is_empty());
    }

    #[test]
    fn test_multiple_commands_in_sequence() {
        let mut encoder = CommandEncoder::new();
        let sent = feed(
            &mut encoder,
            &[Key::Char('a'), Key::Enter, Key::Char('c'), Key::Char('b'), Key::Enter],
        );
        assert_eq!(sent, vec![Command::A, Command::B]);
    }
}
