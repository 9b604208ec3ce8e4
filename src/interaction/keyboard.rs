//! Key events and the shortcut table.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    /// Platform command modifier: ctrl, or cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Escape,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Focus is in a text field; editor shortcuts must not fire.
    pub in_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers, in_text_input: false }
    }

    pub fn char(c: char, modifiers: Modifiers) -> Self {
        Self::new(Key::Char(c), modifiers)
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// Whether the editor consumed a key. `Handled` tells the host to suppress
/// its default (browser zoom on ctrl+=, back navigation on backspace, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomToFit,
    Duplicate,
    Delete,
    Escape,
}

/// Map a key press to an editor command.
pub fn resolve(event: &KeyEvent) -> Option<KeyCommand> {
    let m = event.modifiers;
    match event.key {
        Key::Escape => Some(KeyCommand::Escape),
        Key::Delete | Key::Backspace => Some(KeyCommand::Delete),
        Key::Char(c) => match (c.to_ascii_lowercase(), m.command()) {
            ('z', true) if m.shift => Some(KeyCommand::Redo),
            ('z', true) => Some(KeyCommand::Undo),
            ('y', true) => Some(KeyCommand::Redo),
            ('=' | '+', true) => Some(KeyCommand::ZoomIn),
            ('+', false) => Some(KeyCommand::ZoomIn),
            ('-', true) => Some(KeyCommand::ZoomOut),
            ('0', true) => Some(KeyCommand::ZoomReset),
            ('1', true) => Some(KeyCommand::ZoomToFit),
            ('f', false) if !m.alt => Some(KeyCommand::ZoomToFit),
            ('d', true) => Some(KeyCommand::Duplicate),
            _ => None,
        },
        Key::Space | Key::Other => None,
    }
}
