use crate::input::{InputEvent, Key, KeyState};

/// Keyboard-triggered viewer commands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ViewCommand {
    /// Escape.
    Quit,
    /// `W`.
    Wireframe,
    /// `S`.
    Filled,
    /// `F`.
    FullScreen,
    /// `N`.
    Windowed,
}

impl ViewCommand {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Escape => Some(ViewCommand::Quit),
            Key::W => Some(ViewCommand::Wireframe),
            Key::S => Some(ViewCommand::Filled),
            Key::F => Some(ViewCommand::FullScreen),
            Key::N => Some(ViewCommand::Windowed),
            _ => None,
        }
    }

    /// Maps a fresh key press to a command. Releases and auto-repeats yield `None`.
    pub fn from_event(ev: &InputEvent) -> Option<Self> {
        match ev {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
                ..
            } => Self::from_key(*key),
            _ => None,
        }
    }
}
