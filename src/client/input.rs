//! Input events
//!
//! The closed set of events the input collaborator can produce.

/// A discrete operator action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
    Unrecognized,
}

impl InputEvent {
    /// Map an operator token (a word or a single key) to an event
    ///
    /// Arrows are spelled out or typed as WASD / vi keys; matching ignores
    /// case and surrounding whitespace.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" | "w" | "k" => InputEvent::MoveUp,
            "down" | "s" | "j" => InputEvent::MoveDown,
            "left" | "a" | "h" => InputEvent::MoveLeft,
            "right" | "d" | "l" => InputEvent::MoveRight,
            "q" | "quit" => InputEvent::Quit,
            _ => InputEvent::Unrecognized,
        }
    }

    /// Command text carried on the wire, if this event sends one
    pub fn payload(&self) -> Option<&'static str> {
        match self {
            InputEvent::MoveUp => Some("MOVE UP"),
            InputEvent::MoveDown => Some("MOVE DOWN"),
            InputEvent::MoveLeft => Some("MOVE LEFT"),
            InputEvent::MoveRight => Some("MOVE RIGHT"),
            InputEvent::Quit | InputEvent::Unrecognized => None,
        }
    }
}
