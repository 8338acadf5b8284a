/// Which phase of a key interaction an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Character-producing press (may repeat while held).
    KeyPress,
    /// Physical key went down.
    KeyDown,
    /// Physical key went up.
    KeyUp,
}

impl KeyEventKind {
    /// True for the kinds that start or continue holding a key.
    pub fn is_press(self) -> bool {
        matches!(self, Self::KeyPress | Self::KeyDown)
    }
}

/// Modifier flags reported alongside a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A keyboard event as delivered by the host's input source.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// Key name as produced by the keyboard layout, e.g. `"w"`.
    pub key: String,
    /// Character code of the key, or 0 when it has none.
    pub code: u32,
    pub modifiers: Modifiers,
    /// Set when the event was generated by auto-repeat.
    pub repeat: bool,
}

impl KeyEvent {
    /// Build an event for a single-character key, deriving `code` from it.
    pub fn character(kind: KeyEventKind, key: &str) -> Self {
        let code = single_char(key).map_or(0, u32::from);
        Self {
            kind,
            key: key.to_string(),
            code,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }
}

/// Movement action a key is bound to.
///
/// Hosts hand raw key events to the input state; everything downstream sees
/// only these actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Push the camera along +forward (`w`).
    MoveForward,
    /// Push the camera along -forward (`s`).
    MoveBackward,
    /// Push the camera along -side (`a`).
    StrafeLeft,
    /// Push the camera along +side (`d`).
    StrafeRight,
    /// Any key without a binding.
    Other,
}

impl KeyAction {
    /// Resolve the action for an event. The key name wins; the character
    /// code is consulted only when the name has no binding.
    pub fn from_event(event: &KeyEvent) -> Self {
        match Self::from_key_name(&event.key) {
            Self::Other => Self::from_code(event.code),
            action => action,
        }
    }

    pub fn from_key_name(key: &str) -> Self {
        match single_char(key).map(|c| c.to_ascii_lowercase()) {
            Some('w') => Self::MoveForward,
            Some('s') => Self::MoveBackward,
            Some('a') => Self::StrafeLeft,
            Some('d') => Self::StrafeRight,
            _ => Self::Other,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match char::from_u32(code) {
            Some(c) if c.is_ascii_alphabetic() => Self::from_key_name(c.encode_utf8(&mut [0; 4])),
            _ => Self::Other,
        }
    }

    /// Axis and direction this action drives, or `None` for `Other`.
    pub fn axis(self) -> Option<(Axis, Direction)> {
        match self {
            Self::MoveForward => Some((Axis::Forward, Direction::Positive)),
            Self::MoveBackward => Some((Axis::Forward, Direction::Negative)),
            Self::StrafeRight => Some((Axis::Side, Direction::Positive)),
            Self::StrafeLeft => Some((Axis::Side, Direction::Negative)),
            Self::Other => None,
        }
    }
}

/// The two camera movement axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Forward,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_names_map_to_actions() {
        assert_eq!(KeyAction::from_key_name("w"), KeyAction::MoveForward);
        assert_eq!(KeyAction::from_key_name("s"), KeyAction::MoveBackward);
        assert_eq!(KeyAction::from_key_name("a"), KeyAction::StrafeLeft);
        assert_eq!(KeyAction::from_key_name("d"), KeyAction::StrafeRight);
        assert_eq!(KeyAction::from_key_name("f"), KeyAction::Other);
        assert_eq!(KeyAction::from_key_name("Shift"), KeyAction::Other);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(KeyAction::from_key_name("W"), KeyAction::MoveForward);
        assert_eq!(KeyAction::from_key_name("D"), KeyAction::StrafeRight);
    }

    #[test]
    fn code_is_a_fallback_for_unnamed_keys() {
        let event = KeyEvent {
            kind: KeyEventKind::KeyPress,
            key: String::new(),
            code: 115,
            modifiers: Modifiers::default(),
            repeat: false,
        };
        assert_eq!(KeyAction::from_event(&event), KeyAction::MoveBackward);
        assert_eq!(KeyAction::from_code(0), KeyAction::Other);
        assert_eq!(KeyAction::from_code(100), KeyAction::StrafeRight);
    }

    #[test]
    fn strafe_keys_are_distinct() {
        // a and d must never resolve to the same action
        let a = KeyAction::from_event(&KeyEvent::character(KeyEventKind::KeyDown, "a"));
        let d = KeyAction::from_event(&KeyEvent::character(KeyEventKind::KeyDown, "d"));
        assert_ne!(a, d);
        assert_eq!(a.axis(), Some((Axis::Side, Direction::Negative)));
        assert_eq!(d.axis(), Some((Axis::Side, Direction::Positive)));
    }

    #[test]
    fn character_event_carries_code() {
        let e = KeyEvent::character(KeyEventKind::KeyDown, "w");
        assert_eq!(e.code, 119);
        assert!(e.kind.is_press());
        assert!(!KeyEventKind::KeyUp.is_press());
    }
}
