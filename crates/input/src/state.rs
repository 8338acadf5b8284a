use crate::action::{Axis, Direction, KeyAction, KeyEvent};

/// Held state of one movement axis.
///
/// Each direction is tracked on its own so releasing one key never cancels
/// the other. While both are held the most recent press wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisState {
    positive: bool,
    negative: bool,
    last_pressed: Option<Direction>,
}

impl AxisState {
    /// An auto-repeat keeps the key held but is not a new press, so it
    /// never takes the axis over from a later press of the other key.
    fn press(&mut self, direction: Direction, repeat: bool) {
        match direction {
            Direction::Positive => self.positive = true,
            Direction::Negative => self.negative = true,
        }
        if !repeat || self.last_pressed.is_none() {
            self.last_pressed = Some(direction);
        }
    }

    fn release(&mut self, direction: Direction) {
        match direction {
            Direction::Positive => self.positive = false,
            Direction::Negative => self.negative = false,
        }
    }

    fn value(&self) -> f32 {
        match (self.positive, self.negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            (true, true) => self.last_pressed.map_or(0.0, Direction::sign),
            (false, false) => 0.0,
        }
    }
}

/// Velocity inputs driven by the keyboard: `forward` and `side`, each in
/// {-1, 0, 1}.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    forward: AxisState,
    side: AxisState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key event. Returns `true` when the key is bound to an action
    /// (the event is consumed), `false` to let it propagate.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        tracing::debug!(
            kind = ?event.kind,
            key = %event.key,
            code = event.code,
            ctrl = event.modifiers.ctrl,
            shift = event.modifiers.shift,
            alt = event.modifiers.alt,
            meta = event.modifiers.meta,
            repeat = event.repeat,
            "key event"
        );

        let action = KeyAction::from_event(event);
        let Some((axis, direction)) = action.axis() else {
            return false;
        };

        let state = self.axis_mut(axis);
        if event.kind.is_press() {
            state.press(direction, event.repeat);
        } else {
            state.release(direction);
        }
        true
    }

    /// Forward velocity in {-1, 0, 1}.
    pub fn forward(&self) -> f32 {
        self.forward.value()
    }

    /// Side velocity in {-1, 0, 1}.
    pub fn side(&self) -> f32 {
        self.side.value()
    }

    pub fn is_idle(&self) -> bool {
        self.forward() == 0.0 && self.side() == 0.0
    }

    /// Drop every held key, e.g. when the window loses focus and key-up
    /// events will not arrive.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Forward => &mut self.forward,
            Axis::Side => &mut self.side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::KeyEventKind;

    fn down(key: &str) -> KeyEvent {
        KeyEvent::character(KeyEventKind::KeyDown, key)
    }

    fn up(key: &str) -> KeyEvent {
        KeyEvent::character(KeyEventKind::KeyUp, key)
    }

    #[test]
    fn starts_idle() {
        let input = InputState::new();
        assert_eq!(input.forward(), 0.0);
        assert_eq!(input.side(), 0.0);
        assert!(input.is_idle());
    }

    #[test]
    fn w_down_then_up_restores_forward() {
        let mut input = InputState::new();
        assert!(input.handle_key(&down("w")));
        assert_eq!(input.forward(), 1.0);
        assert!(input.handle_key(&up("w")));
        assert_eq!(input.forward(), 0.0);
    }

    #[test]
    fn s_down_then_up_restores_forward() {
        let mut input = InputState::new();
        input.handle_key(&down("s"));
        assert_eq!(input.forward(), -1.0);
        input.handle_key(&up("s"));
        assert_eq!(input.forward(), 0.0);
    }

    #[test]
    fn releasing_s_keeps_w_held() {
        let mut input = InputState::new();
        input.handle_key(&down("w"));
        input.handle_key(&up("s"));
        assert_eq!(input.forward(), 1.0);
    }

    #[test]
    fn latest_press_wins_while_both_held() {
        let mut input = InputState::new();
        input.handle_key(&down("w"));
        input.handle_key(&down("s"));
        assert_eq!(input.forward(), -1.0);

        input.handle_key(&up("s"));
        assert_eq!(input.forward(), 1.0);
    }

    #[test]
    fn auto_repeat_of_older_key_does_not_flip_axis() {
        let mut input = InputState::new();
        input.handle_key(&down("w"));
        input.handle_key(&down("s"));
        let repeat_w = KeyEvent {
            repeat: true,
            ..down("w")
        };
        assert!(input.handle_key(&repeat_w));
        assert_eq!(input.forward(), -1.0);

        input.handle_key(&up("s"));
        assert_eq!(input.forward(), 1.0);
    }

    #[test]
    fn auto_repeat_alone_still_holds_key() {
        let mut input = InputState::new();
        let repeat_d = KeyEvent {
            repeat: true,
            ..down("d")
        };
        input.handle_key(&repeat_d);
        assert_eq!(input.side(), 1.0);
    }

    #[test]
    fn strafe_keys_track_independently() {
        let mut input = InputState::new();
        input.handle_key(&down("a"));
        assert_eq!(input.side(), -1.0);
        input.handle_key(&down("d"));
        assert_eq!(input.side(), 1.0);
        input.handle_key(&up("d"));
        assert_eq!(input.side(), -1.0);
        input.handle_key(&up("a"));
        assert_eq!(input.side(), 0.0);
        assert_eq!(input.forward(), 0.0);
    }

    #[test]
    fn keypress_counts_as_holding() {
        let mut input = InputState::new();
        input.handle_key(&KeyEvent::character(KeyEventKind::KeyPress, "d"));
        assert_eq!(input.side(), 1.0);
    }

    #[test]
    fn unbound_keys_are_not_consumed() {
        let mut input = InputState::new();
        assert!(!input.handle_key(&down("f")));
        assert!(!input.handle_key(&up("Escape")));
        assert!(input.is_idle());
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut input = InputState::new();
        input.handle_key(&down("w"));
        input.handle_key(&down("a"));
        input.release_all();
        assert!(input.is_idle());
    }
}
