//! Mouse button edge detection.
//!
//! The host reports the full (primary, secondary, middle) state on every
//! call; only changes turn into interactor events.

use crate::toolkit::InteractorEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

impl From<bool> for ButtonState {
    fn from(down: bool) -> Self {
        if down {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Press,
    Release,
}

/// Edge produced by moving from `old` to `new`; `None` when nothing changed.
pub fn transition(old: ButtonState, new: ButtonState) -> Option<ButtonEdge> {
    match (old, new) {
        (ButtonState::Released, ButtonState::Pressed) => Some(ButtonEdge::Press),
        (ButtonState::Pressed, ButtonState::Released) => Some(ButtonEdge::Release),
        _ => None,
    }
}

impl MouseButton {
    pub fn event(self, edge: ButtonEdge) -> InteractorEvent {
        match (self, edge) {
            (MouseButton::Left, ButtonEdge::Press) => InteractorEvent::LeftButtonPress,
            (MouseButton::Left, ButtonEdge::Release) => InteractorEvent::LeftButtonRelease,
            (MouseButton::Right, ButtonEdge::Press) => InteractorEvent::RightButtonPress,
            (MouseButton::Right, ButtonEdge::Release) => InteractorEvent::RightButtonRelease,
            (MouseButton::Middle, ButtonEdge::Press) => InteractorEvent::MiddleButtonPress,
            (MouseButton::Middle, ButtonEdge::Release) => InteractorEvent::MiddleButtonRelease,
        }
    }
}

/// Last known state of the three tracked buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    left: ButtonState,
    right: ButtonState,
    middle: ButtonState,
}

impl MouseButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, button: MouseButton) -> ButtonState {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    /// Records the host's button state and returns the events to raise, in
    /// left, right, middle order. Primary maps to left, secondary to right.
    pub fn update(&mut self, primary: bool, secondary: bool, middle: bool) -> Vec<InteractorEvent> {
        let mut events = Vec::new();
        for (button, slot, down) in [
            (MouseButton::Left, &mut self.left, primary),
            (MouseButton::Right, &mut self.right, secondary),
            (MouseButton::Middle, &mut self.middle, middle),
        ] {
            let new_state = ButtonState::from(down);
            if let Some(edge) = transition(*slot, new_state) {
                events.push(button.event(edge));
            }
            *slot = new_state;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InteractorEvent::*;

    #[test]
    fn transition_table() {
        use ButtonState::*;
        assert_eq!(transition(Released, Pressed), Some(ButtonEdge::Press));
        assert_eq!(transition(Pressed, Released), Some(ButtonEdge::Release));
        assert_eq!(transition(Pressed, Pressed), None);
        assert_eq!(transition(Released, Released), None);
    }

    #[test]
    fn repeated_identical_state_is_silent() {
        let mut buttons = MouseButtons::new();
        assert_eq!(buttons.update(true, false, false), vec![LeftButtonPress]);
        assert!(buttons.update(true, false, false).is_empty());
        assert!(buttons.update(true, false, false).is_empty());
        assert_eq!(buttons.state(MouseButton::Left), ButtonState::Pressed);
    }

    #[test]
    fn buttons_are_independent() {
        let mut buttons = MouseButtons::new();
        assert_eq!(
            buttons.update(true, true, true),
            vec![LeftButtonPress, RightButtonPress, MiddleButtonPress]
        );
        assert_eq!(buttons.update(true, false, true), vec![RightButtonRelease]);
        assert_eq!(
            buttons.update(false, true, false),
            vec![LeftButtonRelease, RightButtonPress, MiddleButtonRelease]
        );
    }

    #[test]
    fn initial_release_produces_nothing() {
        let mut buttons = MouseButtons::new();
        assert!(buttons.update(false, false, false).is_empty());
    }

    #[test]
    fn event_count_follows_transitions_not_calls() {
        let sequence = [
            false, true, true, false, false, true, false, true, true, true, false,
        ];
        let mut buttons = MouseButtons::new();
        let mut presses = 0;
        let mut releases = 0;
        for down in sequence {
            for event in buttons.update(false, false, down) {
                match event {
                    MiddleButtonPress => presses += 1,
                    MiddleButtonRelease => releases += 1,
                    other => panic!("unexpected {:?}", other),
                }
            }
        }

        let mut expected_presses = 0;
        let mut expected_releases = 0;
        let mut previous = false;
        for down in sequence {
            match (previous, down) {
                (false, true) => expected_presses += 1,
                (true, false) => expected_releases += 1,
                _ => {}
            }
            previous = down;
        }
        assert_eq!((presses, releases), (expected_presses, expected_releases));
        assert_eq!((presses, releases), (3, 3));
    }
}
