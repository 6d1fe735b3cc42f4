use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

/// A keyboard shortcut the viewer acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Recenter,
    Quit,
    None,
}

/// Pointer state tracked between events: cursor position and which
/// buttons are held, so drags can be turned into orbit/pan deltas.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    cursor: Option<(f32, f32)>,
    pub rotate_held: bool,
    pub pan_held: bool,
}

impl InputState {
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    /// Record a cursor move and return the delta from the previous
    /// position in pixels.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> (f32, f32) {
        let delta = match self.cursor {
            Some((last_x, last_y)) => (x - last_x, y - last_y),
            None => (0.0, 0.0),
        };
        self.cursor = Some((x, y));
        delta
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
        self.rotate_held = false;
        self.pan_held = false;
    }

    pub fn handle_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.rotate_held = pressed,
            MouseButton::Right => self.pan_held = pressed,
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: PhysicalKey) -> InputAction {
        match key {
            PhysicalKey::Code(KeyCode::KeyF) => InputAction::Recenter,
            PhysicalKey::Code(KeyCode::Escape) => InputAction::Quit,
            _ => InputAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_delta_is_relative_to_last_position() {
        let mut input = InputState::default();
        assert_eq!(input.cursor_moved(100.0, 50.0), (0.0, 0.0));
        assert_eq!(input.cursor_moved(110.0, 46.0), (10.0, -4.0));
        input.cursor_left();
        assert_eq!(input.cursor_moved(200.0, 200.0), (0.0, 0.0));
    }

    #[test]
    fn recenter_key_maps_to_its_action() {
        let mut input = InputState::default();
        assert_eq!(
            input.handle_key(PhysicalKey::Code(KeyCode::KeyF)),
            InputAction::Recenter
        );
        assert_eq!(
            input.handle_key(PhysicalKey::Code(KeyCode::KeyW)),
            InputAction::None
        );
    }
}
