// Pointer and keyboard tracking.
// Abstracts winit events into the small vocabulary the frame driver consumes:
// a drag lifecycle plus two app commands.

use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// One translated input occurrence, handed to the application loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(f32, f32),
    PointerMove(f32, f32),
    PointerUp(f32, f32),
    CycleShape,
    Quit,
}

/// Tracks the latest cursor position and whether a drag is in progress.
/// Written by the event loop, read by nothing else; the frame driver only
/// sees the translated `InputEvent`s.
pub struct InputTracker {
    cursor: (f32, f32),
    dragging: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            cursor: (0.0, 0.0),
            dragging: false,
        }
    }

    /// Feed a winit WindowEvent; returns the translated event, if any.
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor(position.x as f32, position.y as f32)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.on_button(*state == ElementState::Pressed),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Tab) => Some(InputEvent::CycleShape),
                    PhysicalKey::Code(KeyCode::Escape) => Some(InputEvent::Quit),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn on_cursor(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        self.cursor = (x, y);
        self.dragging.then_some(InputEvent::PointerMove(x, y))
    }

    fn on_button(&mut self, pressed: bool) -> Option<InputEvent> {
        let (x, y) = self.cursor;
        if pressed && !self.dragging {
            self.dragging = true;
            Some(InputEvent::PointerDown(x, y))
        } else if !pressed && self.dragging {
            self.dragging = false;
            Some(InputEvent::PointerUp(x, y))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_motion_outside_a_drag_is_silent() {
        let mut tracker = InputTracker::new();
        assert_eq!(tracker.on_cursor(10.0, 20.0), None);
    }

    #[test]
    fn drag_lifecycle_emits_down_move_up_at_the_cursor() {
        let mut tracker = InputTracker::new();
        tracker.on_cursor(100.0, 50.0);

        assert_eq!(tracker.on_button(true), Some(InputEvent::PointerDown(100.0, 50.0)));
        assert_eq!(tracker.on_cursor(120.0, 55.0), Some(InputEvent::PointerMove(120.0, 55.0)));
        assert_eq!(tracker.on_button(false), Some(InputEvent::PointerUp(120.0, 55.0)));
    }

    #[test]
    fn repeated_button_states_are_deduplicated() {
        let mut tracker = InputTracker::new();
        assert!(tracker.on_button(true).is_some());
        assert_eq!(tracker.on_button(true), None);
        assert!(tracker.on_button(false).is_some());
        assert_eq!(tracker.on_button(false), None);
    }
}
