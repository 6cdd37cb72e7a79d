use bitflags::bitflags;

use crate::surface::window::SurfaceId;

#[derive(Debug, Clone, PartialEq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

bitflags! {
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const META    = 0b1000;
    }
}

/// Input event in document space, as delivered by the host window system.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove { x: f64, y: f64, modifiers: Modifiers },
    MouseDown { button: MouseButton, x: f64, y: f64, modifiers: Modifiers },
    MouseUp { button: MouseButton, x: f64, y: f64, modifiers: Modifiers },
    Scroll { dx: f64, dy: f64 },
    KeyDown { key: String, modifiers: Modifiers },
    KeyUp { key: String, modifiers: Modifiers },
    InputChar { character: char },
}

impl InputEvent {
    /// Document-space position for pointer events, `None` otherwise.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            InputEvent::MouseMove { x, y, .. }
            | InputEvent::MouseDown { x, y, .. }
            | InputEvent::MouseUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }

    /// Same event with its position rewritten into another space.
    pub(crate) fn with_position(self, new_x: f64, new_y: f64) -> Self {
        match self {
            InputEvent::MouseMove { modifiers, .. } => InputEvent::MouseMove {
                x: new_x,
                y: new_y,
                modifiers,
            },
            InputEvent::MouseDown {
                button, modifiers, ..
            } => InputEvent::MouseDown {
                button,
                x: new_x,
                y: new_y,
                modifiers,
            },
            InputEvent::MouseUp {
                button, modifiers, ..
            } => InputEvent::MouseUp {
                button,
                x: new_x,
                y: new_y,
                modifiers,
            },
            other => other,
        }
    }
}

/// A pointer event routed to an embedded child, with coordinates rewritten
/// into the child's local surface space.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedInput {
    pub surface: SurfaceId,
    pub event: InputEvent,
}
