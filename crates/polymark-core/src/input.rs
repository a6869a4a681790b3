//! Pointer and keyboard events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Raw pointer event; `position` is in display pixels relative to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Which pointer callback an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
}

impl PointerEvent {
    /// Left-button press at `position`.
    pub fn down(position: impl Into<Point>) -> Self {
        Self::Down {
            position: position.into(),
            button: MouseButton::Left,
        }
    }

    /// Left-button release at `position`.
    pub fn up(position: impl Into<Point>) -> Self {
        Self::Up {
            position: position.into(),
            button: MouseButton::Left,
        }
    }

    pub fn moved(position: impl Into<Point>) -> Self {
        Self::Move {
            position: position.into(),
        }
    }

    pub fn kind(&self) -> PointerEventKind {
        match self {
            Self::Down { .. } => PointerEventKind::Down,
            Self::Up { .. } => PointerEventKind::Up,
            Self::Move { .. } => PointerEventKind::Move,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. } | Self::Up { position, .. } | Self::Move { position } => {
                *position
            }
        }
    }

    /// Button involved, if any. Moves carry no button.
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            Self::Down { button, .. } | Self::Up { button, .. } => Some(*button),
            Self::Move { .. } => None,
        }
    }

    /// Whether this is a primary-button press/release or a move.
    pub fn is_primary(&self) -> bool {
        matches!(self.button(), None | Some(MouseButton::Left))
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Any event the host forwards to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl From<PointerEvent> for SurfaceEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<KeyEvent> for SurfaceEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}
