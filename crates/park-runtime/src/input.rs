//! Input events routed into a session

use park_core::Point;

/// Keys with a meaning for interactive objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
}

/// User input, in page coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove(Point),
    Click(Point),
    KeyDown(Key),
    KeyUp(Key),
}
