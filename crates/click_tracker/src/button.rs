use std::time::Instant;

/// Identity of a physical pointer button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// The buttons a tracker watches unless configured otherwise.
    pub const STANDARD: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];
}

#[cfg(feature = "winit")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(value: winit::event::MouseButton) -> Self {
        match value {
            winit::event::MouseButton::Left => Self::Left,
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            winit::event::MouseButton::Back => Self::Back,
            winit::event::MouseButton::Forward => Self::Forward,
            winit::event::MouseButton::Other(id) => Self::Other(id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonEventKind {
    Down,
    Up,
}

impl ButtonEventKind {
    pub fn is_down(&self) -> bool {
        matches!(self, ButtonEventKind::Down)
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ButtonEventKind::Up)
    }
}

#[cfg(feature = "winit")]
impl From<winit::event::ElementState> for ButtonEventKind {
    fn from(value: winit::event::ElementState) -> Self {
        match value {
            winit::event::ElementState::Pressed => Self::Down,
            winit::event::ElementState::Released => Self::Up,
        }
    }
}

/// A button transition as delivered by an event source.
///
/// `timestamp` is the "now" used for double-click timing. Producers may
/// forward a device timestamp or sample [`Instant::now`] on receipt, as long
/// as they do it consistently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonEvent {
    pub kind: ButtonEventKind,
    pub button: MouseButton,
    pub timestamp: Instant,
}

impl ButtonEvent {
    pub fn down(button: MouseButton, timestamp: Instant) -> Self {
        Self {
            kind: ButtonEventKind::Down,
            button,
            timestamp,
        }
    }

    pub fn up(button: MouseButton, timestamp: Instant) -> Self {
        Self {
            kind: ButtonEventKind::Up,
            button,
            timestamp,
        }
    }
}
