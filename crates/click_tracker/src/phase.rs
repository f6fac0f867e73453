//! Per-button click state machine.
//!
//! The sign of a phase says whether the button is held (positive) or released
//! (negative); the magnitude says whether the current or most recently
//! completed press sequence was a single or a double click. A released phase
//! keeps its meaning until the next down event for the same button, so a
//! double-click stays observable for as many frames as the consumer needs.

use std::time::Duration;
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClickPhase {
    /// Never pressed, or reset.
    #[default]
    Idle,
    /// Held after a first press.
    DownSingle,
    /// Held after a second press that landed inside the double-click window.
    DownDouble,
    /// Released after a single press.
    UpSingle,
    /// Released after a double-click.
    UpDouble,
}

impl ClickPhase {
    /// The signed encoding: `0`, `1`, `2`, `-1`, `-2`.
    pub fn as_raw(self) -> i8 {
        match self {
            ClickPhase::Idle => 0,
            ClickPhase::DownSingle => 1,
            ClickPhase::DownDouble => 2,
            ClickPhase::UpSingle => -1,
            ClickPhase::UpDouble => -2,
        }
    }

    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(ClickPhase::Idle),
            1 => Some(ClickPhase::DownSingle),
            2 => Some(ClickPhase::DownDouble),
            -1 => Some(ClickPhase::UpSingle),
            -2 => Some(ClickPhase::UpDouble),
            _ => None,
        }
    }

    pub fn is_pressed(self) -> bool {
        self.as_raw() > 0
    }

    pub fn is_double(self) -> bool {
        matches!(self, ClickPhase::DownDouble | ClickPhase::UpDouble)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonState {
    phase: ClickPhase,
    last_click: Instant,
}

impl ButtonState {
    pub fn new(now: Instant) -> Self {
        Self {
            phase: ClickPhase::Idle,
            last_click: now,
        }
    }

    pub fn phase(&self) -> ClickPhase {
        self.phase
    }

    /// Time of the most recent press that started a new click sequence.
    pub fn last_click(&self) -> Instant {
        self.last_click
    }

    /// Applies a down event and returns the new phase.
    ///
    /// Only a press following a released single click can become a
    /// double-click; every other press starts a new sequence and restamps
    /// `last_click`.
    pub fn on_down(&mut self, now: Instant, window: Duration) -> ClickPhase {
        self.phase = match self.phase {
            ClickPhase::UpSingle if !window_expired(self.last_click, window, now) => {
                ClickPhase::DownDouble
            }
            _ => {
                self.last_click = now;
                ClickPhase::DownSingle
            }
        };

        self.phase
    }

    /// Applies an up event and returns the new phase. Ups on a released or
    /// idle button change nothing.
    pub fn on_up(&mut self) -> ClickPhase {
        self.phase = match self.phase {
            ClickPhase::DownSingle => ClickPhase::UpSingle,
            ClickPhase::DownDouble => ClickPhase::UpDouble,
            phase => phase,
        };

        self.phase
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}

/// `last_click + window` strictly before `now`. A window too large to add to
/// `last_click` never expires.
fn window_expired(last_click: Instant, window: Duration, now: Instant) -> bool {
    match last_click.checked_add(window) {
        Some(deadline) => deadline < now,
        None => false,
    }
}
