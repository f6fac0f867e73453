use std::time::Duration;

use smallvec::SmallVec;

use crate::MouseButton;

pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickTrackerConfig {
    /// Longest time between two presses of the same button, measured from
    /// press to press, that still counts as a double-click.
    pub double_click_window: Duration,
    /// Buttons that get a state record. Never contains duplicates.
    pub buttons: SmallVec<[MouseButton; 3]>,
}

impl Default for ClickTrackerConfig {
    fn default() -> Self {
        Self {
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
            buttons: SmallVec::from_buf(MouseButton::STANDARD),
        }
    }
}

impl ClickTrackerConfig {
    /// Uses the platform's double-click time where one is available.
    pub fn from_system() -> Self {
        let double_click_window;

        #[cfg(target_os = "windows")]
        {
            use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetDoubleClickTime;

            double_click_window = Duration::from_millis(unsafe { GetDoubleClickTime() } as u64);
        }

        #[cfg(not(target_os = "windows"))]
        {
            double_click_window = DEFAULT_DOUBLE_CLICK_WINDOW;
        }

        Self {
            double_click_window,
            ..Self::default()
        }
    }

    pub fn with_double_click_window(mut self, window: Duration) -> Self {
        self.double_click_window = window;
        self
    }

    /// Replaces the tracked set. Repeated buttons keep their first position.
    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = MouseButton>) -> Self {
        self.buttons.clear();

        for button in buttons {
            if !self.buttons.contains(&button) {
                self.buttons.push(button);
            }
        }

        self
    }
}
