use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;
use std::time::Duration;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::debug;
use tracing::trace;

use crate::ButtonEvent;
use crate::ButtonEventKind;
use crate::ButtonEventSource;
use crate::ButtonHandler;
use crate::ButtonState;
use crate::ClickPhase;
use crate::ClickTrackerConfig;
use crate::MouseButton;
use crate::SubscriberId;

/// State shared between a tracker and the handlers it registers.
#[derive(Debug)]
struct ClickState {
    double_click_window: Duration,
    last_button: Option<MouseButton>,
    buttons: SmallVec<[(MouseButton, ButtonState); 3]>,
}

impl ClickState {
    fn new(config: ClickTrackerConfig, now: Instant) -> Self {
        Self {
            double_click_window: config.double_click_window,
            last_button: None,
            buttons: config
                .buttons
                .into_iter()
                .map(|button| (button, ButtonState::new(now)))
                .collect(),
        }
    }

    fn get(&self, button: MouseButton) -> Option<&ButtonState> {
        self.buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, state)| state)
    }

    fn get_mut(&mut self, button: MouseButton) -> Option<&mut ButtonState> {
        self.buttons
            .iter_mut()
            .find(|(b, _)| *b == button)
            .map(|(_, state)| state)
    }

    fn on_button_down(&mut self, button: MouseButton, now: Instant) {
        self.last_button = Some(button);

        let window = self.double_click_window;
        let Some(state) = self.get_mut(button) else {
            trace!(?button, "Ignoring press of untracked button");
            return;
        };

        let previous = state.phase();
        if previous.is_pressed() {
            debug!(?button, ?previous, "Button pressed while already down");
        }

        let phase = state.on_down(now, window);
        trace!(?button, ?previous, ?phase, "Button down");
    }

    fn on_button_up(&mut self, button: MouseButton) {
        let Some(state) = self.get_mut(button) else {
            return;
        };

        let previous = state.phase();
        let phase = state.on_up();

        if previous == phase {
            trace!(?button, ?phase, "Ignoring release without matching press");
        } else {
            trace!(?button, ?previous, ?phase, "Button up");
        }
    }

    fn double_clicked(&self, button: MouseButton) -> bool {
        self.last_button == Some(button)
            && self.get(button).is_some_and(|state| state.phase().is_double())
    }
}

/// Turns a stream of button down/up notifications into per-button pressed and
/// double-click state.
///
/// The tracker subscribes itself to the source on construction and
/// unsubscribes when disposed or dropped. Double-click status is only reported
/// for the most recently pressed button, and a released double-click stays
/// visible until that button is pressed again.
///
/// ```
/// use std::rc::Rc;
/// use std::time::{Duration, Instant};
///
/// use click_tracker::{ButtonEvent, ButtonEventDispatcher, ClickTracker, MouseButton};
///
/// let source = Rc::new(ButtonEventDispatcher::new());
/// let tracker = ClickTracker::new(source.clone());
///
/// let t0 = Instant::now();
/// source.dispatch(&ButtonEvent::down(MouseButton::Left, t0));
/// source.dispatch(&ButtonEvent::up(MouseButton::Left, t0 + Duration::from_millis(10)));
/// source.dispatch(&ButtonEvent::down(MouseButton::Left, t0 + Duration::from_millis(100)));
///
/// assert!(tracker.left_pressed());
/// assert!(tracker.left_double_clicked());
/// ```
pub struct ClickTracker<S: ButtonEventSource + ?Sized> {
    id: SubscriberId,
    source: Rc<S>,
    state: Rc<RefCell<ClickState>>,
}

impl<S: ButtonEventSource + ?Sized> ClickTracker<S> {
    pub fn new(source: Rc<S>) -> Self {
        Self::with_config(source, ClickTrackerConfig::default())
    }

    pub fn with_config(source: Rc<S>, config: ClickTrackerConfig) -> Self {
        let id = SubscriberId::next();
        let state = Rc::new(RefCell::new(ClickState::new(config, Instant::now())));

        source.subscribe(
            ButtonEventKind::Down,
            id,
            handler(&state, |state, event| {
                state.on_button_down(event.button, event.timestamp);
            }),
        );
        source.subscribe(
            ButtonEventKind::Up,
            id,
            handler(&state, |state, event| state.on_button_up(event.button)),
        );

        debug!(subscriber = id.get(), "Click tracker subscribed");

        Self { id, source, state }
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    /// Records a press. Normally called by the source through the subscribed
    /// handler.
    pub fn on_button_down(&self, button: MouseButton, timestamp: Instant) {
        self.state.borrow_mut().on_button_down(button, timestamp);
    }

    /// Records a release. The timestamp is accepted for symmetry; releases do
    /// not affect timing.
    pub fn on_button_up(&self, button: MouseButton, _timestamp: Instant) {
        self.state.borrow_mut().on_button_up(button);
    }

    /// Whether `button` is currently held. `false` for untracked buttons.
    pub fn pressed(&self, button: MouseButton) -> bool {
        self.phase(button).is_some_and(ClickPhase::is_pressed)
    }

    /// Whether `button` was the last button pressed and its current or most
    /// recent press completed a double-click. `false` for untracked buttons.
    pub fn double_clicked(&self, button: MouseButton) -> bool {
        self.state.borrow().double_clicked(button)
    }

    pub fn left_pressed(&self) -> bool {
        self.pressed(MouseButton::Left)
    }

    pub fn right_pressed(&self) -> bool {
        self.pressed(MouseButton::Right)
    }

    pub fn middle_pressed(&self) -> bool {
        self.pressed(MouseButton::Middle)
    }

    pub fn left_double_clicked(&self) -> bool {
        self.double_clicked(MouseButton::Left)
    }

    pub fn right_double_clicked(&self) -> bool {
        self.double_clicked(MouseButton::Right)
    }

    pub fn middle_double_clicked(&self) -> bool {
        self.double_clicked(MouseButton::Middle)
    }

    /// The button of the most recent down event, tracked or not.
    pub fn last_button(&self) -> Option<MouseButton> {
        self.state.borrow().last_button
    }

    /// `None` for untracked buttons.
    pub fn phase(&self, button: MouseButton) -> Option<ClickPhase> {
        self.state.borrow().get(button).map(ButtonState::phase)
    }

    pub fn tracks(&self, button: MouseButton) -> bool {
        self.state.borrow().get(button).is_some()
    }

    pub fn buttons(&self) -> SmallVec<[MouseButton; 3]> {
        self.state.borrow().buttons.iter().map(|(b, _)| *b).collect()
    }

    pub fn double_click_window(&self) -> Duration {
        self.state.borrow().double_click_window
    }

    /// Not validated; a zero window only pairs presses with identical
    /// timestamps.
    pub fn set_double_click_window(&self, window: Duration) {
        self.state.borrow_mut().double_click_window = window;
    }

    /// Forgets all in-flight click sequences, e.g. when the window loses
    /// focus and releases may never arrive.
    pub fn reset(&self) {
        let now = Instant::now();
        let mut state = self.state.borrow_mut();

        state.last_button = None;
        for (_, button) in &mut state.buttons {
            button.reset(now);
        }
    }

    /// Unsubscribes from the source. Equivalent to dropping the tracker.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<S: ButtonEventSource + ?Sized> Drop for ClickTracker<S> {
    fn drop(&mut self) {
        self.source.unsubscribe(ButtonEventKind::Up, self.id);
        self.source.unsubscribe(ButtonEventKind::Down, self.id);

        debug!(subscriber = self.id.get(), "Click tracker disposed");
    }
}

impl<S: ButtonEventSource + ?Sized> std::fmt::Debug for ClickTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickTracker")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn handler(
    state: &Rc<RefCell<ClickState>>,
    apply: impl Fn(&mut ClickState, &ButtonEvent) + 'static,
) -> ButtonHandler {
    let state: Weak<RefCell<ClickState>> = Rc::downgrade(state);

    Rc::new(move |event: &ButtonEvent| {
        if let Some(state) = state.upgrade() {
            apply(&mut state.borrow_mut(), event);
        }
    })
}
