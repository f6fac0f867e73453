use std::rc::Rc;
use std::time::Instant;

use tracing::debug;
use tracing::error;
use tracing::info;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::Key;
use winit::keyboard::NamedKey;
use winit::window::Window;
use winit::window::WindowId;

use click_tracker::ButtonEvent;
use click_tracker::ButtonEventDispatcher;
use click_tracker::ButtonEventKind;
use click_tracker::ClickPhase;
use click_tracker::ClickTracker;
use click_tracker::ClickTrackerConfig;
use click_tracker::MouseButton;

/// What the tracker reports right after an event was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickReport {
    pub button: MouseButton,
    pub pressed: bool,
    pub double_clicked: bool,
    pub phase: Option<ClickPhase>,
}

pub struct App {
    source: Rc<ButtonEventDispatcher>,
    tracker: ClickTracker<ButtonEventDispatcher>,
    window: Option<Window>,
}

impl App {
    pub fn new(config: ClickTrackerConfig) -> Self {
        let source = Rc::new(ButtonEventDispatcher::new());

        info!(
            window_ms = config.double_click_window.as_millis() as u64,
            buttons = ?config.buttons,
            "Tracking clicks"
        );

        Self {
            tracker: ClickTracker::with_config(source.clone(), config),
            source,
            window: None,
        }
    }

    /// Feeds one raw button event through the dispatcher and reads back the
    /// tracker's view of the button.
    pub fn handle_button(&self, event: ButtonEvent) -> ClickReport {
        self.source.dispatch(&event);

        ClickReport {
            button: event.button,
            pressed: self.tracker.pressed(event.button),
            double_clicked: self.tracker.double_clicked(event.button),
            phase: self.tracker.phase(event.button),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(Window::default_attributes().with_title("click probe")) {
            Ok(window) => self.window = Some(window),
            Err(error) => {
                error!(%error, "Unable to create window");
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _: &ActiveEventLoop) {
        self.tracker.reset();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let kind: ButtonEventKind = state.into();
                let report = self.handle_button(ButtonEvent {
                    kind,
                    button: button.into(),
                    timestamp: Instant::now(),
                });

                info!(
                    button = ?report.button,
                    ?kind,
                    pressed = report.pressed,
                    double_clicked = report.double_clicked,
                    phase = report.phase.map(ClickPhase::as_raw),
                    "Button event"
                );

                if kind.is_down() && report.double_clicked {
                    info!(button = ?report.button, "Double click");
                }
            }
            WindowEvent::Focused(false) => {
                debug!("Focus lost, resetting click state");
                self.tracker.reset();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.logical_key == Key::Named(NamedKey::Escape) && event.state.is_pressed() {
                    event_loop.exit();
                }
            }
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }
            _ => (),
        }
    }
}
