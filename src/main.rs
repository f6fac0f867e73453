use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use winit::error::EventLoopError;
use winit::event_loop::ControlFlow;
use winit::event_loop::EventLoop;

use click_tracker::ClickTrackerConfig;

use crate::app::App;

mod app;

#[cfg(feature = "profile")]
#[derive(Default)]
struct TracyConfig(tracing_subscriber::fmt::format::DefaultFields);

#[cfg(feature = "profile")]
impl tracing_tracy::Config for TracyConfig {
    type Formatter = tracing_subscriber::fmt::format::DefaultFields;

    fn formatter(&self) -> &Self::Formatter {
        &self.0
    }

    fn stack_depth(&self, _: &tracing::metadata::Metadata<'_>) -> u16 {
        10
    }
}

fn main() -> Result<(), EventLoopError> {
    color_backtrace::install();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().ok();
    let def_filter = env_filter.is_none().then(|| {
        tracing_subscriber::filter::Targets::new()
            .with_default(Level::DEBUG)
            .with_targets([("winit", Level::WARN), ("calloop", Level::WARN)])
    });

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(env_filter)
        .with(def_filter);

    #[cfg(feature = "profile")]
    let registry = registry.with(tracing_tracy::TracyLayer::new(TracyConfig::default()));

    registry.init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(ClickTrackerConfig::from_system());
    event_loop.run_app(&mut app)
}
