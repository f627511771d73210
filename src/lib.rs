pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod measure;
pub mod parser;
pub mod render;
pub mod theme;
pub mod timeline;
pub mod window;

#[cfg(feature = "cli")]
pub use cli::run;
pub use components::Container;
pub use config::{Config, RangeMode, TimelineConfig};
pub use error::TimelineError;
pub use ir::{Event, EventTime, Timestamp};
pub use layout::TimelineLayout;
pub use timeline::{Command, Hit, Notification, Timeline};

use measure::{ApproxMeasurer, CardMeasurer, CardStyle, FontMeasurer};
use parser::parse_events;
use render::render_svg;

/// Everything the one-call pipeline needs besides the event document.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    /// Wheel steps applied after the first frame; negative zooms in.
    pub zoom_steps: i32,
    /// Extra horizontal scroll, in pixels, applied last.
    pub pan: f64,
    /// Time to centre the viewport on. Without it the view starts at the
    /// earliest event.
    pub center: Option<Timestamp>,
    /// Centre of an empty timeline. Defaults to now.
    pub default_center: Option<Timestamp>,
    /// Measure cards with installed fonts instead of an average advance.
    pub font_metrics: bool,
}

/// Parses `input`, lays it out for the configured viewport and applies the
/// requested zoom and scroll.
pub fn build_timeline(input: &str, options: &RenderOptions) -> anyhow::Result<Timeline> {
    let events = parse_events(input)?;
    let config = &options.config;
    let container = Container::new(config.render.width, config.render.height);
    let style = CardStyle::new(&config.theme, &config.timeline.card);
    let measurer: Box<dyn CardMeasurer> = if options.font_metrics {
        Box::new(FontMeasurer::new(style, config.theme.font_family.clone()))
    } else {
        Box::new(ApproxMeasurer::new(style))
    };

    let mut timeline =
        Timeline::create(Some(container), events, config.timeline.clone())?.with_measurer(measurer);
    if let Some(center) = options.default_center {
        timeline = timeline.with_default_center(center);
    }
    timeline.frame();

    let direction = f64::from(options.zoom_steps.signum());
    for _ in 0..options.zoom_steps.unsigned_abs() {
        timeline.zoom(direction);
    }
    timeline.frame();

    let earliest = timeline
        .events()
        .iter()
        .map(|event| event.time.start())
        .min();
    let target = match (options.center, earliest) {
        (Some(center), _) => Some(timeline.x_for_time(center) - container.width / 2.0),
        (None, Some(first)) => {
            Some(timeline.x_for_time(first) - timeline.config().padding_start)
        }
        (None, None) => None,
    };
    let scroll = target.map_or(0.0, |target| target - timeline.pan_offset()) + options.pan;
    timeline.pan_move(scroll);
    timeline.frame();

    tracing::debug!(
        granularity = timeline.granularity_index(),
        pan = timeline.pan_offset(),
        "timeline ready"
    );
    Ok(timeline)
}

pub fn layout_timeline(input: &str, options: &RenderOptions) -> anyhow::Result<TimelineLayout> {
    Ok(build_timeline(input, options)?.layout())
}

pub fn render_timeline(input: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let layout = layout_timeline(input, options)?;
    Ok(render_svg(
        &layout,
        &options.config.theme,
        &options.config.timeline,
    ))
}
