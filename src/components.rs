//! Redraw components and the state they share.
//!
//! A timeline holds its components in an ordered list. Every redraw pass
//! calls them in order; each one recomputes whatever its dirty flags ask
//! for and reports whether it changed shared geometry, which schedules
//! another pass.

use std::ops::Range;

use crate::cache::ItemCache;
use crate::config::{RangeMode, TimelineConfig};
use crate::controller::ZoomPanController;
use crate::ir::{Event, Timestamp};
use crate::layout::{
    AxisGeometry, AxisTick, Granularity, InteractiveOptions, PointLayout, RangeOptions,
    StackingOptions, TimeRange, axis_total_width, build_axis, calculate_interactive_range,
    calculate_time_range, generate_ticks, position_for_time, stack_items, tick_capacity,
    tick_count, time_for_position, visible_tick_range, width_for_range,
};
use crate::measure::CardMeasurer;
use crate::window::{WindowLimits, apply_limits};

/// Size of the host element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// What the next redraw pass has to recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dirty {
    pub range: bool,
    pub ticks: bool,
    pub axis: bool,
    pub viewport: bool,
    pub positions: bool,
    pub stacking: bool,
}

impl Dirty {
    pub fn all() -> Self {
        Self {
            range: true,
            ticks: true,
            axis: true,
            viewport: true,
            positions: true,
            stacking: true,
        }
    }
}

/// Requests recorded while commands are applied and resolved once the range
/// and ticks are current.
#[derive(Debug, Clone, Default)]
pub struct Pending {
    /// Keep this time under the viewport centre.
    pub anchor: Option<Timestamp>,
    /// Show exactly this window.
    pub window: Option<TimeRange>,
}

/// State of one timeline instance.
pub struct Body {
    pub config: TimelineConfig,
    pub container: Container,
    pub events: Vec<Event>,
    pub controller: ZoomPanController,
    pub limits: WindowLimits,
    pub default_center: Timestamp,
    pub range: TimeRange,
    pub tick_count: usize,
    /// Axis entries for `visible_ticks` only.
    pub axis: Vec<AxisTick>,
    pub visible_ticks: Range<usize>,
    pub content_width: f64,
    pub points: Vec<PointLayout>,
    pub cache: ItemCache,
    pub measurer: Option<Box<dyn CardMeasurer>>,
    pub hovered: Option<String>,
    pub selected: Option<String>,
    pub dirty: Dirty,
    pub pending: Pending,
}

impl Body {
    pub fn granularity(&self) -> &Granularity {
        // The table is checked to be non-empty when the timeline is created.
        &self.config.granularities[self.controller.index()]
    }

    pub fn geometry(&self) -> AxisGeometry {
        self.config.geometry(self.granularity())
    }

    /// Height available to cards, below the axis band.
    pub fn content_height(&self) -> f64 {
        (self.container.height - self.config.axis_height).max(0.0)
    }

    pub fn compute_range(&self) -> TimeRange {
        let coarsest = self.config.granularities.last();
        match (self.config.range_mode, coarsest) {
            (RangeMode::Interactive, Some(coarsest)) => calculate_interactive_range(
                &self.events,
                self.container.width,
                coarsest,
                &InteractiveOptions {
                    pad_days: self.config.interactive_pad_days,
                    tick_width: self.config.tick_width,
                    default_center: self.default_center,
                },
            ),
            _ => calculate_time_range(
                &self.events,
                &RangeOptions {
                    padding_minutes: self.config.padding_minutes,
                    min_range_minutes: self.config.min_range_minutes,
                    default_center: self.default_center,
                },
            ),
        }
    }

    /// Content x of the tick line that `time` would fall on.
    pub fn tick_x(&self, time: Timestamp) -> f64 {
        let geometry = self.geometry();
        position_for_time(time, self.range.start, self.granularity().interval_ms(), &geometry)
            + geometry.point_size / 2.0
    }

    pub fn time_at(&self, x: f64) -> Timestamp {
        time_for_position(
            x,
            self.range.start,
            self.granularity().interval_ms(),
            &self.geometry(),
        )
    }

    /// The window currently on screen.
    pub fn visible_window(&self) -> TimeRange {
        let pan = self.controller.pan_offset();
        TimeRange::new(self.time_at(pan), self.time_at(pan + self.container.width))
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn event_color(&self, event: &Event) -> String {
        event
            .color
            .clone()
            .unwrap_or_else(|| self.config.default_color.clone())
    }

    /// Finest granularity whose viewport holds `duration_ms`, or the coarsest.
    fn granularity_for(&self, duration_ms: i64) -> usize {
        let width = self.container.width;
        self.config
            .granularities
            .iter()
            .position(|granularity| {
                let capacity = tick_capacity(width, granularity, &self.config.geometry(granularity));
                (capacity as i64).saturating_mul(granularity.interval_ms()) >= duration_ms
            })
            .unwrap_or(self.config.granularities.len().saturating_sub(1))
    }
}

pub trait Component {
    fn name(&self) -> &'static str;

    /// Recomputes this component's share of the geometry. Returns `true`
    /// when anything changed, which asks for another pass.
    fn redraw(&mut self, body: &mut Body) -> bool;

    fn destroy(&mut self, body: &mut Body);
}

/// Owns the time range, the tick count and explicit window requests.
#[derive(Debug, Default)]
pub struct RangeComponent;

impl RangeComponent {
    fn show_window(&self, body: &mut Body, requested: TimeRange) -> bool {
        let current = body.visible_window();
        let (window, _) = apply_limits(&current, &requested, &body.limits);
        let index = body.granularity_for(window.duration_ms());
        let mut changed = false;
        if body.controller.set_index(index) {
            body.dirty.ticks = true;
            body.dirty.positions = true;
            body.dirty.stacking = true;
            changed = true;
        }
        let pan = body.tick_x(window.start);
        if pan != body.controller.pan_offset() {
            body.controller.set_pan_offset(pan);
            body.dirty.viewport = true;
            changed = true;
        }
        tracing::debug!(
            start = %window.start,
            end = %window.end,
            granularity = %body.granularity().label(),
            "showing window"
        );
        changed
    }
}

impl Component for RangeComponent {
    fn name(&self) -> &'static str {
        "range"
    }

    fn redraw(&mut self, body: &mut Body) -> bool {
        let mut changed = false;
        if body.dirty.range {
            body.dirty.range = false;
            let range = body.compute_range();
            if range != body.range {
                body.range = range;
                body.dirty.ticks = true;
                body.dirty.positions = true;
                changed = true;
            }
        }
        if let Some(window) = body.pending.window.take() {
            changed |= self.show_window(body, window);
        }
        if body.dirty.ticks {
            body.dirty.ticks = false;
            body.tick_count = tick_count(&body.range, body.granularity());
            body.dirty.axis = true;
            changed = true;
        }
        if let Some(anchor) = body.pending.anchor.take() {
            let pan = body.tick_x(anchor) - body.container.width / 2.0;
            if pan != body.controller.pan_offset() {
                body.controller.set_pan_offset(pan);
                body.dirty.viewport = true;
                changed = true;
            }
        }
        changed
    }

    fn destroy(&mut self, body: &mut Body) {
        body.tick_count = 0;
        body.pending = Pending::default();
    }
}

/// Tracks which ticks are on screen and labels just those.
#[derive(Debug, Default)]
pub struct AxisComponent;

impl Component for AxisComponent {
    fn name(&self) -> &'static str {
        "axis"
    }

    fn redraw(&mut self, body: &mut Body) -> bool {
        let mut changed = false;
        let mut rebuild = false;
        let geometry = body.geometry();
        if body.dirty.axis {
            body.dirty.axis = false;
            body.content_width = axis_total_width(body.tick_count, &geometry);
            body.dirty.viewport = true;
            rebuild = true;
            changed = true;
        }
        if body.dirty.viewport {
            body.dirty.viewport = false;
            let visible = visible_tick_range(
                body.tick_count,
                &geometry,
                body.controller.pan_offset(),
                body.container.width,
                body.config.tick_overscan,
            );
            if visible != body.visible_ticks {
                body.visible_ticks = visible;
                rebuild = true;
                changed = true;
            }
        }
        if rebuild {
            let ticks = generate_ticks(&body.range, body.granularity(), body.visible_ticks.clone());
            body.axis = build_axis(&ticks, body.visible_ticks.start, body.granularity(), &geometry);
        }
        changed
    }

    fn destroy(&mut self, body: &mut Body) {
        body.axis.clear();
        body.visible_ticks = 0..0;
        body.content_width = 0.0;
    }
}

/// Event points, card measurement and vertical stacking.
#[derive(Debug, Default)]
pub struct ItemsComponent;

impl ItemsComponent {
    fn compute_points(body: &Body) -> Vec<PointLayout> {
        let geometry = body.geometry();
        let interval = body.granularity().interval_ms();
        body.events
            .iter()
            .map(|event| {
                let start = event.time.start();
                let width = event
                    .time
                    .is_span()
                    .then(|| width_for_range(start, event.time.end(), interval, &geometry));
                PointLayout {
                    id: event.id.clone(),
                    x: position_for_time(start, body.range.start, interval, &geometry),
                    width,
                    color: body.event_color(event),
                    hovered: false,
                    selected: false,
                }
            })
            .collect()
    }
}

impl Component for ItemsComponent {
    fn name(&self) -> &'static str {
        "items"
    }

    fn redraw(&mut self, body: &mut Body) -> bool {
        let mut changed = false;
        if body.dirty.positions {
            body.dirty.positions = false;
            body.points = Self::compute_points(body);
            changed = true;
        }

        if let Some(measurer) = body.measurer.as_mut() {
            for event in &body.events {
                if body.cache.contains(&event.id) {
                    continue;
                }
                let size = measurer.measure_card(&event.title, &event.time.label());
                if body.cache.measure(&event.id, size.width, size.height) {
                    body.dirty.stacking = true;
                }
            }
        }

        let offset = body.config.card_offset_x;
        for point in &body.points {
            body.cache.set_x(&point.id, point.x + offset);
        }

        if body.dirty.stacking {
            body.dirty.stacking = false;
            let options = StackingOptions {
                container_height: body.content_height(),
                margin_top: body.config.card_margin_top,
                row_gap: body.config.row_gap,
            };
            if stack_items(body.cache.items_mut(), &options) {
                changed = true;
            }
        }
        changed
    }

    fn destroy(&mut self, body: &mut Body) {
        body.points.clear();
        body.cache.clear();
    }
}

/// The standard component list, in redraw order.
pub fn default_components() -> Vec<Box<dyn Component>> {
    vec![
        Box::new(RangeComponent),
        Box::new(AxisComponent),
        Box::new(ItemsComponent),
    ]
}
