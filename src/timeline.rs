use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Local;
use serde::Serialize;

use crate::cache::ItemCache;
use crate::components::{Body, Component, Container, Dirty, Pending, default_components};
use crate::config::TimelineConfig;
use crate::controller::ZoomPanController;
use crate::error::{Result, TimelineError};
use crate::ir::{Event, Timestamp, validate_events};
use crate::layout::{CardLayout, PointLayout, TimeRange, TimelineLayout};
use crate::measure::CardMeasurer;
use crate::window::WindowLimits;

/// Input to a timeline. Commands queue up and are applied by the next
/// [`Timeline::frame`], in the order they were pushed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// One wheel step; the sign picks the direction.
    Zoom { delta_y: f64 },
    /// Drag movement in pixels.
    PanMove { dx: f64 },
    Resize { width: f64, height: f64 },
    /// A card's rendered size, reported by the host.
    Measure { key: String, width: f64, height: f64 },
    SetEvents(Vec<Event>),
    Hover(Option<String>),
    /// Selecting the selected id again clears the selection.
    Select(String),
    ShowRange { start: Timestamp, end: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    RangeChanged { range: TimeRange },
    GranularityChanged { index: usize, label: String },
    LayoutChanged,
    HoverChanged { id: Option<String> },
    SelectionChanged { id: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub commands: usize,
    pub passes: usize,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Card(String),
    Point(String),
}

impl Hit {
    pub fn id(&self) -> &str {
        match self {
            Self::Card(id) | Self::Point(id) => id,
        }
    }
}

type Observer = Box<dyn FnMut(&Notification)>;

pub struct Timeline {
    body: Body,
    components: Vec<Box<dyn Component>>,
    queue: VecDeque<Command>,
    observers: Vec<Observer>,
}

impl Timeline {
    /// Builds a timeline for `container`. Fails when no container is given,
    /// the granularity table is unusable, or the events are malformed.
    ///
    /// Nothing is laid out until the first [`Timeline::frame`].
    pub fn create(
        container: Option<Container>,
        events: Vec<Event>,
        config: TimelineConfig,
    ) -> Result<Self> {
        let container = container.ok_or(TimelineError::MissingContainer)?;
        config.validate()?;
        validate_events(&events)?;

        let controller = ZoomPanController::new(
            config.granularities.len(),
            config.default_granularity,
            config.zoomable,
            config.moveable,
        );
        let default_center = Local::now().naive_local();
        let mut body = Body {
            config,
            container,
            events,
            controller,
            limits: WindowLimits::default(),
            default_center,
            range: TimeRange::new(default_center, default_center),
            tick_count: 0,
            axis: Vec::new(),
            visible_ticks: 0..0,
            content_width: 0.0,
            points: Vec::new(),
            cache: ItemCache::new(),
            measurer: None,
            hovered: None,
            selected: None,
            dirty: Dirty::all(),
            pending: Pending::default(),
        };
        body.range = body.compute_range();
        tracing::debug!(
            events = body.events.len(),
            width = container.width,
            height = container.height,
            "timeline created"
        );
        Ok(Self {
            body,
            components: default_components(),
            queue: VecDeque::new(),
            observers: Vec::new(),
        })
    }

    /// Measures unmeasured cards with `measurer` during redraw.
    pub fn with_measurer(mut self, measurer: Box<dyn CardMeasurer>) -> Self {
        self.body.measurer = Some(measurer);
        self
    }

    /// Centre used when there are no events. Defaults to the local time at
    /// creation.
    pub fn with_default_center(mut self, center: Timestamp) -> Self {
        self.body.default_center = center;
        self.body.range = self.body.compute_range();
        self.body.dirty = Dirty::all();
        self
    }

    pub fn with_limits(mut self, limits: WindowLimits) -> Self {
        self.body.limits = limits;
        self
    }

    /// Appends a component after the built-in ones.
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Notification) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn push(&mut self, command: Command) -> Result<()> {
        if let Command::SetEvents(events) = &command {
            validate_events(events)?;
        }
        self.queue.push_back(command);
        Ok(())
    }

    pub fn zoom(&mut self, delta_y: f64) {
        self.queue.push_back(Command::Zoom { delta_y });
    }

    pub fn pan_move(&mut self, dx: f64) {
        self.queue.push_back(Command::PanMove { dx });
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.queue.push_back(Command::Resize { width, height });
    }

    pub fn measure(&mut self, key: impl Into<String>, width: f64, height: f64) {
        self.queue.push_back(Command::Measure {
            key: key.into(),
            width,
            height,
        });
    }

    pub fn set_events(&mut self, events: Vec<Event>) -> Result<()> {
        self.push(Command::SetEvents(events))
    }

    pub fn hover(&mut self, id: Option<String>) {
        self.queue.push_back(Command::Hover(id));
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.queue.push_back(Command::Select(id.into()));
    }

    pub fn show_range(&mut self, start: Timestamp, end: Timestamp) {
        self.queue.push_back(Command::ShowRange { start, end });
    }

    /// Applies every queued command, redraws until the components settle
    /// (at most `max_redraw_passes` passes) and notifies observers.
    pub fn frame(&mut self) -> FrameReport {
        let range_before = self.body.range;
        let index_before = self.body.controller.index();
        let hovered_before = self.body.hovered.clone();
        let selected_before = self.body.selected.clone();

        let mut commands = 0;
        while let Some(command) = self.queue.pop_front() {
            self.apply(command);
            commands += 1;
        }

        let max_passes = self.body.config.max_redraw_passes.max(1);
        let mut passes = 0;
        let mut layout_changed = false;
        loop {
            passes += 1;
            let mut resized = false;
            for component in self.components.iter_mut() {
                resized |= component.redraw(&mut self.body);
            }
            layout_changed |= resized;
            if !resized {
                break;
            }
            if passes >= max_passes {
                tracing::warn!(passes, "redraw did not settle, stopping until the next frame");
                break;
            }
        }
        tracing::debug!(commands, passes, layout_changed, "frame");

        let mut notifications = Vec::new();
        if self.body.range != range_before {
            notifications.push(Notification::RangeChanged {
                range: self.body.range,
            });
        }
        let index = self.body.controller.index();
        if index != index_before {
            notifications.push(Notification::GranularityChanged {
                index,
                label: self.body.granularity().label(),
            });
        }
        if layout_changed {
            notifications.push(Notification::LayoutChanged);
        }
        if self.body.hovered != hovered_before {
            notifications.push(Notification::HoverChanged {
                id: self.body.hovered.clone(),
            });
        }
        if self.body.selected != selected_before {
            notifications.push(Notification::SelectionChanged {
                id: self.body.selected.clone(),
            });
        }
        for observer in self.observers.iter_mut() {
            for notification in &notifications {
                observer(notification);
            }
        }

        FrameReport {
            commands,
            passes,
            notifications,
        }
    }

    fn apply(&mut self, command: Command) {
        let body = &mut self.body;
        match command {
            Command::Zoom { delta_y } => {
                // Steps queued in one frame all keep the centre seen before the first.
                let anchor = body.pending.anchor.unwrap_or_else(|| {
                    body.time_at(body.controller.pan_offset() + body.container.width / 2.0)
                });
                if body.controller.on_zoom(delta_y) {
                    body.pending.anchor = Some(anchor);
                    body.dirty.ticks = true;
                    body.dirty.positions = true;
                    body.dirty.stacking = true;
                }
            }
            Command::PanMove { dx } => {
                if body.controller.on_pan_move(dx) {
                    body.dirty.viewport = true;
                }
            }
            Command::Resize { width, height } => {
                let container = Container::new(width, height);
                if container != body.container {
                    body.container = container;
                    body.dirty.range = true;
                    body.dirty.viewport = true;
                    body.dirty.stacking = true;
                }
            }
            Command::Measure { key, width, height } => {
                if body.event(&key).is_none() {
                    tracing::debug!(%key, "measurement for unknown event ignored");
                } else if body.cache.measure(&key, width, height) {
                    body.dirty.stacking = true;
                }
            }
            Command::SetEvents(events) => {
                let previous = std::mem::replace(&mut body.events, events);
                let ids: HashSet<&str> = body.events.iter().map(|event| event.id.as_str()).collect();
                // A card whose text changed must be measured again.
                let before: HashMap<&str, &Event> =
                    previous.iter().map(|event| (event.id.as_str(), event)).collect();
                let unchanged: HashSet<&str> = body
                    .events
                    .iter()
                    .filter(|event| {
                        before.get(event.id.as_str()).is_some_and(|old| {
                            old.title == event.title && old.time == event.time
                        })
                    })
                    .map(|event| event.id.as_str())
                    .collect();
                if body.cache.retain_keys(&unchanged) {
                    tracing::debug!(
                        kept = unchanged.len(),
                        events = ids.len(),
                        "dropped stale card measurements"
                    );
                }
                if body.hovered.as_deref().is_some_and(|id| !ids.contains(id)) {
                    body.hovered = None;
                }
                if body.selected.as_deref().is_some_and(|id| !ids.contains(id)) {
                    body.selected = None;
                }
                body.dirty.range = true;
                body.dirty.positions = true;
                body.dirty.stacking = true;
            }
            Command::Hover(id) => {
                let hovered = id.filter(|id| body.event(id).is_some());
                body.hovered = hovered;
            }
            Command::Select(id) => {
                if body.selected.as_deref() == Some(id.as_str()) {
                    body.selected = None;
                } else if body.event(&id).is_some() {
                    body.selected = Some(id);
                }
            }
            Command::ShowRange { start, end } => {
                body.pending.window = Some(TimeRange::new(start, end));
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.body.events
    }

    pub fn range(&self) -> TimeRange {
        self.body.range
    }

    pub fn granularity_index(&self) -> usize {
        self.body.controller.index()
    }

    pub fn pan_offset(&self) -> f64 {
        self.body.controller.pan_offset()
    }

    pub fn container(&self) -> Container {
        self.body.container
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.body.config
    }

    pub fn hovered(&self) -> Option<&str> {
        self.body.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.body.selected.as_deref()
    }

    pub fn items(&self) -> &ItemCache {
        &self.body.cache
    }

    pub fn visible_window(&self) -> TimeRange {
        self.body.visible_window()
    }

    /// Content x (pan included) of the tick line for `time`.
    pub fn x_for_time(&self, time: Timestamp) -> f64 {
        self.body.tick_x(time)
    }

    pub fn time_at(&self, x: f64) -> Timestamp {
        self.body.time_at(x)
    }

    /// Topmost card or point at content coordinates. `y` is measured from
    /// the top of the card area; points occupy its first `point_size` pixels.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Hit> {
        let body = &self.body;
        let card = body
            .events
            .iter()
            .rev()
            .filter_map(|event| body.cache.get(&event.id))
            .find(|item| item.contains(x, y));
        if let Some(item) = card {
            return Some(Hit::Card(item.key.clone()));
        }
        let point_size = body.config.point_size;
        if !(0.0..=point_size).contains(&y) {
            return None;
        }
        body.points
            .iter()
            .rev()
            .find(|point| {
                let width = point.width.unwrap_or(0.0).max(point_size);
                x >= point.x && x <= point.x + width
            })
            .map(|point| Hit::Point(point.id.clone()))
    }

    /// Snapshot of everything needed to draw the current frame.
    pub fn layout(&self) -> TimelineLayout {
        let body = &self.body;
        let is_hovered = |id: &str| body.hovered.as_deref() == Some(id);
        let is_selected = |id: &str| body.selected.as_deref() == Some(id);

        let points = body
            .points
            .iter()
            .map(|point| PointLayout {
                hovered: is_hovered(&point.id),
                selected: is_selected(&point.id),
                ..point.clone()
            })
            .collect();
        let cards = body
            .events
            .iter()
            .filter_map(|event| {
                let item = body.cache.get(&event.id)?;
                Some(CardLayout {
                    id: event.id.clone(),
                    title: event.title.clone(),
                    time_label: event.time.label(),
                    x: item.x,
                    y: item.y,
                    width: item.width,
                    height: item.height,
                    color: body.event_color(event),
                    hovered: is_hovered(&event.id),
                    selected: is_selected(&event.id),
                })
            })
            .collect();

        TimelineLayout {
            range: body.range,
            granularity_index: body.controller.index(),
            granularity: body.granularity().clone(),
            geometry: body.geometry(),
            content_width: body.content_width,
            viewport_width: body.container.width,
            height: body.container.height,
            pan_offset: body.controller.pan_offset(),
            tick_count: body.tick_count,
            ticks: body.axis.clone(),
            visible_ticks: body.visible_ticks.clone(),
            points,
            cards,
        }
    }

    /// Tears the components down in reverse order.
    pub fn destroy(mut self) {
        for component in self.components.iter_mut().rev() {
            tracing::debug!(component = component.name(), "destroy");
            component.destroy(&mut self.body);
        }
        self.queue.clear();
        self.observers.clear();
    }
}
