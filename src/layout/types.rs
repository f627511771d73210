use std::ops::Range;

use serde::Serialize;

use super::granularity::Granularity;
use crate::ir::{Timestamp, timestamp_millis};

/// Visible `[start, end)` window of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn duration_ms(&self) -> i64 {
        timestamp_millis(self.end) - timestamp_millis(self.start)
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        time >= self.start && time < self.end
    }

    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub time: Timestamp,
}

/// A positioned, measured rectangle: one rendered card.
///
/// `x`, `width` and `height` come from measurement; `y` belongs to the
/// stacking pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualItem {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl VirtualItem {
    pub fn new(key: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            key: key.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn overlaps_x(&self, other: &Self) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    pub fn overlaps_y(&self, other: &Self) -> bool {
        self.y < other.bottom() && self.bottom() > other.y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Pixel geometry shared by tick generation and the coordinate mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisGeometry {
    pub tick_width: f64,
    pub tick_gap: f64,
    pub padding_start: f64,
    pub padding_end: f64,
    pub point_size: f64,
}

impl AxisGeometry {
    pub fn pitch(&self) -> f64 {
        self.tick_width + self.tick_gap
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    /// Position in the full tick sequence of the range.
    pub index: usize,
    pub time: Timestamp,
    pub x: f64,
    pub is_major: bool,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointLayout {
    pub id: String,
    pub x: f64,
    /// Pixel width of a duration event; `None` for instants.
    pub width: Option<f64>,
    pub color: String,
    pub hovered: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub id: String,
    pub title: String,
    pub time_label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub hovered: bool,
    pub selected: bool,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineLayout {
    pub range: TimeRange,
    pub granularity_index: usize,
    pub granularity: Granularity,
    pub geometry: AxisGeometry,
    /// Total scrollable content width.
    pub content_width: f64,
    pub viewport_width: f64,
    pub height: f64,
    pub pan_offset: f64,
    /// Ticks in `[range.start, range.end)` at the current granularity.
    pub tick_count: usize,
    /// The ticks in `visible_ticks`; only these are materialised.
    pub ticks: Vec<AxisTick>,
    pub visible_ticks: Range<usize>,
    pub points: Vec<PointLayout>,
    pub cards: Vec<CardLayout>,
}

impl TimelineLayout {
    pub fn card(&self, id: &str) -> Option<&CardLayout> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn point(&self, id: &str) -> Option<&PointLayout> {
        self.points.iter().find(|point| point.id == id)
    }
}
