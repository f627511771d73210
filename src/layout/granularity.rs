use chrono::{Days, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::ir::Timestamp;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Minute,
    Hour,
    Day,
}

impl Scale {
    /// Nominal length of one unit. Only the linear mapper uses this; ticks are
    /// produced with [`Scale::add_steps`].
    pub fn unit_ms(self) -> i64 {
        match self {
            Self::Minute => MINUTE_MS,
            Self::Hour => HOUR_MS,
            Self::Day => DAY_MS,
        }
    }

    /// Calendar-aware addition of `count` units. `None` on overflow.
    pub fn add_steps(self, time: Timestamp, count: u64) -> Option<Timestamp> {
        let signed = i64::try_from(count).ok()?;
        match self {
            Self::Minute => time.checked_add_signed(TimeDelta::try_minutes(signed)?),
            Self::Hour => time.checked_add_signed(TimeDelta::try_hours(signed)?),
            Self::Day => time.checked_add_days(Days::new(count)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Granularity {
    pub scale: Scale,
    pub step: u32,
    /// A label is drawn on every n-th tick.
    pub label_step_every: usize,
    pub tick_gap_px: f64,
    /// chrono format used for the first tick.
    pub major_format: String,
    pub minor_format: String,
}

impl Granularity {
    pub fn new(
        scale: Scale,
        step: u32,
        label_step_every: usize,
        tick_gap_px: f64,
        major_format: &str,
        minor_format: &str,
    ) -> Self {
        Self {
            scale,
            step: step.max(1),
            label_step_every: label_step_every.max(1),
            tick_gap_px,
            major_format: major_format.to_string(),
            minor_format: minor_format.to_string(),
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.scale.unit_ms() * i64::from(self.step)
    }

    pub fn next_tick(&self, time: Timestamp) -> Option<Timestamp> {
        self.scale.add_steps(time, u64::from(self.step))
    }

    /// Time of the tick `index` steps after `origin`.
    pub fn tick_at(&self, origin: Timestamp, index: usize) -> Option<Timestamp> {
        let steps = u64::try_from(index).ok()?.checked_mul(u64::from(self.step))?;
        self.scale.add_steps(origin, steps)
    }

    pub fn label(&self) -> String {
        let unit = match self.scale {
            Scale::Minute => "minute",
            Scale::Hour => "hour",
            Scale::Day => "day",
        };
        if self.step == 1 {
            format!("1 {unit}")
        } else {
            format!("{} {unit}s", self.step)
        }
    }
}

/// The zoom ladder, finest first. An index into this table is the whole
/// zoom state of a timeline.
pub fn default_granularities() -> Vec<Granularity> {
    vec![
        Granularity::new(Scale::Minute, 1, 10, 8.0, "%m-%d %H:00", "%H:%M"),
        Granularity::new(Scale::Minute, 5, 6, 8.0, "%m-%d %H:00", "%H:%M"),
        Granularity::new(Scale::Minute, 10, 6, 8.0, "%m-%d %H:00", "%H:%M"),
        Granularity::new(Scale::Minute, 15, 4, 10.0, "%m-%d %H:00", "%H:%M"),
        Granularity::new(Scale::Minute, 30, 4, 10.0, "%m-%d %H:00", "%H:%M"),
        Granularity::new(Scale::Hour, 1, 6, 10.0, "%Y-%m-%d", "%H:%M"),
        Granularity::new(Scale::Hour, 3, 4, 12.0, "%Y-%m-%d", "%H:%M"),
        Granularity::new(Scale::Hour, 6, 4, 12.0, "%Y-%m-%d", "%m-%d %H:%M"),
        Granularity::new(Scale::Hour, 12, 2, 14.0, "%Y-%m-%d", "%m-%d %H:%M"),
        Granularity::new(Scale::Day, 1, 7, 14.0, "%Y-%m", "%d"),
        Granularity::new(Scale::Day, 7, 4, 16.0, "%Y-%m", "%m-%d"),
        Granularity::new(Scale::Day, 14, 2, 16.0, "%Y", "%m-%d"),
    ]
}
