use serde::{Deserialize, Serialize};

use crate::ir::{Timestamp, timestamp_from_millis, timestamp_millis};
use crate::layout::TimeRange;

const DEFAULT_ZOOM_MIN_MS: i64 = 10;
const DEFAULT_ZOOM_MAX_MS: i64 = 1000 * 60 * 60 * 24 * 365 * 10_000;

/// Bounds for an explicitly requested visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimits {
    pub min: Option<Timestamp>,
    pub max: Option<Timestamp>,
    pub zoom_min_ms: i64,
    pub zoom_max_ms: i64,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            zoom_min_ms: DEFAULT_ZOOM_MIN_MS,
            zoom_max_ms: DEFAULT_ZOOM_MAX_MS,
        }
    }
}

/// Fits `requested` into `limits`, given the window currently shown.
///
/// Returns the resulting window and whether it differs from `current`.
pub fn apply_limits(
    current: &TimeRange,
    requested: &TimeRange,
    limits: &WindowLimits,
) -> (TimeRange, bool) {
    let cur_start = timestamp_millis(current.start);
    let cur_end = timestamp_millis(current.end);
    let mut start = timestamp_millis(requested.start);
    let mut end = timestamp_millis(requested.end).max(start);
    let min = limits.min.map(timestamp_millis);
    let max = limits.max.map(timestamp_millis);

    if let Some(min) = min
        && start < min
    {
        let diff = min - start;
        start += diff;
        end += diff;
        if let Some(max) = max {
            end = end.min(max);
        }
    }
    if let Some(max) = max
        && end > max
    {
        let diff = end - max;
        start -= diff;
        end -= diff;
        if let Some(min) = min {
            start = start.max(min);
        }
    }

    let zoom_min = limits.zoom_min_ms.max(0);
    if end - start < zoom_min {
        let already_at_min = cur_end - cur_start == zoom_min;
        if already_at_min && start >= cur_start && end <= cur_end {
            start = cur_start;
            end = cur_end;
        } else {
            let diff = zoom_min - (end - start);
            start -= diff / 2;
            end += diff - diff / 2;
        }
    }

    let zoom_max = limits.zoom_max_ms.max(0);
    if end - start > zoom_max {
        let already_at_max = cur_end - cur_start == zoom_max;
        if already_at_max && start < cur_start && end > cur_end {
            start = cur_start;
            end = cur_end;
        } else {
            let diff = (end - start) - zoom_max;
            start += diff / 2;
            end -= diff - diff / 2;
        }
    }

    let (Ok(start), Ok(end)) = (timestamp_from_millis(start), timestamp_from_millis(end)) else {
        return (*current, false);
    };
    let next = TimeRange::new(start, end);
    (next, next != *current)
}
