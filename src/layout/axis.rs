use std::ops::Range;

use super::coords::tick_offset;
use super::granularity::Granularity;
use super::types::{AxisGeometry, AxisTick, Tick};

/// Axis entries for a run of consecutive ticks starting at tick
/// `first_index`. Major marks and labels follow the absolute index, so a
/// window labels the same ticks the full axis would.
pub fn build_axis(
    ticks: &[Tick],
    first_index: usize,
    granularity: &Granularity,
    geometry: &AxisGeometry,
) -> Vec<AxisTick> {
    let every = granularity.label_step_every.max(1);
    ticks
        .iter()
        .zip(first_index..)
        .map(|(tick, index)| {
            let is_major = index % every == 0;
            let label = is_major.then(|| {
                let format = if index == 0 {
                    &granularity.major_format
                } else {
                    &granularity.minor_format
                };
                tick.time.format(format).to_string()
            });
            AxisTick {
                index,
                time: tick.time,
                x: tick_offset(index, geometry),
                is_major,
                label,
            }
        })
        .collect()
}

pub fn axis_total_width(tick_count: usize, geometry: &AxisGeometry) -> f64 {
    if tick_count == 0 {
        return geometry.padding_start + geometry.padding_end;
    }
    geometry.padding_start + tick_count as f64 * geometry.pitch() - geometry.tick_gap
        + geometry.padding_end
}

/// Indices of the ticks that intersect `[scroll, scroll + viewport_width)`,
/// widened by `overscan` ticks on each side.
pub fn visible_tick_range(
    tick_count: usize,
    geometry: &AxisGeometry,
    scroll: f64,
    viewport_width: f64,
    overscan: usize,
) -> Range<usize> {
    let pitch = geometry.pitch();
    if tick_count == 0 || pitch <= 0.0 || viewport_width <= 0.0 {
        return 0..0;
    }
    let first = ((scroll - geometry.padding_start - geometry.tick_width) / pitch).ceil();
    let last = ((scroll + viewport_width - geometry.padding_start) / pitch).floor();
    if last < 0.0 || first >= tick_count as f64 {
        return 0..0;
    }
    let first = (first.max(0.0) as usize).saturating_sub(overscan);
    let last = (last as usize).saturating_add(overscan).min(tick_count - 1);
    if first > last {
        return 0..0;
    }
    first..last + 1
}
