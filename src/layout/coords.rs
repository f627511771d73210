//! Linear time <-> pixel mapping.
//!
//! Offsets grow by `tick_width + tick_gap` per elapsed tick interval, starting
//! at `padding_start`. Nothing is clamped: events before the base time map to
//! negative offsets.

use chrono::TimeDelta;

use super::types::AxisGeometry;
use crate::ir::{Timestamp, timestamp_millis};

/// Left edge of a point (or the start of a bar) for `target`.
pub fn position_for_time(
    target: Timestamp,
    base: Timestamp,
    tick_interval_ms: i64,
    geometry: &AxisGeometry,
) -> f64 {
    let ticks = elapsed_ticks(base, target, tick_interval_ms);
    ticks * geometry.pitch() + geometry.padding_start - geometry.point_size / 2.0
}

/// Pixel width of `[start, end]`. A zero-length range is one gap wide.
pub fn width_for_range(
    start: Timestamp,
    end: Timestamp,
    tick_interval_ms: i64,
    geometry: &AxisGeometry,
) -> f64 {
    let ticks = elapsed_ticks(start, end, tick_interval_ms);
    ticks * geometry.pitch() + geometry.tick_gap
}

/// Offset of the `index`-th tick.
pub fn tick_offset(index: usize, geometry: &AxisGeometry) -> f64 {
    index as f64 * geometry.pitch() + geometry.padding_start
}

/// Inverse of [`position_for_time`] for a content x coordinate that points at
/// the tick line itself (no point-size correction).
pub fn time_for_position(
    x: f64,
    base: Timestamp,
    tick_interval_ms: i64,
    geometry: &AxisGeometry,
) -> Timestamp {
    let pitch = geometry.pitch();
    if pitch <= 0.0 {
        return base;
    }
    let ticks = (x - geometry.padding_start) / pitch;
    let millis = (ticks * tick_interval_ms as f64).round();
    if !millis.is_finite() {
        return base;
    }
    TimeDelta::try_milliseconds(millis as i64)
        .and_then(|delta| base.checked_add_signed(delta))
        .unwrap_or(base)
}

fn elapsed_ticks(from: Timestamp, to: Timestamp, tick_interval_ms: i64) -> f64 {
    let diff_ms = timestamp_millis(to) - timestamp_millis(from);
    diff_ms as f64 / tick_interval_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_timestamp;

    fn geometry() -> AxisGeometry {
        AxisGeometry {
            tick_width: 1.0,
            tick_gap: 8.0,
            padding_start: 24.0,
            padding_end: 24.0,
            point_size: 10.0,
        }
    }

    const MINUTE: i64 = 60_000;

    #[test]
    fn base_time_sits_at_padding_minus_half_point() {
        let base = parse_timestamp("2024-03-10 00:00:00").unwrap();
        let x = position_for_time(base, base, MINUTE, &geometry());
        assert_eq!(x, 24.0 - 5.0);
    }

    #[test]
    fn tick_offsets_agree_with_mapper() {
        let g = geometry();
        let base = parse_timestamp("2024-03-10 00:00:00").unwrap();
        for index in [0usize, 1, 7, 90] {
            let time = base + TimeDelta::minutes(index as i64);
            let mapped = position_for_time(time, base, MINUTE, &g) + g.point_size / 2.0;
            assert_eq!(mapped, tick_offset(index, &g));
        }
    }

    #[test]
    fn mapping_is_affine_in_elapsed_time() {
        let g = geometry();
        let base = parse_timestamp("2024-03-10 00:00:00").unwrap();
        let t1 = parse_timestamp("2024-03-10 01:10:00").unwrap();
        let t2 = parse_timestamp("2024-03-10 03:40:00").unwrap();
        let delta = position_for_time(t2, base, MINUTE, &g) - position_for_time(t1, base, MINUTE, &g);
        assert_eq!(delta, 150.0 * g.pitch());
    }

    #[test]
    fn events_before_base_map_to_negative_offsets() {
        let base = parse_timestamp("2024-03-10 00:00:00").unwrap();
        let early = parse_timestamp("2024-03-09 23:00:00").unwrap();
        assert!(position_for_time(early, base, MINUTE, &geometry()) < 0.0);
    }

    #[test]
    fn zero_length_range_is_one_gap_wide() {
        let t = parse_timestamp("2024-03-10 10:00:00").unwrap();
        assert_eq!(width_for_range(t, t, MINUTE, &geometry()), 8.0);
        let later = parse_timestamp("2024-03-10 10:02:00").unwrap();
        assert_eq!(width_for_range(t, later, MINUTE, &geometry()), 2.0 * 9.0 + 8.0);
    }

    #[test]
    fn inverse_mapping_recovers_tick_times() {
        let g = geometry();
        let base = parse_timestamp("2024-03-10 00:00:00").unwrap();
        let x = tick_offset(45, &g);
        assert_eq!(
            time_for_position(x, base, MINUTE, &g),
            parse_timestamp("2024-03-10 00:45:00").unwrap()
        );
    }
}
