use std::ops::Range;

use chrono::{NaiveTime, TimeDelta, Timelike};

use super::granularity::Granularity;
use super::types::{AxisGeometry, Tick, TimeRange};
use crate::ir::{Event, Timestamp, timestamp_millis};

const MINUTE_MS: i64 = 60_000;
const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

#[derive(Debug, Clone, Copy)]
pub struct RangeOptions {
    /// Margin added on both sides of the data, in minutes.
    pub padding_minutes: i64,
    /// Narrowest window ever produced, in minutes.
    pub min_range_minutes: i64,
    /// Centre used when there is nothing to show.
    pub default_center: Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct InteractiveOptions {
    pub pad_days: i64,
    pub tick_width: f64,
    pub default_center: Timestamp,
}

/// Fits a window around the events, padded and hour-aligned.
pub fn calculate_time_range(events: &[Event], options: &RangeOptions) -> TimeRange {
    let min_range_ms = options.min_range_minutes.max(0) * MINUTE_MS;
    let Some((min_time, max_time)) = data_bounds(events) else {
        return normalize_to_hours(centered(options.default_center, min_range_ms));
    };
    if min_time == max_time {
        return normalize_to_hours(centered(min_time, min_range_ms));
    }

    let padding = options.padding_minutes.max(0) * MINUTE_MS;
    let mut start = shift_ms(min_time, -padding);
    let mut end = shift_ms(max_time, padding);

    let span = timestamp_millis(end) - timestamp_millis(start);
    if span < min_range_ms {
        let extend_by = (min_range_ms - span) / 2;
        start = shift_ms(start, -extend_by);
        end = shift_ms(end, min_range_ms - span - extend_by);
    }

    normalize_to_hours(TimeRange::new(start, end))
}

/// Window used while zooming: wide enough that the coarsest granularity can
/// fill the container, padded by whole days and day-aligned.
pub fn calculate_interactive_range(
    events: &[Event],
    container_width: f64,
    coarsest: &Granularity,
    options: &InteractiveOptions,
) -> TimeRange {
    let (min_time, max_time) =
        data_bounds(events).unwrap_or((options.default_center, options.default_center));

    let pitch = coarsest.tick_gap_px + options.tick_width;
    let capacity_ticks = if pitch > 0.0 {
        (container_width.max(0.0) / pitch).round() as i64
    } else {
        0
    };
    let capacity_ms = capacity_ticks.saturating_mul(coarsest.interval_ms());
    let data_ms = timestamp_millis(max_time) - timestamp_millis(min_time);

    let pad = options.pad_days.max(0) * DAY_MS;
    let lead = if data_ms > capacity_ms {
        pad
    } else {
        pad + (capacity_ms - data_ms)
    };

    let start = start_of_day(shift_ms(min_time, -lead));
    let mut end = start_of_day(shift_ms(max_time, pad));
    if end <= start {
        end = shift_ms(start, DAY_MS);
    }
    TimeRange::new(start, end)
}

/// Number of ticks in `[range.start, range.end)`.
///
/// Wall-clock steps have a fixed length, so the count is closed-form and the
/// tick list never has to be materialised.
pub fn tick_count(range: &TimeRange, granularity: &Granularity) -> usize {
    let duration = range.duration_ms();
    let interval = granularity.interval_ms();
    if duration <= 0 || interval <= 0 {
        return 0;
    }
    let count = (duration as u64).div_ceil(interval as u64);
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// The ticks whose indices fall in `indices`, clipped to the ticks of
/// `range`. The first one is reached by calendar addition from
/// `range.start`, the rest by stepping.
pub fn generate_ticks(
    range: &TimeRange,
    granularity: &Granularity,
    indices: Range<usize>,
) -> Vec<Tick> {
    let end = indices.end.min(tick_count(range, granularity));
    if indices.start >= end {
        return Vec::new();
    }
    let Some(mut time) = granularity.tick_at(range.start, indices.start) else {
        tracing::warn!(
            index = indices.start,
            granularity = %granularity.label(),
            "tick index overflows the calendar"
        );
        return Vec::new();
    };
    let mut ticks = Vec::with_capacity(end - indices.start);
    for _ in indices.start..end {
        ticks.push(Tick { time });
        match granularity.next_tick(time) {
            Some(next) => time = next,
            None => break,
        }
    }
    ticks
}

/// Ticks of `granularity` that fit in `width` pixels.
pub fn tick_capacity(width: f64, granularity: &Granularity, geometry: &AxisGeometry) -> usize {
    let pitch = geometry.tick_width + granularity.tick_gap_px;
    if pitch <= 0.0 || width <= 0.0 {
        return 0;
    }
    (width / pitch).floor() as usize
}

fn data_bounds(events: &[Event]) -> Option<(Timestamp, Timestamp)> {
    events
        .iter()
        .flat_map(|event| event.time.endpoints())
        .fold(None, |acc, time| match acc {
            None => Some((time, time)),
            Some((lo, hi)) => Some((lo.min(time), hi.max(time))),
        })
}

fn centered(center: Timestamp, width_ms: i64) -> TimeRange {
    let half = width_ms / 2;
    TimeRange::new(shift_ms(center, -half), shift_ms(center, width_ms - half))
}

fn shift_ms(time: Timestamp, millis: i64) -> Timestamp {
    TimeDelta::try_milliseconds(millis)
        .and_then(|delta| time.checked_add_signed(delta))
        .unwrap_or(time)
}

fn floor_to_hour(time: Timestamp) -> Timestamp {
    time.date()
        .and_hms_opt(time.hour(), 0, 0)
        .unwrap_or(time)
}

fn ceil_to_hour(time: Timestamp) -> Timestamp {
    let floored = floor_to_hour(time);
    if floored == time {
        time
    } else {
        shift_ms(floored, 60 * MINUTE_MS)
    }
}

fn start_of_day(time: Timestamp) -> Timestamp {
    time.date().and_time(NaiveTime::MIN)
}

fn normalize_to_hours(range: TimeRange) -> TimeRange {
    let start = floor_to_hour(range.start);
    let mut end = ceil_to_hour(range.end);
    if end <= start {
        end = shift_ms(start, 60 * MINUTE_MS);
    }
    TimeRange::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_timestamp;
    use crate::layout::granularity::{Scale, default_granularities};

    fn ts(value: &str) -> Timestamp {
        parse_timestamp(value).unwrap()
    }

    fn options(center: &str) -> RangeOptions {
        RangeOptions {
            padding_minutes: 30,
            min_range_minutes: 60 * 24,
            default_center: ts(center),
        }
    }

    fn mock_events() -> Vec<Event> {
        vec![
            Event::instant("1", "instant", ts("2024-03-10 10:00:00")),
            Event::span("2", "range", ts("2024-03-10 11:30:00"), ts("2024-03-10 13:30:00")),
            Event::instant("3", "instant", ts("2024-03-10 16:00:00")),
            Event::span("4", "long", ts("2024-03-10 14:15:00"), ts("2024-03-10 18:15:00")),
            Event::span("5", "long", ts("2024-03-10 19:15:00"), ts("2024-03-10 23:15:00")),
            Event::span("6", "long", ts("2024-03-12 15:15:00"), ts("2024-03-12 17:15:00")),
            Event::span("7", "long", ts("2024-03-13 19:15:00"), ts("2024-03-13 23:15:00")),
            Event::span("8", "long", ts("2024-05-28 19:15:00"), ts("2024-05-29 23:15:00")),
        ]
    }

    #[test]
    fn data_wider_than_minimum_is_padded_and_hour_aligned() {
        let range = calculate_time_range(&mock_events(), &options("2024-01-01 00:00:00"));
        assert_eq!(range.start, ts("2024-03-10 09:00:00"));
        assert_eq!(range.end, ts("2024-05-30 00:00:00"));
    }

    #[test]
    fn empty_data_centres_on_default() {
        let range = calculate_time_range(&[], &options("2024-03-10 12:00:00"));
        assert_eq!(range.start, ts("2024-03-10 00:00:00"));
        assert_eq!(range.end, ts("2024-03-11 00:00:00"));
    }

    #[test]
    fn single_instant_gets_symmetric_minimum_window() {
        let events = vec![Event::instant("a", "a", ts("2024-03-10 10:00:00"))];
        let range = calculate_time_range(&events, &options("2024-01-01 00:00:00"));
        assert_eq!(range.start, ts("2024-03-09 22:00:00"));
        assert_eq!(range.end, ts("2024-03-10 22:00:00"));
    }

    #[test]
    fn coincident_events_count_as_a_single_instant() {
        let events = vec![
            Event::instant("a", "a", ts("2024-03-10 10:00:00")),
            Event::span("b", "b", ts("2024-03-10 10:00:00"), ts("2024-03-10 10:00:00")),
        ];
        let range = calculate_time_range(&events, &options("2024-01-01 00:00:00"));
        assert_eq!(range.duration_ms(), 24 * 60 * MINUTE_MS);
    }

    #[test]
    fn narrow_data_is_expanded_to_minimum() {
        let events = vec![
            Event::instant("a", "a", ts("2024-03-10 10:00:00")),
            Event::instant("b", "b", ts("2024-03-10 12:00:00")),
        ];
        let range = calculate_time_range(&events, &options("2024-01-01 00:00:00"));
        assert!(range.duration_ms() >= 24 * 60 * MINUTE_MS);
        assert_eq!(range.start, ts("2024-03-09 23:00:00"));
        assert_eq!(range.end, ts("2024-03-10 23:00:00"));
    }

    #[test]
    fn superset_never_narrows_the_range() {
        let subset = vec![
            Event::instant("a", "a", ts("2024-03-10 10:00:00")),
            Event::instant("b", "b", ts("2024-03-11 18:20:00")),
        ];
        let mut superset = subset.clone();
        superset.push(Event::instant("c", "c", ts("2024-03-12 07:45:00")));
        let opts = options("2024-01-01 00:00:00");
        let small = calculate_time_range(&subset, &opts);
        let large = calculate_time_range(&superset, &opts);
        assert!(large.covers(&small));
    }

    #[test]
    fn ticks_step_until_exclusive_end() {
        let range = TimeRange::new(ts("2024-03-10 00:00:00"), ts("2024-03-10 03:00:00"));
        let hourly = default_granularities()
            .into_iter()
            .find(|g| g.scale == Scale::Hour && g.step == 1)
            .unwrap();
        assert_eq!(tick_count(&range, &hourly), 3);
        let ticks = generate_ticks(&range, &hourly, 0..usize::MAX);
        let times: Vec<_> = ticks.iter().map(|t| t.time).collect();
        assert_eq!(
            times,
            vec![
                ts("2024-03-10 00:00:00"),
                ts("2024-03-10 01:00:00"),
                ts("2024-03-10 02:00:00"),
            ]
        );
    }

    #[test]
    fn partial_last_interval_still_gets_a_tick() {
        let range = TimeRange::new(ts("2024-03-10 00:00:00"), ts("2024-03-10 02:30:00"));
        let hourly = Granularity::new(Scale::Hour, 1, 6, 10.0, "", "");
        assert_eq!(tick_count(&range, &hourly), 3);
        let last = generate_ticks(&range, &hourly, 2..3);
        assert_eq!(last[0].time, ts("2024-03-10 02:00:00"));
    }

    #[test]
    fn far_windows_of_a_long_minute_axis_are_generated_directly() {
        let range = TimeRange::new(ts("2021-05-31 00:00:00"), ts("2024-04-19 00:00:00"));
        let minute = default_granularities().remove(0);
        let count = tick_count(&range, &minute);
        assert_eq!(count as i64, range.duration_ms() / MINUTE_MS);
        assert!(count > 1_000_000);

        let tail = generate_ticks(&range, &minute, count - 2..count + 10);
        let times: Vec<_> = tail.iter().map(|t| t.time).collect();
        assert_eq!(
            times,
            vec![ts("2024-04-18 23:58:00"), ts("2024-04-18 23:59:00")]
        );
        assert!(generate_ticks(&range, &minute, count..count + 5).is_empty());
    }

    #[test]
    fn day_ticks_follow_the_calendar_across_months() {
        let range = TimeRange::new(ts("2024-01-30 00:00:00"), ts("2024-03-02 00:00:00"));
        let daily = Granularity::new(Scale::Day, 1, 7, 14.0, "", "");
        let ticks = generate_ticks(&range, &daily, 30..33);
        let times: Vec<_> = ticks.iter().map(|t| t.time).collect();
        assert_eq!(
            times,
            vec![
                ts("2024-02-29 00:00:00"),
                ts("2024-03-01 00:00:00"),
            ]
        );
    }

    #[test]
    fn interactive_range_fills_container_at_coarsest_zoom() {
        let table = default_granularities();
        let coarsest = table.last().unwrap();
        let events = vec![Event::instant("a", "a", ts("2024-03-10 10:00:00"))];
        let opts = InteractiveOptions {
            pad_days: 30,
            tick_width: 1.0,
            default_center: ts("2024-01-01 00:00:00"),
        };
        let range = calculate_interactive_range(&events, 1700.0, coarsest, &opts);
        assert_eq!(range.start.time(), NaiveTime::MIN);
        assert_eq!(range.end, ts("2024-04-09 00:00:00"));
        let capacity = (1700.0 / (coarsest.tick_gap_px + 1.0)).round() as i64;
        assert!(range.duration_ms() >= capacity * coarsest.interval_ms());
    }
}
