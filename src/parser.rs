use serde_json::{Number, Value};

use crate::error::{Result, TimelineError};
use crate::ir::{Event, EventTime, Timestamp, parse_timestamp, timestamp_from_millis, validate_events};

/// Parses an event document.
///
/// The document is either an array of events or an object with an `events`
/// array. Strict JSON is tried first, then JSON5 (comments, trailing commas,
/// unquoted keys). Timestamps may be strings or epoch milliseconds; a
/// two-element `time` array marks a duration event.
pub fn parse_events(input: &str) -> Result<Vec<Event>> {
    let value = match serde_json::from_str::<Value>(input) {
        Ok(value) => value,
        Err(json_err) => json5::from_str::<Value>(input).map_err(|json5_err| {
            TimelineError::Parse {
                message: format!("{json_err}; json5: {json5_err}"),
            }
        })?,
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => items,
            _ => return Err(parse_error("expected an `events` array")),
        },
        _ => return Err(parse_error("expected an array of events")),
    };

    let events = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| parse_event(idx, item))
        .collect::<Result<Vec<_>>>()?;
    validate_events(&events)?;
    Ok(events)
}

fn parse_event(idx: usize, item: Value) -> Result<Event> {
    let Value::Object(mut map) = item else {
        return Err(parse_error(&format!("event #{idx} is not an object")));
    };

    let id = match map.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(num)) => match whole_number(&num) {
            Some(whole) => whole.to_string(),
            None => num.to_string(),
        },
        Some(_) => return Err(parse_error(&format!("event #{idx} has a non-scalar id"))),
        None => return Err(parse_error(&format!("event #{idx} is missing an id"))),
    };
    let title = match map.remove("title") {
        Some(Value::String(title)) => title,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let color = match map.remove("color") {
        Some(Value::String(color)) if !color.trim().is_empty() => Some(color),
        _ => None,
    };
    let time = match map.remove("time") {
        Some(value) => parse_event_time(&id, value)?,
        None => return Err(parse_error(&format!("event '{id}' is missing a time"))),
    };

    Ok(Event {
        id,
        title,
        color,
        time,
        extra: map,
    })
}

fn parse_event_time(id: &str, value: Value) -> Result<EventTime> {
    match value {
        Value::Array(mut parts) if parts.len() == 2 => {
            let end = parse_time_value(parts.pop().unwrap_or(Value::Null))?;
            let start = parse_time_value(parts.pop().unwrap_or(Value::Null))?;
            Ok(EventTime::Span { start, end })
        }
        Value::Array(parts) => Err(parse_error(&format!(
            "event '{id}' has a time array of length {}, expected 2",
            parts.len()
        ))),
        other => Ok(EventTime::Instant(parse_time_value(other)?)),
    }
}

fn parse_time_value(value: Value) -> Result<Timestamp> {
    match value {
        Value::String(text) => parse_timestamp(&text),
        Value::Number(num) => match whole_number(&num) {
            Some(millis) => timestamp_from_millis(millis),
            None => Err(TimelineError::InvalidTimestamp {
                value: num.to_string(),
            }),
        },
        other => Err(TimelineError::InvalidTimestamp {
            value: other.to_string(),
        }),
    }
}

// JSON5 may hand integers back as floats.
fn whole_number(num: &Number) -> Option<i64> {
    num.as_i64().or_else(|| {
        num.as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
            .map(|value| value as i64)
    })
}

fn parse_error(message: &str) -> TimelineError {
    TimelineError::Parse {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array_with_instants_and_spans() {
        let input = r##"[
            {"id": "1", "title": "single", "time": "2024-03-10 10:00:00"},
            {"id": "2", "title": "range", "color": "#f00",
             "time": ["2024-03-10 11:30:00", "2024-03-10 13:30:00"]}
        ]"##;
        let events = parse_events(input).expect("parse failed");
        assert_eq!(events.len(), 2);
        assert!(!events[0].time.is_span());
        assert!(events[1].time.is_span());
        assert_eq!(events[1].color.as_deref(), Some("#f00"));
    }

    #[test]
    fn parses_json5_wrapper_with_extras() {
        let input = r#"{
            // exported from the scheduler
            events: [
                {id: 7, title: 'deploy', time: 1710064800000, owner: 'ops',},
            ],
        }"#;
        let events = parse_events(input).expect("json5 parse failed");
        assert_eq!(events[0].id, "7");
        assert_eq!(events[0].extra.get("owner"), Some(&Value::String("ops".to_string())));
    }

    #[test]
    fn rejects_inverted_span_at_the_boundary() {
        let input = r#"[{"id": "x", "title": "t", "time": ["2024-03-10 12:00", "2024-03-10 11:00"]}]"#;
        assert_eq!(
            parse_events(input),
            Err(TimelineError::InvertedSpan { id: "x".to_string() })
        );
    }

    #[test]
    fn rejects_unparseable_time() {
        let input = r#"[{"id": "x", "title": "t", "time": "not a date"}]"#;
        assert!(matches!(
            parse_events(input),
            Err(TimelineError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn rejects_missing_time() {
        let input = r#"[{"id": "x", "title": "t"}]"#;
        assert!(matches!(parse_events(input), Err(TimelineError::Parse { .. })));
    }
}
