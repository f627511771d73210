use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Wall-clock timestamp. All layout arithmetic happens on local wall time.
pub type Timestamp = NaiveDateTime;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const CARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_timestamp(value: &str) -> Result<Timestamp> {
    let value = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight);
    }
    Err(TimelineError::InvalidTimestamp {
        value: value.to_string(),
    })
}

pub fn timestamp_from_millis(millis: i64) -> Result<Timestamp> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| TimelineError::InvalidTimestamp {
            value: millis.to_string(),
        })
}

pub fn timestamp_millis(time: Timestamp) -> i64 {
    time.and_utc().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Instant(Timestamp),
    Span { start: Timestamp, end: Timestamp },
}

impl EventTime {
    pub fn start(&self) -> Timestamp {
        match self {
            Self::Instant(time) => *time,
            Self::Span { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Timestamp {
        match self {
            Self::Instant(time) => *time,
            Self::Span { end, .. } => *end,
        }
    }

    pub fn is_span(&self) -> bool {
        matches!(self, Self::Span { .. })
    }

    /// Card subtitle: the instant, or `start ~ end` for a span.
    pub fn label(&self) -> String {
        match self {
            Self::Instant(time) => time.format(CARD_TIME_FORMAT).to_string(),
            Self::Span { start, end } => format!(
                "{} ~ {}",
                start.format(CARD_TIME_FORMAT),
                end.format(CARD_TIME_FORMAT)
            ),
        }
    }

    /// Both endpoints of a span, or the single instant.
    pub fn endpoints(&self) -> impl Iterator<Item = Timestamp> {
        let (first, second) = match self {
            Self::Instant(time) => (*time, None),
            Self::Span { start, end } => (*start, Some(*end)),
        };
        std::iter::once(first).chain(second)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub color: Option<String>,
    pub time: EventTime,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    pub fn instant(id: impl Into<String>, title: impl Into<String>, time: Timestamp) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: None,
            time: EventTime::Instant(time),
            extra: serde_json::Map::new(),
        }
    }

    pub fn span(
        id: impl Into<String>,
        title: impl Into<String>,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: None,
            time: EventTime::Span { start, end },
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let EventTime::Span { start, end } = self.time
            && end < start
        {
            return Err(TimelineError::InvertedSpan {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Checks every event and rejects duplicate ids.
pub fn validate_events(events: &[Event]) -> Result<()> {
    let mut seen = HashSet::new();
    for event in events {
        event.validate()?;
        if !seen.insert(event.id.as_str()) {
            return Err(TimelineError::DuplicateId {
                id: event.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-10 10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-10T10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-10 10:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-10").unwrap(),
            expected.date().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert_eq!(
            parse_timestamp("yesterday-ish"),
            Err(TimelineError::InvalidTimestamp {
                value: "yesterday-ish".to_string()
            })
        );
    }

    #[test]
    fn millis_roundtrip_through_epoch() {
        let time = parse_timestamp("2024-03-10 10:00:00").unwrap();
        let millis = timestamp_millis(time);
        assert_eq!(timestamp_from_millis(millis).unwrap(), time);
    }

    #[test]
    fn inverted_span_is_rejected() {
        let start = parse_timestamp("2024-03-10 12:00:00").unwrap();
        let end = parse_timestamp("2024-03-10 11:00:00").unwrap();
        let event = Event::span("a", "backwards", start, end);
        assert_eq!(
            event.validate(),
            Err(TimelineError::InvertedSpan {
                id: "a".to_string()
            })
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let time = parse_timestamp("2024-03-10 12:00:00").unwrap();
        let events = vec![Event::instant("a", "one", time), Event::instant("a", "two", time)];
        assert_eq!(
            validate_events(&events),
            Err(TimelineError::DuplicateId {
                id: "a".to_string()
            })
        );
    }

    #[test]
    fn endpoints_cover_both_ends_of_span() {
        let start = parse_timestamp("2024-03-10 11:30:00").unwrap();
        let end = parse_timestamp("2024-03-10 13:30:00").unwrap();
        let collected: Vec<_> = EventTime::Span { start, end }.endpoints().collect();
        assert_eq!(collected, vec![start, end]);
        let single: Vec<_> = EventTime::Instant(start).endpoints().collect();
        assert_eq!(single, vec![start]);
    }

    #[test]
    fn span_label_joins_both_ends() {
        let start = parse_timestamp("2024-03-10 11:30:00").unwrap();
        let end = parse_timestamp("2024-03-10 13:30:00").unwrap();
        assert_eq!(
            EventTime::Span { start, end }.label(),
            "2024-03-10 11:30:00 ~ 2024-03-10 13:30:00"
        );
        assert_eq!(EventTime::Instant(start).label(), "2024-03-10 11:30:00");
    }
}
