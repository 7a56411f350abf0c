//! External event ingress.
//!
//! One JSON object per line: `type` (or `event_type`) is required, `source`,
//! `severity` and `payload` are optional.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{Event, Severity};

/// Source stamped on ingested events that name none.
pub const INGRESS_SOURCE: &str = "ingress";

#[derive(Debug, Deserialize)]
struct EventLine {
    #[serde(alias = "event_type", rename = "type")]
    event_type: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    payload: Option<Value>,
}

/// Parse one ingress line into a fresh event. Severity defaults to medium.
pub fn parse_event_line(line: &str) -> Result<Event, serde_json::Error> {
    let line: EventLine = serde_json::from_str(line.trim())?;
    let source = line
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| INGRESS_SOURCE.to_string());
    let payload = match line.payload {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(payload) => payload,
    };
    Ok(Event::new(line.event_type, source, line.severity.unwrap_or(Severity::Medium))
        .with_payload(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kinds;
    use serde_json::json;

    #[test]
    fn test_minimal_line() {
        let event = parse_event_line(r#"{"type": "DOCS_STALE"}"#).unwrap();
        assert_eq!(event.event_type, kinds::DOCS_STALE);
        assert_eq!(event.source, INGRESS_SOURCE);
        assert_eq!(event.severity, Severity::Medium);
        assert_eq!(event.payload, json!({}));
    }

    #[test]
    fn test_full_line() {
        let event = parse_event_line(
            r#"{"event_type": "DEPLOY_FAILED", "source": "ci", "severity": "critical", "payload": {"service": "gateway"}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, kinds::DEPLOY_FAILED);
        assert_eq!(event.source, "ci");
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.payload_str("service").as_deref(), Some("gateway"));
    }

    #[test]
    fn test_missing_type_rejected() {
        assert!(parse_event_line(r#"{"source": "ci"}"#).is_err());
        assert!(parse_event_line("not json").is_err());
    }
}
