//! Conversion of raw JSON log records into [`Event`]s.

use log::warn;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{Event, EventKind};
use crate::error::{ReplayError, ReplayResult};

/// Convert the raw record at `index` into an [`Event`].
///
/// # Errors
/// Returns [`ReplayError::MalformedEvent`] if the record is not an object,
/// has no string `event_type`, lacks a numeric `game_time` where its kind
/// requires one, or has a payload that does not match its kind.
pub fn parse_event(index: usize, value: &Value) -> ReplayResult<Event> {
    let object = value
        .as_object()
        .ok_or_else(|| ReplayError::malformed(index, "event is not a JSON object"))?;

    let kind_name = match object.get("event_type") {
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(ReplayError::malformed(index, "event_type is not a string")),
        None => return Err(ReplayError::malformed(index, "missing event_type")),
    };

    let Some(kind) = EventKind::from_name(kind_name) else {
        warn!("Unknown event kind {:?} at index {}", kind_name, index);
        return Ok(Event::Unknown {
            kind: kind_name.to_string(),
            game_time: object.get("game_time").and_then(Value::as_f64),
        });
    };

    if kind.requires_game_time() {
        match object.get("game_time") {
            Some(time) if time.is_number() => {}
            Some(_) => {
                return Err(ReplayError::malformed(
                    index,
                    format!("{} game_time is not numeric", kind),
                ))
            }
            None => {
                return Err(ReplayError::malformed(
                    index,
                    format!("{} is missing game_time", kind),
                ))
            }
        }
    }

    let event = match kind {
        EventKind::SessionStart => Event::SessionStart(decode(index, kind, value)?),
        EventKind::SessionEnd => Event::SessionEnd(decode(index, kind, value)?),
        EventKind::StateSnapshot => Event::Snapshot(decode(index, kind, value)?),
        EventKind::Decision => Event::Decision(decode(index, kind, value)?),
        EventKind::Outcome => Event::Outcome(decode(index, kind, value)?),
        EventKind::Conflict => Event::Conflict(decode(index, kind, value)?),
        EventKind::IlsClearance => Event::IlsClearance(decode(index, kind, value)?),
        EventKind::Landing => Event::Landing(decode(index, kind, value)?),
    };

    Ok(event)
}

fn decode<T: DeserializeOwned>(index: usize, kind: EventKind, value: &Value) -> ReplayResult<T> {
    T::deserialize(value)
        .map_err(|err| ReplayError::malformed(index, format!("invalid {} payload: {}", kind, err)))
}

/// Accept identifiers logged either as strings or as bare numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}
