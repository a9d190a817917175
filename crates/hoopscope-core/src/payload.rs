// Provider payload model.
//
// The upstream provider sends one loosely typed JSON document per player.
// Every field is optional and numbers may arrive as strings, booleans or
// garbage, so every field here deserializes leniently: anything that does
// not make sense falls back to zero, empty or `None` instead of failing.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::event::{HalfcourtAction, Timestamp};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// An `[x, y]` court location in feet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// One player's payload.
///
/// The ten aggregate counts, their ranks and any other scalar fields are kept
/// in `fields` and read through [`PlayerPayload::count`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerPayload {
    #[serde(default, rename = "playerID", deserialize_with = "lenient_id")]
    pub player_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team: Option<String>,
    #[serde(default, rename = "pickAndRoll", deserialize_with = "lenient_bucket")]
    pub pick_and_roll: Option<Bucket>,
    #[serde(default, deserialize_with = "lenient_bucket")]
    pub isolation: Option<Bucket>,
    #[serde(default, rename = "postUp", deserialize_with = "lenient_bucket")]
    pub post_up: Option<Bucket>,
    #[serde(default, rename = "offBallScreen", deserialize_with = "lenient_bucket")]
    pub off_ball_screen: Option<Bucket>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Records grouped under one half-court action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bucket {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub shots: Vec<ShotRecord>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub passes: Vec<PassRecord>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub turnovers: Vec<TurnoverRecord>,
    /// Per-bucket totals (`totalShotAttempts`, `totalPoints`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShotRecord {
    #[serde(default, deserialize_with = "lenient_location")]
    pub loc: Option<Location>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    ts: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRecord {
    #[serde(default, deserialize_with = "lenient_location")]
    pub start_loc: Option<Location>,
    #[serde(default, deserialize_with = "lenient_location")]
    pub end_loc: Option<Location>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_potential_assist: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_turnover: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    ts: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnoverRecord {
    #[serde(default, deserialize_with = "lenient_location")]
    pub loc: Option<Location>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    ts: Option<Timestamp>,
}

impl ShotRecord {
    /// `timestamp`, falling back to `ts`.
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref().or(self.ts.as_ref())
    }
}

impl PassRecord {
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref().or(self.ts.as_ref())
    }
}

impl TurnoverRecord {
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref().or(self.ts.as_ref())
    }
}

impl PlayerPayload {
    pub fn bucket(&self, action: HalfcourtAction) -> Option<&Bucket> {
        match action {
            HalfcourtAction::PickAndRoll => self.pick_and_roll.as_ref(),
            HalfcourtAction::Isolation => self.isolation.as_ref(),
            HalfcourtAction::PostUp => self.post_up.as_ref(),
            HalfcourtAction::OffBallScreen => self.off_ball_screen.as_ref(),
        }
    }

    /// Lenient non-negative integer read of a top-level field.
    pub fn count(&self, key: &str) -> u32 {
        self.fields.get(key).map(coerce_count).unwrap_or(0)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }
}

impl Bucket {
    pub fn count(&self, key: &str) -> u32 {
        self.fields.get(key).map(coerce_count).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Parsing entry points
// ---------------------------------------------------------------------------

/// Parse a raw document into a payload.
///
/// Accepts either the bare payload or the `{ "apiResponse": ... }` envelope.
/// Returns `Ok(None)` when the document carries no payload (`null`, an empty
/// envelope, or a non-object value).
pub fn parse_payload(raw: &str) -> Result<Option<PlayerPayload>, PayloadError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(payload_from_value(value))
}

/// Build a payload from an already-decoded JSON value. See [`parse_payload`].
pub fn payload_from_value(value: Value) -> Option<PlayerPayload> {
    let inner = match value {
        Value::Object(mut obj) if obj.contains_key("apiResponse") => {
            obj.remove("apiResponse").unwrap_or(Value::Null)
        }
        other => other,
    };
    match inner {
        Value::Object(_) => match serde_json::from_value(inner) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!("payload object rejected: {e}");
                None
            }
        },
        Value::Null => None,
        other => {
            debug!("ignoring non-object payload: {other}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Numeric value of a loosely typed field. Non-numeric values are 0.
pub fn coerce_f64(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Non-negative integer value of a loosely typed field. Negative values
/// clamp to 0; fractions truncate.
pub fn coerce_count(v: &Value) -> u32 {
    let n = coerce_f64(v);
    if n <= 0.0 {
        0
    } else if n >= u32::MAX as f64 {
        u32::MAX
    } else {
        n as u32
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(coerce_f64(&Value::deserialize(d)?))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(truthy(&Value::deserialize(d)?))
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = Value::deserialize(d)?;
    let n = match &v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(n)
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_location<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Location>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Array(items) => Some(Location {
            x: items.first().map(coerce_f64).unwrap_or(0.0),
            y: items.get(1).map(coerce_f64).unwrap_or(0.0),
        }),
        _ => None,
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().map(Timestamp::Number),
        Value::String(s) => Some(Timestamp::Text(s)),
        Value::Null => None,
        other => {
            debug!("dropping timestamp with unsupported shape: {other}");
            None
        }
    })
}

fn lenient_bucket<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Bucket>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
