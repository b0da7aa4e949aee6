//! Typed request contracts for the map routes.
//!
//! Each endpoint deserializes into a loose wire struct and then runs a single
//! `validate` step that yields either a well-formed command or a 400
//! `AppError`. Nothing reaches storage before validation succeeds.

use crate::{errors::AppError, models::map_record::MapPayloadUpdate};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Query accepted by `GET /one`.
#[derive(Debug, Default)]
pub struct GetOneQuery {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// How a single record is located. `id` wins when both are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSelector {
    Id(i64),
    Name(String),
}

impl GetOneQuery {
    /// Build from raw query pairs. The first value of a repeated key wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "id" => &mut query.id,
                "name" => &mut query.name,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn into_selector(self) -> Result<MapSelector, AppError> {
        if let Some(raw) = non_empty(self.id) {
            return leading_integer(&raw)
                .map(MapSelector::Id)
                .ok_or_else(|| AppError::bad_request("Invalid ID format"));
        }
        if let Some(name) = non_empty(self.name) {
            return Ok(MapSelector::Name(name));
        }
        Err(AppError::bad_request("No identifier provided"))
    }
}

/// Body of `POST /create`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMapRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub map: Option<String>,
    pub uri: Option<String>,
    pub creator: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMap {
    pub name: String,
    pub description: Option<String>,
    pub map: Option<String>,
    pub uri: Option<String>,
    pub creator: String,
}

impl CreateMapRequest {
    pub fn validate(self) -> Result<CreateMap, AppError> {
        let name = required(self.name, "name")?;
        let creator = required(self.creator, "creator")?;
        Ok(CreateMap {
            name,
            description: self.description,
            map: self.map,
            uri: self.uri,
            creator,
        })
    }
}

/// Body of `POST /update`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMapRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "nullable_opaque_text")]
    pub map: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub uri: Option<Option<String>>,
}

/// An update request that passed validation.
#[derive(Debug, Clone)]
pub struct UpdateMap {
    pub id: i64,
    pub payload: MapPayloadUpdate,
}

impl UpdateMapRequest {
    pub fn validate(self) -> Result<UpdateMap, AppError> {
        let id = update_id(self.id)?;
        Ok(UpdateMap {
            id,
            payload: MapPayloadUpdate {
                map: self.map,
                uri: self.uri,
            },
        })
    }
}

/// Parse a raw request body as JSON.
///
/// An empty (or whitespace-only) body is "No data provided"; anything that
/// does not deserialize into `T` is "Invalid JSON body".
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("No data provided"));
    }
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "rejecting request body");
        AppError::bad_request("Invalid JSON body")
    })
}

/// Integer value of the leading, optionally signed, digit run of `raw`
/// after leading whitespace: `"12abc"` is 12, `"1.5"` is 1, `"abc"` is none.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse::<i64>().ok()
}

/// Accept `id` as an integer or a numeric string. Absent, null, `false`,
/// `0` and `""` all count as missing.
fn update_id(raw: Option<Value>) -> Result<i64, AppError> {
    let missing = || AppError::bad_request("Missing ID for update");
    let invalid = || AppError::bad_request("Invalid ID format");

    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(missing()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Err(missing()),
            Some(id) => Ok(id),
            None if n.as_f64() == Some(0.0) => Err(missing()),
            None => Err(invalid()),
        },
        Some(Value::String(s)) if s.is_empty() => Err(missing()),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    non_empty(value).ok_or_else(|| AppError::bad_request(format!("Missing field: {field}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The map payload is opaque: strings are kept verbatim, any other JSON
/// value is stored as its JSON text.
fn opaque_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Present-but-null becomes `Some(None)`; an absent key stays `None` via
/// `#[serde(default)]`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn nullable_opaque_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    opaque_text(deserializer).map(Some)
}
