//! Response envelope normalization
//!
//! The backend wraps payloads inconsistently: `{success, data}`, `{data}`,
//! `{salones: [...]}`, paginated `{data: {data: [...]}}`, or the bare value.
//! Each gateway operation lists the shapes it accepts, in order of preference;
//! the first shape that matches and decodes wins. A body matching none of them
//! is an [`ClientError::InvalidResponse`], never an empty result.

use crate::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One accepted response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"success": true, "data": X}`
    SuccessData,
    /// `{"data": X}` regardless of `success`
    Data,
    /// Laravel paginator: `{"data": {"data": X}}`
    PagedData,
    /// `{"<name>": X}`
    Field(&'static str),
    /// The body itself
    Bare,
}

impl Shape {
    fn extract<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        let present = |v: &'a Value| (!v.is_null()).then_some(v);
        match self {
            Self::SuccessData => {
                if body.get("success").and_then(Value::as_bool) == Some(true) {
                    body.get("data").and_then(present)
                } else {
                    None
                }
            }
            Self::Data => body.get("data").and_then(present),
            Self::PagedData => body
                .get("data")
                .and_then(|inner| inner.get("data"))
                .and_then(present),
            Self::Field(name) => body.get(*name).and_then(present),
            Self::Bare => present(body),
        }
    }
}

/// Shapes for list endpoints keyed by resource (`/ajustes/salones` -> `salones`)
pub const fn list_shapes(field: &'static str) -> [Shape; 4] {
    [Shape::Data, Shape::PagedData, Shape::Field(field), Shape::Bare]
}

/// Shapes for endpoints that echo one record
pub const RECORD_SHAPES: [Shape; 2] = [Shape::Data, Shape::Bare];

/// Decode `body` through the first accepted shape that fits `T`.
pub fn decode<T: DeserializeOwned>(body: &Value, accepted: &[Shape]) -> ClientResult<T> {
    let mut last_error = None;
    for shape in accepted {
        let Some(inner) = shape.extract(body) else {
            continue;
        };
        match serde_json::from_value::<T>(inner.clone()) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => last_error = Some(format!("{shape:?}: {e}")),
        }
    }
    Err(ClientError::InvalidResponse(last_error.unwrap_or_else(|| {
        format!("expected one of {accepted:?}, got {}", describe(body))
    })))
}

/// Server message carried by a success body, if any.
pub fn message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn describe(body: &Value) -> String {
    match body {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Null => "empty body".to_string(),
        other => format!("scalar {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::Room;

    #[test]
    fn list_shapes_accept_every_known_wrapper() {
        let room = json!({"id_salon": 1, "descripcion": "Terraza", "estado": "activo"});
        let bodies = [
            json!({"success": true, "data": [room.clone()]}),
            json!({"data": {"current_page": 1, "data": [room.clone()]}}),
            json!({"salones": [room.clone()]}),
            json!([room.clone()]),
        ];
        for body in bodies {
            let rooms: Vec<Room> = decode(&body, &list_shapes("salones")).unwrap();
            assert_eq!(rooms.len(), 1, "{body}");
            assert_eq!(rooms[0].description, "Terraza");
        }
    }

    #[test]
    fn unrecognized_shape_is_an_error_not_empty() {
        let err = decode::<Vec<Room>>(&json!({"rooms": []}), &list_shapes("salones")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn success_data_requires_success_flag() {
        let body = json!({"success": false, "data": {"x": 1}});
        assert!(decode::<Value>(&body, &[Shape::SuccessData]).is_err());
        let body = json!({"success": true, "data": {"x": 1}});
        assert_eq!(decode::<Value>(&body, &[Shape::SuccessData]).unwrap()["x"], 1);
    }

    #[test]
    fn null_body_matches_nothing() {
        assert!(decode::<Value>(&Value::Null, &RECORD_SHAPES).is_err());
    }
}
