//! # dirtsim-proto::codec
//!
//! The envelope codec: converts between an [`Envelope`] and bytes in
//! either wire format (spec §4.1). Binary framing is recursive-descent
//! over primitives in declaration order; JSON framing is the
//! `{command,...}` / `{id, value|error}` / `{_type,...}` shape browsers
//! and the CLI use directly.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use dirtsim_types::envelope::Envelope;
use dirtsim_types::errors::CodecError;

/// Encodes one envelope as a binary frame: length-prefixed UTF-8 name,
/// little-endian `id`, length-prefixed payload.
pub fn encode_binary(env: &Envelope) -> Bytes {
    let name_bytes = env.message_type.as_bytes();
    let mut buf = BytesMut::with_capacity(4 + name_bytes.len() + 8 + 4 + env.payload.len());
    buf.put_u32_le(name_bytes.len() as u32);
    buf.put_slice(name_bytes);
    buf.put_u64_le(env.id);
    buf.put_u32_le(env.payload.len() as u32);
    buf.put_slice(&env.payload);
    buf.freeze()
}

/// Decodes one binary frame into an [`Envelope`]. `max_payload_bytes`
/// enforces the configured size ceiling (spec §4.1 default 16 MB).
pub fn decode_binary(mut bytes: Bytes, max_payload_bytes: usize) -> Result<Envelope, CodecError> {
    if bytes.len() < 4 {
        return Err(CodecError::Truncated {
            expected: 4,
            actual: bytes.len(),
        });
    }
    let name_len = bytes.get_u32_le() as usize;
    if bytes.len() < name_len {
        return Err(CodecError::Truncated {
            expected: name_len,
            actual: bytes.len(),
        });
    }
    let name_bytes = bytes.split_to(name_len);
    let message_type = String::from_utf8(name_bytes.to_vec())
        .map_err(|e| CodecError::Other(format!("message_type not utf-8: {e}")))?;

    if bytes.len() < 8 {
        return Err(CodecError::Truncated {
            expected: 8,
            actual: bytes.len(),
        });
    }
    let id = bytes.get_u64_le();

    if bytes.len() < 4 {
        return Err(CodecError::Truncated {
            expected: 4,
            actual: bytes.len(),
        });
    }
    let payload_len = bytes.get_u32_le() as usize;
    if payload_len > max_payload_bytes {
        return Err(CodecError::SizeExceeded {
            actual: payload_len,
            max: max_payload_bytes,
        });
    }
    if bytes.len() < payload_len {
        return Err(CodecError::Truncated {
            expected: payload_len,
            actual: bytes.len(),
        });
    }
    let payload = bytes.split_to(payload_len);

    Ok(Envelope {
        message_type,
        id,
        payload,
    })
}

/// A JSON request frame: `{"command": Name, ...fields}` (spec §4.1/§6).
/// `fields` is the flattened request body; callers re-serialize it
/// together with `command` rather than nesting it under a `payload` key.
pub fn encode_json_request(message_type: &str, fields: serde_json::Value) -> serde_json::Value {
    let mut obj = match fields {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    obj.insert(
        "command".to_string(),
        serde_json::Value::String(message_type.to_string()),
    );
    serde_json::Value::Object(obj)
}

/// A JSON response frame: `{"id": id, "value": {...}}` on success or
/// `{"id": id, "error": {"message": "..."}}` on failure.
pub fn encode_json_response(
    id: u64,
    result: &Result<serde_json::Value, dirtsim_types::errors::ApiError>,
) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("id".to_string(), serde_json::Value::from(id));
    match result {
        Ok(value) => {
            obj.insert("value".to_string(), value.clone());
        }
        Err(err) => {
            let mut error_obj = serde_json::Map::new();
            error_obj.insert(
                "message".to_string(),
                serde_json::Value::String(err.message.clone()),
            );
            obj.insert("error".to_string(), serde_json::Value::Object(error_obj));
        }
    }
    serde_json::Value::Object(obj)
}

/// Extracts the `command` name and remaining fields from a JSON request
/// frame -- the inverse of [`encode_json_request`].
pub fn decode_json_request(mut value: serde_json::Value) -> Result<(String, serde_json::Value), CodecError> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| CodecError::Other("request frame is not a JSON object".to_string()))?;
    let command = obj
        .remove("command")
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| CodecError::Other("request frame missing 'command' field".to_string()))?;
    Ok((command, value))
}

/// Tagged shape a binary response's payload carries, since a raw
/// `Result<Value, ApiError>` has no self-describing binary form of its own.
#[derive(serde::Serialize, serde::Deserialize)]
enum BinaryResult {
    Value(serde_json::Value),
    Error(dirtsim_types::errors::ApiError),
}

/// Encodes a binary response envelope, reusing the request's `message_type`
/// and `id` (spec §4.1: responses are paired to requests by id, not name).
pub fn encode_binary_response(
    message_type: &str,
    id: u64,
    result: &Result<serde_json::Value, dirtsim_types::errors::ApiError>,
) -> Result<Bytes, CodecError> {
    let tagged = match result {
        Ok(value) => BinaryResult::Value(value.clone()),
        Err(err) => BinaryResult::Error(err.clone()),
    };
    let payload = postcard::to_allocvec(&tagged).map_err(|e| CodecError::Other(e.to_string()))?;
    Ok(encode_binary(&Envelope::request(message_type, id, Bytes::from(payload))))
}

/// Decodes a binary response payload back into `Result<Value, ApiError>`,
/// the inverse of [`encode_binary_response`].
pub fn decode_binary_response(
    payload: &[u8],
) -> Result<Result<serde_json::Value, dirtsim_types::errors::ApiError>, CodecError> {
    let tagged: BinaryResult = postcard::from_bytes(payload).map_err(|e| CodecError::Other(e.to_string()))?;
    Ok(match tagged {
        BinaryResult::Value(v) => Ok(v),
        BinaryResult::Error(e) => Err(e),
    })
}

/// Encodes a binary broadcast envelope (spec §4.3 "Broadcasts"): `id = 0`,
/// payload is the broadcast's JSON fields re-framed as postcard bytes.
pub fn encode_binary_broadcast(message_type: &str, json: &serde_json::Value) -> Result<Bytes, CodecError> {
    let payload = postcard::to_allocvec(json).map_err(|e| CodecError::Other(e.to_string()))?;
    Ok(encode_binary(&Envelope::broadcast(message_type, Bytes::from(payload))))
}

/// Decodes a binary broadcast's payload back into JSON, the inverse of
/// [`encode_binary_broadcast`].
pub fn decode_binary_broadcast(payload: &[u8]) -> Result<serde_json::Value, CodecError> {
    postcard::from_bytes(payload).map_err(|e| CodecError::Other(e.to_string()))
}

/// A JSON broadcast frame: `{"_type": Name, ...fields}`.
pub fn encode_json_broadcast(message_type: &str, fields: serde_json::Value) -> serde_json::Value {
    let mut obj = match fields {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    obj.insert(
        "_type".to_string(),
        serde_json::Value::String(message_type.to_string()),
    );
    serde_json::Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_round_trip() {
        let env = Envelope::request("StatusGet", 7, Bytes::from_static(b"hello"));
        let encoded = encode_binary(&env);
        let decoded = decode_binary(encoded, 1024).unwrap();
        assert_eq!(decoded.message_type, "StatusGet");
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.payload, Bytes::from_static(b"hello"));
    }

    #[test]
    fn binary_truncated_is_rejected() {
        let bad = Bytes::from_static(&[1, 0, 0, 0]);
        assert!(decode_binary(bad, 1024).is_err());
    }

    #[test]
    fn binary_size_limit_is_enforced() {
        let env = Envelope::request("Big", 1, Bytes::from(vec![0u8; 100]));
        let encoded = encode_binary(&env);
        let err = decode_binary(encoded, 10).unwrap_err();
        assert!(matches!(err, CodecError::SizeExceeded { .. }));
    }

    #[test]
    fn json_request_round_trips_command_and_fields() {
        let frame = encode_json_request("SimRun", serde_json::json!({"timestep": 0.1}));
        let (command, fields) = decode_json_request(frame).unwrap();
        assert_eq!(command, "SimRun");
        assert_eq!(fields["timestep"], 0.1);
        assert!(fields.get("command").is_none());
    }

    #[test]
    fn binary_response_round_trips_value_and_error() {
        let ok = encode_binary_response("StatusGet", 3, &Ok(serde_json::json!({"state": "Idle"}))).unwrap();
        let env = decode_binary(ok, 1024).unwrap();
        assert_eq!(env.id, 3);
        let decoded = decode_binary_response(&env.payload).unwrap().unwrap();
        assert_eq!(decoded["state"], "Idle");

        let err = encode_binary_response("SimRun", 4, &Err(dirtsim_types::errors::ApiError::validation("bad"))).unwrap();
        let env = decode_binary(err, 1024).unwrap();
        let decoded = decode_binary_response(&env.payload).unwrap();
        assert!(decoded.is_err());
    }

    #[test]
    fn binary_broadcast_round_trips() {
        let payload = serde_json::json!({"generation": 3});
        let frame = encode_binary_broadcast("EvolutionGeneration", &payload).unwrap();
        let env = decode_binary(frame, 1024).unwrap();
        assert!(env.is_broadcast());
        assert_eq!(decode_binary_broadcast(&env.payload).unwrap(), payload);
    }

    #[test]
    fn json_response_shapes_success_and_error() {
        let ok = encode_json_response(3, &Ok(serde_json::json!({"state": "Idle"})));
        assert_eq!(ok["id"], 3);
        assert_eq!(ok["value"]["state"], "Idle");

        let err = encode_json_response(
            4,
            &Err(dirtsim_types::errors::ApiError::validation("bad input")),
        );
        assert_eq!(err["error"]["message"], "bad input");
    }
}
