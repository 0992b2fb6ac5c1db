//! Round-trip laws for the wire codec (spec framing in
//! `dirtsim-proto::codec`, `dirtsim-types::envelope`).

use bytes::Bytes;
use dirtsim_proto::codec::{
    decode_binary, decode_binary_broadcast, decode_binary_response, decode_json_request, encode_binary,
    encode_binary_broadcast, encode_binary_response, encode_json_request,
};
use dirtsim_types::envelope::Envelope;
use dirtsim_types::errors::ApiError;
use proptest::prelude::*;

fn message_type_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,16}"
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

proptest! {
    #[test]
    fn binary_envelope_round_trips(
        message_type in message_type_strategy(),
        id in any::<u64>(),
        payload in payload_strategy(),
    ) {
        let env = Envelope::request(message_type.clone(), id, Bytes::from(payload.clone()));
        let encoded = encode_binary(&env);
        let decoded = decode_binary(encoded, usize::MAX).unwrap();
        prop_assert_eq!(decoded.message_type, message_type);
        prop_assert_eq!(decoded.id, id);
        prop_assert_eq!(decoded.payload.to_vec(), payload);
    }

    #[test]
    fn binary_envelope_rejects_payloads_over_the_limit(
        message_type in message_type_strategy(),
        payload in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let env = Envelope::request(message_type, 1, Bytes::from(payload.clone()));
        let encoded = encode_binary(&env);
        prop_assert!(decode_binary(encoded, payload.len() - 1).is_err());
    }

    #[test]
    fn json_request_round_trips_command_name(
        message_type in message_type_strategy(),
        timestep in any::<f64>(),
    ) {
        prop_assume!(timestep.is_finite());
        let frame = encode_json_request(&message_type, serde_json::json!({ "timestep": timestep }));
        let (command, fields) = decode_json_request(frame).unwrap();
        prop_assert_eq!(command, message_type);
        prop_assert_eq!(fields["timestep"].as_f64().unwrap(), timestep);
        prop_assert!(fields.get("command").is_none());
    }

    #[test]
    fn binary_response_round_trips_ok_values(value in any::<i64>()) {
        let encoded = encode_binary_response("Probe", 9, &Ok(serde_json::json!(value))).unwrap();
        let env = decode_binary(encoded, usize::MAX).unwrap();
        prop_assert_eq!(env.id, 9);
        let decoded = decode_binary_response(&env.payload).unwrap().unwrap();
        prop_assert_eq!(decoded.as_i64().unwrap(), value);
    }

    #[test]
    fn binary_response_round_trips_errors(message in "[ -~]{0,64}") {
        let encoded = encode_binary_response("Probe", 9, &Err(ApiError::validation(message.clone()))).unwrap();
        let env = decode_binary(encoded, usize::MAX).unwrap();
        let decoded = decode_binary_response(&env.payload).unwrap();
        prop_assert!(decoded.is_err());
        prop_assert_eq!(decoded.unwrap_err().message, message);
    }

    #[test]
    fn binary_broadcast_round_trips(generation in any::<u32>()) {
        let payload = serde_json::json!({ "generation": generation });
        let frame = encode_binary_broadcast("EvolutionProgress", &payload).unwrap();
        let env = decode_binary(frame, usize::MAX).unwrap();
        prop_assert!(env.is_broadcast());
        prop_assert_eq!(decode_binary_broadcast(&env.payload).unwrap(), payload);
    }
}
