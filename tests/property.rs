//! Property-based tests for the streaming codecs.
//!
//! These fuzz the encode/decode pair across payload sizes, masking modes,
//! fragmentation layouts and chunk boundaries.

use bytes::Bytes;
use proptest::prelude::*;
use wsgate::protocol::{
    decode_hixie_length, decode_payload_length, encode_hixie_length, encode_payload_length,
};
use wsgate::{
    Config, FrameDecoder, FrameEncoder, HixieDecoder, HixieEncoder, Kind, Message,
    MessageAssembler, SharedMessage,
};

fn data_message_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..1000).prop_map(|v| Message::binary(v)),
        prop::collection::vec(any::<u8>(), 0..1000).prop_map(|v| Message::Text {
            data: Bytes::from(v),
            fin: true,
        }),
        prop::collection::vec(any::<u8>(), 0..=125).prop_map(|v| Message::ping(v)),
        prop::collection::vec(any::<u8>(), 0..=125).prop_map(|v| Message::pong(v)),
    ]
}

proptest! {
    // =========================================================================
    // Property 1: decode(encode(m)) == m, unmasked
    // =========================================================================
    #[test]
    fn roundtrip_unmasked(message in data_message_strategy()) {
        let mut enc = FrameEncoder::new(&Config::new());
        let mut dec = FrameDecoder::new(Config::new());

        let wire = enc.encode(&message).unwrap();
        prop_assert_eq!(dec.decode(&wire).unwrap(), vec![message]);
    }

    // =========================================================================
    // Property 2: decode(encode(m)) == m through client-role masking
    // =========================================================================
    #[test]
    fn roundtrip_masked(message in data_message_strategy()) {
        let mut enc = FrameEncoder::new(&Config::client());
        let mut dec = FrameDecoder::new(Config::server());

        let wire = enc.encode(&message).unwrap();
        prop_assert_eq!(wire[1] & 0x80, 0x80, "masking bit must be set");
        prop_assert_eq!(dec.decode(&wire).unwrap(), vec![message]);
    }

    // =========================================================================
    // Property 3: vectored encode is byte-identical to contiguous encode
    // =========================================================================
    #[test]
    fn vectored_equals_contiguous(payload in prop::collection::vec(any::<u8>(), 0..2000)) {
        let message = Message::binary(payload);
        let mut enc = FrameEncoder::new(&Config::new());

        let contiguous = enc.encode(&message).unwrap();
        let (header, body) = enc.encode_vectored(&message).unwrap();

        let mut joined = header.to_vec();
        joined.extend_from_slice(&body);
        prop_assert_eq!(joined, contiguous.to_vec());
    }

    // =========================================================================
    // Property 4: a fragmented message reassembles identically no matter
    // where the input is split
    // =========================================================================
    #[test]
    fn fragmented_reassembles_at_any_split(
        payload in prop::collection::vec(any::<u8>(), 2..400),
        cut1_frac in 0.0f64..1.0,
        cut2_frac in 0.0f64..1.0,
        wire_split_frac in 0.0f64..1.0,
    ) {
        let len = payload.len();
        let mut cuts = [
            (cut1_frac * len as f64) as usize,
            (cut2_frac * len as f64) as usize,
        ];
        cuts.sort_unstable();
        let (a, b) = (cuts[0].min(len), cuts[1].min(len));

        let mut enc = FrameEncoder::new(&Config::new());
        let mut wire = Vec::new();
        wire.extend_from_slice(
            &enc.encode(&Message::fragment_start(Kind::Binary, payload[..a].to_vec())).unwrap(),
        );
        wire.extend_from_slice(
            &enc.encode(&Message::continuation(payload[a..b].to_vec(), false)).unwrap(),
        );
        wire.extend_from_slice(
            &enc.encode(&Message::continuation(payload[b..].to_vec(), true)).unwrap(),
        );

        let split = ((wire_split_frac * wire.len() as f64) as usize).min(wire.len());
        let mut dec = FrameDecoder::new(Config::new());
        let mut asm = MessageAssembler::new(Config::new());

        let mut complete = Vec::new();
        for chunk in [&wire[..split], &wire[split..]] {
            for event in dec.decode(chunk).unwrap() {
                if let Some(message) = asm.push(event).unwrap() {
                    complete.push(message);
                }
            }
        }
        prop_assert_eq!(complete, vec![Message::binary(payload)]);
    }

    // =========================================================================
    // Property 5: RFC 6455 length field round-trips with its masking bit
    // =========================================================================
    #[test]
    fn rfc_length_roundtrip(len in 0u64..(1 << 63), masked in any::<bool>()) {
        let mut out = bytes::BytesMut::new();
        encode_payload_length(&mut out, len, masked);
        let decoded = decode_payload_length(&out).unwrap();
        prop_assert_eq!(decoded.len, len);
        prop_assert_eq!(decoded.masked, masked);
        prop_assert_eq!(decoded.consumed, out.len());
    }

    // =========================================================================
    // Property 6: Hixie length encoding round-trips over the full u64 range
    // =========================================================================
    #[test]
    fn hixie_length_roundtrip(len in any::<u64>()) {
        let mut out = bytes::BytesMut::new();
        encode_hixie_length(&mut out, len);
        prop_assert_eq!(decode_hixie_length(&out).unwrap(), (len, out.len()));
    }

    // =========================================================================
    // Property 7: Hixie text round-trips (payload bytes below the terminator)
    // =========================================================================
    #[test]
    fn hixie_text_roundtrip(payload in prop::collection::vec(0u8..=254, 0..500)) {
        let message = Message::Text { data: Bytes::from(payload), fin: true };
        let enc = HixieEncoder::new();
        let mut dec = HixieDecoder::new(Config::new());

        let wire = enc.encode(&message).unwrap();
        prop_assert_eq!(dec.decode(&wire).unwrap(), vec![message]);
    }

    // =========================================================================
    // Property 8: Hixie binary round-trips at any chunk boundary
    // =========================================================================
    #[test]
    fn hixie_binary_roundtrip_any_split(
        payload in prop::collection::vec(any::<u8>(), 0..500),
        split_frac in 0.0f64..1.0,
    ) {
        let message = Message::binary(payload);
        let enc = HixieEncoder::new();
        let mut dec = HixieDecoder::new(Config::new());

        let wire = enc.encode(&message).unwrap();
        let split = ((split_frac * wire.len() as f64) as usize).min(wire.len());

        let mut messages = dec.decode(&wire[..split]).unwrap();
        messages.extend(dec.decode(&wire[split..]).unwrap());
        prop_assert_eq!(messages, vec![message]);
    }

    // =========================================================================
    // Property 9: the shared cache never changes the bytes
    // =========================================================================
    #[test]
    fn shared_encode_is_byte_identical(payload in prop::collection::vec(any::<u8>(), 0..1000)) {
        let message = Message::binary(payload);
        let shared = SharedMessage::new(message.clone());

        let mut enc_a = FrameEncoder::new(&Config::new());
        let mut enc_b = FrameEncoder::new(&Config::new());

        let fresh = enc_a.encode(&message).unwrap();
        let cached_first = enc_a.encode_shared(&shared).unwrap();
        let cached_again = enc_b.encode_shared(&shared).unwrap();

        prop_assert_eq!(&fresh, &cached_first);
        prop_assert_eq!(&cached_first, &cached_again);
    }

    // =========================================================================
    // Property 10: truncated input never produces a message or an error,
    // and the retained bytes finish the frame later
    // =========================================================================
    #[test]
    fn truncated_input_is_retained(
        payload in prop::collection::vec(any::<u8>(), 1..300),
        cut_frac in 0.0f64..1.0,
    ) {
        let message = Message::binary(payload);
        let mut enc = FrameEncoder::new(&Config::new());
        let wire = enc.encode(&message).unwrap();

        // Strictly inside the frame.
        let cut = 1 + ((cut_frac * (wire.len() - 2) as f64) as usize);

        let mut dec = FrameDecoder::new(Config::new());
        prop_assert!(dec.decode(&wire[..cut]).unwrap().is_empty());
        prop_assert_eq!(dec.decode(&wire[cut..]).unwrap(), vec![message]);
    }
}

mod boundaries {
    use super::*;

    #[test]
    fn size_limit_exact_and_one_over() {
        let config = Config::new().with_max_message_size(1000);

        let mut enc = FrameEncoder::new(&Config::new());
        let mut dec = FrameDecoder::new(config.clone());
        let at_limit = enc.encode(&Message::binary(vec![0u8; 1000])).unwrap();
        assert_eq!(dec.decode(&at_limit).unwrap().len(), 1);

        // One byte over: only the header is delivered, the error is
        // already raised.
        let mut dec = FrameDecoder::new(config);
        let over = enc.encode(&Message::binary(vec![0u8; 1001])).unwrap();
        let header_only = &over[..4];
        assert!(matches!(
            dec.decode(header_only),
            Err(wsgate::Error::MessageTooLarge {
                size: 1001,
                max: 1000
            })
        ));
    }

    #[test]
    fn masking_mismatch_fails_without_payload() {
        // Masked frame against a no-masking policy: header only.
        let mut dec = FrameDecoder::new(Config::new());
        assert!(matches!(
            dec.decode(&[0x81, 0x85, 0x01, 0x02, 0x03, 0x04]),
            Err(wsgate::Error::UnexpectedMaskedFrame)
        ));

        // Unmasked frame against a masking-required policy.
        let mut dec = FrameDecoder::new(Config::server());
        assert!(matches!(
            dec.decode(&[0x81, 0x05]),
            Err(wsgate::Error::ExpectedMaskedFrame)
        ));
    }

    #[test]
    fn known_vector_binary_frame() {
        let mut dec = FrameDecoder::new(Config::new());
        let messages = dec.decode(&[0x82, 0x03, 0x41, 0x42, 0x43]).unwrap();
        assert_eq!(
            messages,
            vec![Message::Binary {
                data: Bytes::from_static(&[0x41, 0x42, 0x43]),
                fin: true,
            }]
        );
    }

    #[test]
    fn known_vector_legacy_text_frame() {
        let mut dec = HixieDecoder::new(Config::new());
        let messages = dec.decode(&[0x00, b'H', b'i', 0xFF]).unwrap();
        assert_eq!(messages, vec![Message::text("Hi")]);
    }

    #[test]
    fn legacy_text_limit_trips_mid_chunk() {
        let mut dec = HixieDecoder::new(Config::new().with_max_message_size(8));
        // One chunk, 20 unterminated payload bytes: the scan must stop at
        // the limit rather than consume the rest of the chunk.
        let mut wire = vec![0x00];
        wire.extend_from_slice(&[b'z'; 20]);
        assert!(matches!(
            dec.decode(&wire),
            Err(wsgate::Error::MessageTooLarge { .. })
        ));
    }

    #[test]
    fn control_payload_limit_boundary() {
        let mut enc = FrameEncoder::new(&Config::new());
        assert!(enc.encode(&Message::ping(vec![0u8; 125])).is_ok());
        assert!(matches!(
            enc.encode(&Message::ping(vec![0u8; 126])),
            Err(wsgate::Error::ControlFrameTooLarge(126))
        ));
    }
}
