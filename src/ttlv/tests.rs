use std::io::Cursor;

use serde::{Deserialize, Serialize};
use time::macros::datetime;

use crate::{
    kmip_1_4::{
        kmip_data_structures::{Attribute, AttributeValue, KeyBlock, TemplateAttribute},
        kmip_messages::{
            RequestMessage, RequestMessageBatchItem, RequestMessageHeader, ResponseMessage,
            ResponseMessageBatchItem, ResponseMessageHeader,
        },
        kmip_objects::{Object, SymmetricKey},
        kmip_operations::{
            Create, DiscoverVersions, GetResponse, Operation, Query,
        },
        kmip_types::{
            Authentication, Credential, CredentialType, CredentialValue, CryptographicAlgorithm,
            ObjectType, ProtocolVersion, QueryFunction, ResultStatusEnumeration,
            UsernameAndPasswordCredential,
        },
    },
    registry::default_registry,
    ttlv::{
        from_ttlv, to_ttlv,
        wire::{MessageFramer, TtlvEncoder, TtlvView, TtlvWireReader, TtlvWireWriter},
        KmipBigInt, TTLValue, TtlvError, TTLV,
    },
};

fn wire_round_trip(ttlv: &TTLV) -> (Vec<u8>, TTLV) {
    let registry = default_registry();
    let bytes = TtlvWireWriter::new(&registry).to_bytes(ttlv).unwrap();
    let decoded = TtlvWireReader::new(&registry, true).from_bytes(&bytes).unwrap();
    (bytes, decoded)
}

#[test]
fn test_text_string_padding() {
    // "foo" under tag 0x420020 pads to the next 8-byte boundary
    let mut encoder = TtlvEncoder::new();
    encoder.text_string(0x0042_0020, "foo").unwrap();
    assert_eq!(
        encoder.into_bytes(),
        vec![
            0x42, 0x00, 0x20, 0x07, 0x00, 0x00, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x00, 0x00, 0x00,
            0x00, 0x00
        ]
    );
}

#[test]
fn test_big_integer_sign_extension() {
    let mut encoder = TtlvEncoder::new();
    encoder
        .big_integer(0x0042_0052, &KmipBigInt::from(-1))
        .unwrap();
    let bytes = encoder.into_bytes();
    assert_eq!(
        bytes,
        vec![
            0x42, 0x00, 0x52, 0x04, 0x00, 0x00, 0x00, 0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF
        ]
    );
    let view = TtlvView::parse(&bytes).unwrap();
    assert_eq!(view.value_big_integer().unwrap(), KmipBigInt::from(-1));
}

#[test]
fn test_integer_padding_and_full_len() {
    let mut encoder = TtlvEncoder::new();
    encoder.integer(0x0042_000D, 8).unwrap();
    let bytes = encoder.into_bytes();
    assert_eq!(bytes.len(), 16);
    let view = TtlvView::parse(&bytes).unwrap();
    assert_eq!(view.length(), 4);
    assert_eq!(view.full_len(), 16);
    assert_eq!(view.value_integer().unwrap(), 8);
}

#[test]
fn test_structure_length_accounting() {
    let mut encoder = TtlvEncoder::new();
    encoder
        .structure(0x0042_0078, |e| {
            e.integer(0x0042_000D, 1)?;
            e.text_string(0x0042_0099, "alice")?;
            e.boolean(0x0042_0010, true)
        })
        .unwrap();
    let bytes = encoder.into_bytes();
    assert_eq!(bytes.len() % 8, 0);

    let view = TtlvView::parse(&bytes).unwrap();
    view.validate(true).unwrap();
    let children: Vec<_> = view
        .children()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let child_total: usize = children.iter().map(TtlvView::full_len).sum();
    assert_eq!(view.length(), child_total);
    for child in &children {
        assert_eq!(child.full_len() % 8, 0);
    }
}

#[test]
fn test_strict_padding_validation() {
    let mut encoder = TtlvEncoder::new();
    encoder.text_string(0x0042_0099, "alice").unwrap();
    let mut bytes = encoder.into_bytes();
    // corrupt the last padding byte
    *bytes.last_mut().unwrap() = 0x5A;
    let view = TtlvView::parse(&bytes).unwrap();
    assert!(matches!(
        view.validate(true),
        Err(TtlvError::InvalidPadding)
    ));
    // lenient parsing accepts it
    view.validate(false).unwrap();
}

#[test]
fn test_boolean_bit_pattern() {
    let mut encoder = TtlvEncoder::new();
    encoder.boolean(0x0042_0010, true).unwrap();
    let mut bytes = encoder.into_bytes();
    bytes[15] = 0x02;
    let view = TtlvView::parse(&bytes).unwrap();
    assert!(matches!(
        view.validate(false),
        Err(TtlvError::InvalidBoolean)
    ));
}

#[test]
fn test_truncated_item() {
    let mut encoder = TtlvEncoder::new();
    encoder.text_string(0x0042_0099, "alice").unwrap();
    let bytes = encoder.into_bytes();
    assert!(matches!(
        TtlvView::parse(&bytes[..bytes.len() - 1]),
        Err(TtlvError::Truncated(_))
    ));
    assert!(matches!(
        TtlvView::parse(&bytes[..5]),
        Err(TtlvError::Truncated(_))
    ));
}

#[test]
fn test_wire_tree_round_trip() {
    let now = datetime!(2024-06-01 12:30:00 UTC);
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![
            TTLV::new("BatchCount", TTLValue::Integer(42)),
            TTLV::new("MaximumResponseSize", TTLValue::LongInteger(-42)),
            TTLV::new(
                "Modulus",
                TTLValue::BigInteger(KmipBigInt::from(1_234_567_890_123_456_789)),
            ),
            TTLV::new("BatchOrderOption", TTLValue::Boolean(true)),
            TTLV::new("Username", TTLValue::TextString("blah".to_owned())),
            TTLV::new("Data", TTLValue::ByteString(b"hello".to_vec())),
            TTLV::new("TimeStamp", TTLValue::DateTime(now)),
            TTLV::new("LeaseTime", TTLValue::Interval(27)),
            TTLV::new("OriginalCreationDate", TTLValue::DateTimeExtended(now)),
        ]),
    );
    let (bytes, decoded) = wire_round_trip(&ttlv);
    assert_eq!(decoded, ttlv);
    // byte-for-byte stability
    let registry = default_registry();
    let reencoded = TtlvWireWriter::new(&registry).to_bytes(&decoded).unwrap();
    assert_eq!(reencoded, bytes);
}

#[test]
fn test_empty_sequence_emits_no_items() {
    // a zero-element sequence contributes zero items, not an empty
    // Structure under the field tag
    let query = Query {
        query_function: Vec::new(),
    };
    let ttlv = to_ttlv(&query).unwrap();
    assert_eq!(ttlv.tag, "Query");
    assert_eq!(ttlv.children().unwrap().len(), 0);
}

#[test]
fn test_empty_batch_is_rejected_on_decode() {
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![TTLV::new(
            "RequestHeader",
            TTLValue::Structure(vec![
                TTLV::new(
                    "ProtocolVersion",
                    TTLValue::Structure(vec![
                        TTLV::new("ProtocolVersionMajor", TTLValue::Integer(1)),
                        TTLV::new("ProtocolVersionMinor", TTLValue::Integer(4)),
                    ]),
                ),
                TTLV::new("BatchCount", TTLValue::Integer(0)),
            ]),
        )]),
    );
    let result: Result<RequestMessage, _> = from_ttlv(ttlv);
    assert!(result.is_err());
}

#[test]
fn test_big_integer_marshals_through_serde() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct KeyNumbers {
        modulus: KmipBigInt,
        public_exponent: KmipBigInt,
    }

    let numbers = KeyNumbers {
        modulus: KmipBigInt::from(i64::MAX),
        public_exponent: KmipBigInt::from(65_537_i64),
    };
    let ttlv = to_ttlv(&numbers).unwrap();
    match &ttlv.child("Modulus").unwrap().value {
        TTLValue::BigInteger(b) => assert_eq!(*b, KmipBigInt::from(i64::MAX)),
        other => panic!("expected a BigInteger, got {other:?}"),
    }
    let recovered: KeyNumbers = from_ttlv(ttlv).unwrap();
    assert_eq!(recovered, numbers);
}

#[test]
fn test_unknown_tag_round_trips_as_hex() {
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![TTLV::new(
            "0x540002",
            TTLValue::TextString("vendor".to_owned()),
        )]),
    );
    let (_bytes, decoded) = wire_round_trip(&ttlv);
    assert_eq!(decoded.children().unwrap()[0].tag, "0x540002");
}

#[test]
fn test_enumeration_picks_up_registered_name() {
    let mut encoder = TtlvEncoder::new();
    encoder.enumeration(0x0042_005C, 0x1E).unwrap();
    let bytes = encoder.into_bytes();
    let registry = default_registry();
    let decoded = TtlvWireReader::new(&registry, true).from_bytes(&bytes).unwrap();
    match &decoded.value {
        TTLValue::Enumeration(e) => {
            assert_eq!(e.value, 0x1E);
            assert_eq!(e.name, "DiscoverVersions");
        }
        other => panic!("expected an Enumeration, got {other:?}"),
    }
}

#[test]
fn test_framer_round_trip_two_messages() {
    let mut encoder = TtlvEncoder::new();
    encoder
        .structure(0x0042_0078, |e| e.integer(0x0042_000D, 1))
        .unwrap();
    let message = encoder.into_bytes();

    let mut stream = Cursor::new([message.clone(), message.clone()].concat());
    let framer = MessageFramer::default();
    assert_eq!(framer.read_message(&mut stream).unwrap().unwrap(), message);
    assert_eq!(framer.read_message(&mut stream).unwrap().unwrap(), message);
    assert!(framer.read_message(&mut stream).unwrap().is_none());
}

#[test]
fn test_framer_rejects_oversized_item() {
    // a Structure header announcing 0xFFFFFFFF value bytes
    let header = [0x42, 0x00, 0x78, 0x01, 0xFF, 0xFF, 0xFF, 0xFF];
    let framer = MessageFramer::default();
    assert!(matches!(
        framer.read_message(&mut Cursor::new(header.to_vec())),
        Err(TtlvError::MessageTooLarge { .. })
    ));
}

#[test]
fn test_framer_truncated_stream() {
    let mut encoder = TtlvEncoder::new();
    encoder
        .structure(0x0042_0078, |e| e.integer(0x0042_000D, 1))
        .unwrap();
    let message = encoder.into_bytes();
    let framer = MessageFramer::default();
    // header cut short
    assert!(matches!(
        framer.read_message(&mut Cursor::new(message[..5].to_vec())),
        Err(TtlvError::Truncated(_))
    ));
    // value cut short
    assert!(matches!(
        framer.read_message(&mut Cursor::new(message[..12].to_vec())),
        Err(TtlvError::Truncated(_))
    ));
}

fn sample_request() -> RequestMessage {
    RequestMessage {
        request_header: RequestMessageHeader {
            protocol_version: ProtocolVersion::V1_4,
            maximum_response_size: Some(4096),
            client_correlation_value: Some("client-1".to_owned()),
            authentication: Some(Authentication {
                credential: vec![Credential {
                    credential_type: CredentialType::UsernameAndPassword,
                    credential_value: CredentialValue::UsernameAndPassword(
                        UsernameAndPasswordCredential {
                            username: "alice".to_owned(),
                            password: Some("secret".to_owned()),
                        },
                    ),
                }],
            }),
            time_stamp: Some(datetime!(2024-06-01 12:30:00 UTC)),
            batch_count: 2,
            ..RequestMessageHeader::default()
        },
        batch_item: vec![
            RequestMessageBatchItem::with_id(
                Operation::DiscoverVersions(DiscoverVersions {
                    protocol_version: Some(vec![
                        ProtocolVersion::V1_4,
                        ProtocolVersion::V1_3,
                        ProtocolVersion::V1_2,
                    ]),
                }),
                vec![0x01],
            ),
            RequestMessageBatchItem::with_id(
                Operation::Query(Query {
                    query_function: vec![
                        QueryFunction::QueryOperations,
                        QueryFunction::QueryObjects,
                    ],
                }),
                vec![0x02],
            ),
        ],
    }
}

#[test]
fn test_request_message_marshal_round_trip() {
    let request = sample_request();
    let ttlv = to_ttlv(&request).unwrap();
    assert_eq!(ttlv.tag, "RequestMessage");
    // the two batch items are siblings, not a nested list
    let children = ttlv.children().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].tag, "RequestHeader");
    assert_eq!(children[1].tag, "BatchItem");
    assert_eq!(children[2].tag, "BatchItem");

    let (_bytes, decoded) = wire_round_trip(&ttlv);
    let recovered: RequestMessage = from_ttlv(decoded).unwrap();
    assert_eq!(recovered, request);
}

#[test]
fn test_request_header_field_order() {
    let request = sample_request();
    let ttlv = to_ttlv(&request).unwrap();
    let header = ttlv.child("RequestHeader").unwrap();
    let tags: Vec<&str> = header
        .children()
        .unwrap()
        .iter()
        .map(|c| c.tag.as_str())
        .collect();
    assert_eq!(
        tags,
        vec![
            "ProtocolVersion",
            "MaximumResponseSize",
            "ClientCorrelationValue",
            "Authentication",
            "TimeStamp",
            "BatchCount"
        ]
    );
}

#[test]
fn test_create_with_attributes_round_trip() {
    let create = Create {
        object_type: ObjectType::SymmetricKey,
        template_attribute: TemplateAttribute::with_attributes(vec![
            Attribute::new(
                "Cryptographic Algorithm",
                AttributeValue::Enumeration(CryptographicAlgorithm::AES.as_u32()),
            ),
            Attribute::new("Cryptographic Length", AttributeValue::Integer(256)),
            // Encrypt | Decrypt
            Attribute::new("Cryptographic Usage Mask", AttributeValue::Integer(0x0C)),
            Attribute::new(
                "Name",
                AttributeValue::TextString("test-key".to_owned()),
            ),
            Attribute::new(
                "Activation Date",
                AttributeValue::DateTime(datetime!(2024-06-01 00:00:00 UTC)),
            ),
            Attribute::new("Lease Time", AttributeValue::Interval(3600)),
            Attribute::new("Extractable", AttributeValue::Boolean(false)),
        ]),
    };
    let message = RequestMessage {
        request_header: RequestMessageHeader {
            protocol_version: ProtocolVersion::V1_4,
            batch_count: 1,
            ..RequestMessageHeader::default()
        },
        batch_item: vec![RequestMessageBatchItem::new(Operation::Create(create))],
    };
    let ttlv = to_ttlv(&message).unwrap();
    let (_bytes, decoded) = wire_round_trip(&ttlv);
    let recovered: RequestMessage = from_ttlv(decoded).unwrap();
    assert_eq!(recovered, message);
}

#[test]
fn test_get_response_object_round_trip() {
    let response = ResponseMessage {
        response_header: ResponseMessageHeader {
            protocol_version: ProtocolVersion::V1_4,
            time_stamp: datetime!(2024-06-01 12:30:00 UTC),
            nonce: None,
            client_correlation_value: None,
            server_correlation_value: None,
            batch_count: 1,
        },
        batch_item: vec![ResponseMessageBatchItem::new_with_response(
            ResultStatusEnumeration::Success,
            Operation::GetResponse(GetResponse {
                object_type: ObjectType::SymmetricKey,
                unique_identifier: "uid-1".to_owned(),
                object: Object::SymmetricKey(SymmetricKey {
                    key_block: KeyBlock::raw(
                        vec![0xAB; 32],
                        CryptographicAlgorithm::AES,
                        256,
                    ),
                }),
            }),
        )],
    };
    let ttlv = to_ttlv(&response).unwrap();
    // the object serializes under its own tag inside the payload
    let item = ttlv.child("BatchItem").unwrap();
    let payload = item.child("ResponsePayload").unwrap();
    assert!(payload.child("SymmetricKey").is_some());

    let (_bytes, decoded) = wire_round_trip(&ttlv);
    let recovered: ResponseMessage = from_ttlv(decoded).unwrap();
    assert_eq!(recovered, response);
}

#[test]
fn test_unknown_operation_payload_is_skipped() {
    // hand-build a request naming operation 0x99 with an opaque payload
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![
            TTLV::new(
                "RequestHeader",
                TTLValue::Structure(vec![
                    TTLV::new(
                        "ProtocolVersion",
                        TTLValue::Structure(vec![
                            TTLV::new("ProtocolVersionMajor", TTLValue::Integer(1)),
                            TTLV::new("ProtocolVersionMinor", TTLValue::Integer(4)),
                        ]),
                    ),
                    TTLV::new("BatchCount", TTLValue::Integer(1)),
                ]),
            ),
            TTLV::new(
                "BatchItem",
                TTLValue::Structure(vec![
                    TTLV::new(
                        "Operation",
                        TTLValue::Enumeration(crate::ttlv::KmipEnumerationVariant {
                            value: 0x99,
                            name: String::new(),
                        }),
                    ),
                    TTLV::new("UniqueBatchItemID", TTLValue::ByteString(vec![0x01])),
                    TTLV::new(
                        "RequestPayload",
                        TTLValue::Structure(vec![TTLV::new(
                            "Data",
                            TTLValue::ByteString(vec![1, 2, 3]),
                        )]),
                    ),
                ]),
            ),
        ]),
    );
    let request: RequestMessage = from_ttlv(ttlv).unwrap();
    let item = &request.batch_item[0];
    assert_eq!(item.operation.value(), 0x99);
    assert_eq!(item.unique_batch_item_id, Some(vec![0x01]));
    assert!(item.request_payload.is_none());
}

#[test]
fn test_missing_required_field_is_rejected() {
    // a batch item without a RequestPayload
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![
            TTLV::new(
                "RequestHeader",
                TTLValue::Structure(vec![
                    TTLV::new(
                        "ProtocolVersion",
                        TTLValue::Structure(vec![
                            TTLV::new("ProtocolVersionMajor", TTLValue::Integer(1)),
                            TTLV::new("ProtocolVersionMinor", TTLValue::Integer(4)),
                        ]),
                    ),
                    TTLV::new("BatchCount", TTLValue::Integer(1)),
                ]),
            ),
            TTLV::new(
                "BatchItem",
                TTLValue::Structure(vec![TTLV::new(
                    "Operation",
                    TTLValue::Enumeration(crate::ttlv::KmipEnumerationVariant {
                        value: 0x1E,
                        name: String::new(),
                    }),
                )]),
            ),
        ]),
    );
    let result: Result<RequestMessage, _> = from_ttlv(ttlv);
    assert!(result.is_err());
}

#[test]
fn test_type_mismatch_is_rejected() {
    // BatchCount as a TextString instead of an Integer
    let ttlv = TTLV::new(
        "RequestMessage",
        TTLValue::Structure(vec![TTLV::new(
            "RequestHeader",
            TTLValue::Structure(vec![
                TTLV::new(
                    "ProtocolVersion",
                    TTLValue::Structure(vec![
                        TTLV::new("ProtocolVersionMajor", TTLValue::Integer(1)),
                        TTLV::new("ProtocolVersionMinor", TTLValue::Integer(4)),
                    ]),
                ),
                TTLV::new("BatchCount", TTLValue::TextString("1".to_owned())),
            ]),
        )]),
    );
    let result: Result<RequestMessage, _> = from_ttlv(ttlv);
    assert!(result.is_err());
}
