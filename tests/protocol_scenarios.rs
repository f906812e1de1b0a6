//! End-to-end scenarios over the protocol engine, without a socket:
//! bytes in, bytes out.

use std::sync::Arc;

use kmipd::{
    error::result::KmipResult,
    kmip_1_4::{
        kmip_messages::{
            RequestMessage, RequestMessageBatchItem, RequestMessageHeader, ResponseMessage,
            ResponseMessageBatchItem,
        },
        kmip_operations::{Activate, ActivateResponse, DiscoverVersions, Operation},
        kmip_types::{
            BatchErrorContinuationOption, OperationEnumeration, ProtocolVersion, ResultReason,
            ResultStatusEnumeration,
        },
    },
    kmip_error,
    registry::default_registry,
    server::{
        DiscoverVersionsHandler, Disposition, ItemHandler, OperationMux, ProtocolEngine,
        RequestContext, ServerConfig,
    },
    ttlv::{
        from_ttlv, to_ttlv,
        wire::{TtlvWireReader, TtlvWireWriter},
        KmipEnumerationVariant, TTLValue, TTLV,
    },
};

/// Activate handler that fails on one specific identifier and panics on
/// another, to exercise error translation and isolation.
struct FlakyActivateHandler;

impl ItemHandler for FlakyActivateHandler {
    fn handle_item(
        &self,
        _ctx: &RequestContext<'_>,
        item: &RequestMessageBatchItem,
    ) -> KmipResult<ResponseMessageBatchItem> {
        let Some(Operation::Activate(payload)) = &item.request_payload else {
            return Err(kmip_error!("expected an Activate payload"));
        };
        let uid = payload.unique_identifier.clone().unwrap_or_default();
        match uid.as_str() {
            "broken" => Err(kmip_error!("the backend rejected {uid}")),
            "panicking" => panic!("handler blew up"),
            _ => Ok(ResponseMessageBatchItem::new_with_response(
                ResultStatusEnumeration::Success,
                Operation::ActivateResponse(ActivateResponse {
                    unique_identifier: uid,
                }),
            )),
        }
    }
}

fn test_engine() -> ProtocolEngine {
    let mut mux = OperationMux::new();
    mux.handle(
        OperationEnumeration::DISCOVER_VERSIONS,
        Arc::new(DiscoverVersionsHandler::default()),
    );
    mux.handle(OperationEnumeration::ACTIVATE, Arc::new(FlakyActivateHandler));
    ProtocolEngine::new(ServerConfig::default(), mux)
}

fn encode_request(request: &RequestMessage) -> Vec<u8> {
    let registry = default_registry();
    let ttlv = to_ttlv(request).unwrap();
    TtlvWireWriter::new(&registry).to_bytes(&ttlv).unwrap()
}

fn decode_response(bytes: &[u8]) -> ResponseMessage {
    let registry = default_registry();
    let ttlv = TtlvWireReader::new(&registry, true)
        .from_bytes(bytes)
        .unwrap();
    from_ttlv(ttlv).unwrap()
}

fn request_header(batch_count: i32) -> RequestMessageHeader {
    RequestMessageHeader {
        protocol_version: ProtocolVersion::V1_4,
        batch_count,
        ..RequestMessageHeader::default()
    }
}

fn activate_item(uid: &str, id: u8) -> RequestMessageBatchItem {
    RequestMessageBatchItem::with_id(
        Operation::Activate(Activate {
            unique_identifier: Some(uid.to_owned()),
        }),
        vec![id],
    )
}

#[test]
fn test_discover_versions_intersection() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: request_header(1),
        batch_item: vec![RequestMessageBatchItem::with_id(
            Operation::DiscoverVersions(DiscoverVersions {
                protocol_version: Some(vec![
                    ProtocolVersion::V1_2,
                    ProtocolVersion::V1_4,
                    ProtocolVersion::V1_3,
                    ProtocolVersion::new(1, 0),
                ]),
            }),
            vec![0x01],
        )],
    };
    let Disposition::Respond(bytes) = engine.handle_request_bytes("test", &encode_request(&request))
    else {
        panic!("expected a response");
    };
    let response = decode_response(&bytes);
    assert_eq!(response.response_header.batch_count, 1);
    assert_eq!(
        response.response_header.protocol_version,
        ProtocolVersion::V1_4
    );
    let item = &response.batch_item[0];
    assert_eq!(item.result_status, ResultStatusEnumeration::Success);
    assert_eq!(item.unique_batch_item_id, Some(vec![0x01]));
    let Some(Operation::DiscoverVersionsResponse(payload)) = &item.response_payload else {
        panic!("expected a DiscoverVersionsResponse payload");
    };
    // intersection, highest first
    assert_eq!(
        payload.protocol_version,
        Some(vec![
            ProtocolVersion::V1_4,
            ProtocolVersion::V1_3,
            ProtocolVersion::V1_2,
        ])
    );
}

#[test]
fn test_unknown_operation_is_not_supported() {
    let engine = test_engine();
    // operation 0x99 is not registered anywhere
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
                        TTLValue::Enumeration(KmipEnumerationVariant {
                            value: 0x99,
                            name: String::new(),
                        }),
                    ),
                    TTLV::new("UniqueBatchItemID", TTLValue::ByteString(vec![0x01])),
                    TTLV::new("RequestPayload", TTLValue::Structure(vec![])),
                ]),
            ),
        ]),
    );
    let registry = default_registry();
    let bytes = TtlvWireWriter::new(&registry).to_bytes(&ttlv).unwrap();

    let Disposition::Respond(response_bytes) = engine.handle_request_bytes("test", &bytes) else {
        panic!("expected a response");
    };
    let response = decode_response(&response_bytes);
    assert_eq!(response.batch_item.len(), 1);
    let item = &response.batch_item[0];
    assert_eq!(item.unique_batch_item_id, Some(vec![0x01]));
    assert_eq!(item.result_status, ResultStatusEnumeration::OperationFailed);
    assert_eq!(item.result_reason, Some(ResultReason::OperationNotSupported));
}

#[test]
fn test_batch_continue_processes_all_items() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: RequestMessageHeader {
            batch_error_continuation_option: Some(BatchErrorContinuationOption::Continue),
            ..request_header(3)
        },
        batch_item: vec![
            activate_item("first", 1),
            activate_item("broken", 2),
            activate_item("third", 3),
        ],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    assert_eq!(response.batch_item.len(), 3);
    assert_eq!(
        response.batch_item[0].result_status,
        ResultStatusEnumeration::Success
    );
    assert_eq!(
        response.batch_item[1].result_status,
        ResultStatusEnumeration::OperationFailed
    );
    assert_eq!(
        response.batch_item[1].result_reason,
        Some(ResultReason::GeneralFailure)
    );
    assert_eq!(
        response.batch_item[2].result_status,
        ResultStatusEnumeration::Success
    );
    // ordering mirrors the request
    for (i, item) in response.batch_item.iter().enumerate() {
        assert_eq!(item.unique_batch_item_id, Some(vec![u8::try_from(i).unwrap() + 1]));
    }
}

#[test]
fn test_batch_stop_truncates_after_failure() {
    let engine = test_engine();
    // Stop is the default when the option is omitted
    let request = RequestMessage {
        request_header: request_header(3),
        batch_item: vec![
            activate_item("first", 1),
            activate_item("broken", 2),
            activate_item("third", 3),
        ],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    assert_eq!(response.batch_item.len(), 2);
    assert_eq!(response.response_header.batch_count, 2);
    assert_eq!(
        response.batch_item[0].result_status,
        ResultStatusEnumeration::Success
    );
    assert_eq!(
        response.batch_item[1].result_status,
        ResultStatusEnumeration::OperationFailed
    );
}

#[test]
fn test_batch_undo_relabels_successes() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: RequestMessageHeader {
            batch_error_continuation_option: Some(BatchErrorContinuationOption::Undo),
            ..request_header(3)
        },
        batch_item: vec![
            activate_item("first", 1),
            activate_item("broken", 2),
            activate_item("third", 3),
        ],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    assert_eq!(response.batch_item.len(), 3);
    assert_eq!(
        response.batch_item[0].result_status,
        ResultStatusEnumeration::OperationUndone
    );
    assert_eq!(
        response.batch_item[1].result_status,
        ResultStatusEnumeration::OperationFailed
    );
    assert_eq!(
        response.batch_item[2].result_status,
        ResultStatusEnumeration::OperationUndone
    );
}

#[test]
fn test_handler_panic_is_isolated() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: RequestMessageHeader {
            batch_error_continuation_option: Some(BatchErrorContinuationOption::Continue),
            ..request_header(3)
        },
        batch_item: vec![
            activate_item("first", 1),
            activate_item("panicking", 2),
            activate_item("third", 3),
        ],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    assert_eq!(response.batch_item.len(), 3);
    assert_eq!(
        response.batch_item[0].result_status,
        ResultStatusEnumeration::Success
    );
    assert_eq!(
        response.batch_item[1].result_status,
        ResultStatusEnumeration::OperationFailed
    );
    assert_eq!(
        response.batch_item[1].result_reason,
        Some(ResultReason::GeneralFailure)
    );
    assert_eq!(
        response.batch_item[2].result_status,
        ResultStatusEnumeration::Success
    );
}

#[test]
fn test_batch_count_mismatch_is_invalid_message() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: request_header(2),
        batch_item: vec![activate_item("first", 1)],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    assert_eq!(response.batch_item.len(), 1);
    let item = &response.batch_item[0];
    assert_eq!(item.result_status, ResultStatusEnumeration::OperationFailed);
    assert_eq!(item.result_reason, Some(ResultReason::InvalidMessage));
}

#[test]
fn test_unsupported_protocol_version() {
    let engine = test_engine();
    let request = RequestMessage {
        request_header: RequestMessageHeader {
            protocol_version: ProtocolVersion::new(3, 0),
            batch_count: 1,
            ..RequestMessageHeader::default()
        },
        batch_item: vec![activate_item("first", 1)],
    };
    let response = engine
        .handle_request("test", &request)
        .expect("no timeout expected");
    let item = &response.batch_item[0];
    assert_eq!(item.result_status, ResultStatusEnumeration::OperationFailed);
    assert_eq!(item.result_reason, Some(ResultReason::InvalidMessage));
}

#[test]
fn test_empty_batch_request_is_invalid_message() {
    let engine = test_engine();
    // frames and validates, but carries BatchCount=0 and no batch items
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
    let registry = default_registry();
    let bytes = TtlvWireWriter::new(&registry).to_bytes(&ttlv).unwrap();
    let Disposition::RespondAndClose(response_bytes) = engine.handle_request_bytes("test", &bytes)
    else {
        panic!("expected a final response before closing");
    };
    let response = decode_response(&response_bytes);
    assert_eq!(response.batch_item.len(), 1);
    assert_eq!(
        response.batch_item[0].result_status,
        ResultStatusEnumeration::OperationFailed
    );
    assert_eq!(
        response.batch_item[0].result_reason,
        Some(ResultReason::InvalidMessage)
    );
}

#[test]
fn test_malformed_request_gets_minimal_response_then_close() {
    let engine = test_engine();
    // frames correctly as one TTLV item but is not a RequestMessage
    let ttlv = TTLV::new("BatchCount", TTLValue::Integer(1));
    let registry = default_registry();
    let bytes = TtlvWireWriter::new(&registry).to_bytes(&ttlv).unwrap();
    let Disposition::RespondAndClose(response_bytes) = engine.handle_request_bytes("test", &bytes)
    else {
        panic!("expected a final response before closing");
    };
    let response = decode_response(&response_bytes);
    assert_eq!(response.batch_item.len(), 1);
    assert_eq!(
        response.batch_item[0].result_reason,
        Some(ResultReason::InvalidMessage)
    );
}
