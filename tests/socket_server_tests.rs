//! End-to-end tests over a real TCP socket.

use std::{
    io::{Read, Write},
    net::TcpStream,
    sync::Arc,
    time::Duration,
};

use kmipd::{
    kmip_1_4::{
        kmip_messages::{RequestMessage, RequestMessageBatchItem, RequestMessageHeader, ResponseMessage},
        kmip_operations::{DiscoverVersions, Operation},
        kmip_types::{OperationEnumeration, ProtocolVersion, ResultStatusEnumeration},
    },
    registry::default_registry,
    server::{
        DiscoverVersionsHandler, OperationMux, ProtocolEngine, ServerConfig, SocketServer,
        SocketServerHandle,
    },
    ttlv::{
        from_ttlv, to_ttlv,
        wire::{MessageFramer, TtlvWireReader, TtlvWireWriter},
    },
};

fn start_test_server(config: ServerConfig) -> SocketServerHandle {
    let mut mux = OperationMux::new();
    mux.handle(
        OperationEnumeration::DISCOVER_VERSIONS,
        Arc::new(DiscoverVersionsHandler::default()),
    );
    let engine = Arc::new(ProtocolEngine::new(config, mux));
    SocketServer::new(engine).start().expect("server start")
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        // port 0 keeps parallel tests from colliding
        port: 0,
        request_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

fn discover_versions_request(id: u8) -> Vec<u8> {
    let request = RequestMessage {
        request_header: RequestMessageHeader {
            protocol_version: ProtocolVersion::V1_4,
            batch_count: 1,
            ..RequestMessageHeader::default()
        },
        batch_item: vec![RequestMessageBatchItem::with_id(
            Operation::DiscoverVersions(DiscoverVersions {
                protocol_version: Some(vec![
                    ProtocolVersion::V1_4,
                    ProtocolVersion::V1_3,
                    ProtocolVersion::V1_2,
                ]),
            }),
            vec![id],
        )],
    };
    let registry = default_registry();
    let ttlv = to_ttlv(&request).unwrap();
    TtlvWireWriter::new(&registry).to_bytes(&ttlv).unwrap()
}

fn read_response(stream: &mut TcpStream) -> ResponseMessage {
    let framer = MessageFramer::default();
    let bytes = framer
        .read_message(stream)
        .expect("response read")
        .expect("response present");
    let registry = default_registry();
    let ttlv = TtlvWireReader::new(&registry, true)
        .from_bytes(&bytes)
        .unwrap();
    from_ttlv(ttlv).unwrap()
}

#[test]
fn test_discover_versions_over_tcp() {
    let handle = start_test_server(test_config());
    let mut stream = TcpStream::connect(handle.local_addr()).expect("connect");

    stream.write_all(&discover_versions_request(0x01)).unwrap();
    let response = read_response(&mut stream);
    assert_eq!(response.batch_item.len(), 1);
    let item = &response.batch_item[0];
    assert_eq!(item.result_status, ResultStatusEnumeration::Success);
    assert_eq!(item.unique_batch_item_id, Some(vec![0x01]));

    drop(stream);
    handle.shutdown().expect("shutdown");
}

#[test]
fn test_sequential_requests_on_one_connection() {
    let handle = start_test_server(test_config());
    let mut stream = TcpStream::connect(handle.local_addr()).expect("connect");

    for id in 1..=3_u8 {
        stream.write_all(&discover_versions_request(id)).unwrap();
        let response = read_response(&mut stream);
        assert_eq!(
            response.batch_item[0].unique_batch_item_id,
            Some(vec![id])
        );
    }

    drop(stream);
    handle.shutdown().expect("shutdown");
}

#[test]
fn test_oversized_message_resets_the_connection() {
    let handle = start_test_server(test_config());
    let mut stream = TcpStream::connect(handle.local_addr()).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    // a Structure header announcing a 4 GiB value
    stream
        .write_all(&[0x42, 0x00, 0x78, 0x01, 0xFF, 0xFF, 0xFF, 0xFF])
        .unwrap();

    // the server closes without responding
    let mut buf = [0_u8; 16];
    let n = stream.read(&mut buf).expect("read after reset");
    assert_eq!(n, 0);

    drop(stream);
    handle.shutdown().expect("shutdown");
}

#[test]
fn test_graceful_shutdown_stops_accepting() {
    let handle = start_test_server(test_config());
    let addr = handle.local_addr();
    handle.shutdown().expect("shutdown");
    // after shutdown the listener is gone; a fresh connection must fail
    // (or be closed immediately on some platforms)
    match TcpStream::connect(addr) {
        Err(_refused) => {}
        Ok(mut stream) => {
            let mut buf = [0_u8; 1];
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
            let n = stream.read(&mut buf).unwrap_or(0);
            assert_eq!(n, 0);
        }
    }
}
