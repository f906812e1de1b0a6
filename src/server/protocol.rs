use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use time::OffsetDateTime;
use tracing::{debug, error, warn};

use crate::{
    kmip_1_4::{
        kmip_messages::{
            RequestMessage, RequestMessageHeader, ResponseMessage, ResponseMessageBatchItem,
            ResponseMessageHeader,
        },
        kmip_types::{
            BatchErrorContinuationOption, ProtocolVersion, ResultReason, ResultStatusEnumeration,
        },
    },
    registry::{default_registry, Registry},
    ttlv::{
        from_ttlv, to_ttlv,
        wire::{TtlvWireReader, TtlvWireWriter},
    },
};

use super::{config::ServerConfig, context::RequestContext, mux::OperationMux};

/// What the transport must do after handing one framed request to the
/// engine.
#[derive(Debug)]
pub enum Disposition {
    /// Send the bytes and keep serving the connection.
    Respond(Vec<u8>),
    /// Send the bytes, then close the connection.
    RespondAndClose(Vec<u8>),
    /// Close the connection without sending anything.
    CloseSilently,
}

/// Drives one framed request through decode, dispatch and encode.
///
/// The engine is transport-agnostic: the socket server feeds it framed
/// byte buffers and writes back whatever it returns.
pub struct ProtocolEngine {
    mux: OperationMux,
    registry: Arc<Registry>,
    config: ServerConfig,
    request_counter: AtomicU64,
}

impl ProtocolEngine {
    #[must_use]
    pub fn new(config: ServerConfig, mux: OperationMux) -> Self {
        Self::with_registry(config, mux, default_registry())
    }

    #[must_use]
    pub const fn with_registry(
        config: ServerConfig,
        mux: OperationMux,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            mux,
            registry,
            config,
            request_counter: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Process one framed request.
    ///
    /// A request whose framing succeeded but whose decoding failed is
    /// answered with a minimal single-item `InvalidMessage` response and
    /// the connection then closes; if even that response cannot be
    /// built, the connection closes silently. A request that exceeded
    /// its deadline closes silently, with no partial response. Traffic
    /// logging never aborts processing.
    #[must_use]
    pub fn handle_request_bytes(&self, peer: &str, request: &[u8]) -> Disposition {
        if self.config.log_traffic {
            debug!("rx [{peer}] {}", hex::encode(request));
        }
        let reader = TtlvWireReader::new(&self.registry, self.config.strict_validation);
        let decoded = reader
            .from_bytes(request)
            .and_then(from_ttlv::<RequestMessage>);
        match decoded {
            Ok(message) => match self.handle_request(peer, &message) {
                Some(response) => match self.encode_traffic(peer, &response) {
                    Some(bytes) => Disposition::Respond(bytes),
                    None => Disposition::CloseSilently,
                },
                None => Disposition::CloseSilently,
            },
            Err(e) => {
                warn!("[{peer}] malformed request: {e}");
                let rejection = self.rejection(
                    ProtocolVersion::V1_4,
                    ResultReason::InvalidMessage,
                    e.to_string(),
                );
                match self.encode_traffic(peer, &rejection) {
                    Some(bytes) => Disposition::RespondAndClose(bytes),
                    None => Disposition::CloseSilently,
                }
            }
        }
    }

    /// Process one decoded request: validate the header, dispatch the
    /// batch in order under the continuation option, and mirror the
    /// request's ordering and identifiers in the response. `None` means
    /// the request deadline expired; no partial response is produced.
    #[must_use]
    pub fn handle_request(&self, peer: &str, request: &RequestMessage) -> Option<ResponseMessage> {
        let header = &request.request_header;
        let version = header.protocol_version;

        if version.protocol_version_major != 1 {
            return Some(self.rejection(
                ProtocolVersion::V1_4,
                ResultReason::InvalidMessage,
                format!("unsupported protocol version {version}"),
            ));
        }
        // a batch count disagreeing with the items present is rejected
        // rather than trusted either way
        if usize::try_from(header.batch_count) != Ok(request.batch_item.len()) {
            return Some(self.rejection(
                version,
                ResultReason::InvalidMessage,
                format!(
                    "batch count ({}) does not match the number of batch items ({})",
                    header.batch_count,
                    request.batch_item.len()
                ),
            ));
        }

        let continuation = header
            .batch_error_continuation_option
            .unwrap_or(BatchErrorContinuationOption::Stop);
        let correlation_id = self.next_correlation_id();
        let deadline = Instant::now() + self.config.request_timeout();
        let ctx = RequestContext::new(header, correlation_id, peer, deadline);

        let mut items = Vec::with_capacity(request.batch_item.len());
        let mut any_failed = false;
        for item in &request.batch_item {
            let response_item = self.mux.dispatch(&ctx, item);
            if ctx.deadline_exceeded() {
                warn!(
                    "[{}] request deadline exceeded mid-batch",
                    ctx.correlation_id()
                );
                return None;
            }
            let failed = response_item.result_status == ResultStatusEnumeration::OperationFailed;
            items.push(response_item);
            if failed {
                any_failed = true;
                if continuation == BatchErrorContinuationOption::Stop {
                    break;
                }
            }
        }
        if any_failed && continuation == BatchErrorContinuationOption::Undo {
            // the core only labels; undoing the work is the handlers'
            // contract with their backing store
            for item in &mut items {
                if item.result_status == ResultStatusEnumeration::Success {
                    item.result_status = ResultStatusEnumeration::OperationUndone;
                    item.result_message = Some("undone after a later batch item failed".to_owned());
                }
            }
        }
        Some(self.assemble(&ctx, header, items))
    }

    fn assemble(
        &self,
        ctx: &RequestContext<'_>,
        header: &RequestMessageHeader,
        items: Vec<ResponseMessageBatchItem>,
    ) -> ResponseMessage {
        ResponseMessage {
            response_header: ResponseMessageHeader {
                protocol_version: header.protocol_version,
                time_stamp: OffsetDateTime::now_utc(),
                nonce: None,
                client_correlation_value: header.client_correlation_value.clone(),
                server_correlation_value: Some(ctx.correlation_id().to_owned()),
                batch_count: i32::try_from(items.len()).unwrap_or(i32::MAX),
            },
            batch_item: items,
        }
    }

    /// A single-item failure response used when the request could not
    /// be dispatched at all.
    fn rejection(
        &self,
        version: ProtocolVersion,
        reason: ResultReason,
        message: String,
    ) -> ResponseMessage {
        let item = ResponseMessageBatchItem {
            operation: None,
            unique_batch_item_id: None,
            result_status: ResultStatusEnumeration::OperationFailed,
            result_reason: Some(reason),
            result_message: Some(message),
            asynchronous_correlation_value: None,
            response_payload: None,
        };
        ResponseMessage {
            response_header: ResponseMessageHeader {
                protocol_version: version,
                time_stamp: OffsetDateTime::now_utc(),
                nonce: None,
                client_correlation_value: None,
                server_correlation_value: Some(self.next_correlation_id()),
                batch_count: 1,
            },
            batch_item: vec![item],
        }
    }

    fn encode_traffic(&self, peer: &str, response: &ResponseMessage) -> Option<Vec<u8>> {
        match self.encode_response(response) {
            Ok(bytes) => {
                if self.config.log_traffic {
                    debug!("tx [{peer}] {}", hex::encode(&bytes));
                }
                Some(bytes)
            }
            Err(e) => {
                error!("[{peer}] failed to encode the response: {e}");
                None
            }
        }
    }

    /// Encode a response message to its wire form.
    pub fn encode_response(
        &self,
        response: &ResponseMessage,
    ) -> crate::error::result::KmipResult<Vec<u8>> {
        let ttlv = to_ttlv(response)?;
        let writer = TtlvWireWriter::new(&self.registry);
        Ok(writer.to_bytes(&ttlv)?)
    }

    fn next_correlation_id(&self) -> String {
        let n = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{n:08x}")
    }
}
