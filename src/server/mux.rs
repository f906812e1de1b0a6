use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use tracing::{debug, error, warn};

use crate::{
    error::result::KmipResult,
    kmip_1_4::{
        kmip_messages::{RequestMessageBatchItem, ResponseMessageBatchItem},
        kmip_types::{OperationEnumeration, ResultReason, ResultStatusEnumeration},
    },
};

use super::context::RequestContext;

/// Longest ResultMessage the server will place in a batch item.
const RESULT_MESSAGE_CAP: usize = 1024;

/// One KMIP operation, implemented over one request batch item.
///
/// A classified failure (a [`crate::KmipError::Kmip`] carrying a
/// [`ResultReason`]) is encoded into the batch item verbatim; any other
/// error becomes `GeneralFailure`.
pub trait ItemHandler: Send + Sync {
    fn handle_item(
        &self,
        ctx: &RequestContext<'_>,
        item: &RequestMessageBatchItem,
    ) -> KmipResult<ResponseMessageBatchItem>;
}

/// Routes batch items to the handler registered for their Operation.
#[derive(Default)]
pub struct OperationMux {
    handlers: HashMap<OperationEnumeration, Arc<dyn ItemHandler>>,
}

impl OperationMux {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an operation; the last registration wins.
    pub fn handle(&mut self, operation: OperationEnumeration, handler: Arc<dyn ItemHandler>) {
        if self.handlers.insert(operation, handler).is_some() {
            debug!("handler for {operation} replaced");
        }
    }

    #[must_use]
    pub fn handler_for(&self, operation: OperationEnumeration) -> Option<Arc<dyn ItemHandler>> {
        self.handlers.get(&operation).cloned()
    }

    /// Dispatch one batch item and translate every outcome, including a
    /// handler panic, into a response batch item. The request's
    /// Operation and Unique Batch Item ID are always mirrored so
    /// neighbouring items stay correlated.
    #[must_use]
    pub fn dispatch(
        &self,
        ctx: &RequestContext<'_>,
        item: &RequestMessageBatchItem,
    ) -> ResponseMessageBatchItem {
        let Some(handler) = self.handler_for(item.operation) else {
            debug!(
                "[{}] no handler registered for operation {}",
                ctx.correlation_id(),
                item.operation
            );
            return failed_item(
                item,
                ResultReason::OperationNotSupported,
                format!("operation {} is not supported", item.operation),
            );
        };
        match catch_unwind(AssertUnwindSafe(|| handler.handle_item(ctx, item))) {
            Ok(Ok(mut response)) => {
                if response.operation.is_none() {
                    response.operation = Some(item.operation);
                }
                response.unique_batch_item_id.clone_from(&item.unique_batch_item_id);
                response
            }
            Ok(Err(e)) => {
                warn!(
                    "[{}] operation {} failed: {e}",
                    ctx.correlation_id(),
                    item.operation
                );
                failed_item(item, e.result_reason(), e.to_string())
            }
            Err(_panic) => {
                error!(
                    "[{}] handler for operation {} panicked",
                    ctx.correlation_id(),
                    item.operation
                );
                failed_item(
                    item,
                    ResultReason::GeneralFailure,
                    format!("operation {} aborted", item.operation),
                )
            }
        }
    }
}

fn failed_item(
    item: &RequestMessageBatchItem,
    reason: ResultReason,
    mut message: String,
) -> ResponseMessageBatchItem {
    if message.len() > RESULT_MESSAGE_CAP {
        let mut cut = RESULT_MESSAGE_CAP;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    ResponseMessageBatchItem {
        operation: Some(item.operation),
        unique_batch_item_id: item.unique_batch_item_id.clone(),
        result_status: ResultStatusEnumeration::OperationFailed,
        result_reason: Some(reason),
        result_message: Some(message),
        asynchronous_correlation_value: None,
        response_payload: None,
    }
}
