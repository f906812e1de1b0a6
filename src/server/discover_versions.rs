use crate::{
    error::result::KmipResult,
    kmip_1_4::{
        kmip_messages::{RequestMessageBatchItem, ResponseMessageBatchItem},
        kmip_operations::{DiscoverVersionsResponse, Operation},
        kmip_types::{ProtocolVersion, ResultReason, ResultStatusEnumeration},
    },
    KmipError,
};

use super::{context::RequestContext, mux::ItemHandler};

/// The built-in Discover Versions handler: reports the intersection of
/// the versions the client asked about and the versions this server
/// speaks, highest first. An empty request payload asks for everything.
pub struct DiscoverVersionsHandler {
    pub supported_versions: Vec<ProtocolVersion>,
}

impl Default for DiscoverVersionsHandler {
    fn default() -> Self {
        Self {
            supported_versions: vec![
                ProtocolVersion::V1_4,
                ProtocolVersion::V1_3,
                ProtocolVersion::V1_2,
            ],
        }
    }
}

impl ItemHandler for DiscoverVersionsHandler {
    fn handle_item(
        &self,
        _ctx: &RequestContext<'_>,
        item: &RequestMessageBatchItem,
    ) -> KmipResult<ResponseMessageBatchItem> {
        let Some(Operation::DiscoverVersions(payload)) = &item.request_payload else {
            return Err(KmipError::Kmip(
                ResultReason::InvalidMessage,
                "expected a DiscoverVersions request payload".to_owned(),
            ));
        };
        let mut versions: Vec<ProtocolVersion> = match &payload.protocol_version {
            Some(requested) if !requested.is_empty() => self
                .supported_versions
                .iter()
                .copied()
                .filter(|v| requested.contains(v))
                .collect(),
            _ => self.supported_versions.clone(),
        };
        versions.sort_unstable_by(|a, b| b.cmp(a));
        let response = DiscoverVersionsResponse {
            protocol_version: if versions.is_empty() {
                None
            } else {
                Some(versions)
            },
        };
        Ok(ResponseMessageBatchItem::new_with_response(
            ResultStatusEnumeration::Success,
            Operation::DiscoverVersionsResponse(response),
        ))
    }
}
