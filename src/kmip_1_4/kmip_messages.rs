use std::fmt::{self, Formatter};

use serde::{
    de::{self, IgnoredAny, MapAccess, Visitor},
    ser::{self, SerializeStruct},
    Deserialize, Serialize,
};
use time::OffsetDateTime;

use super::{
    kmip_operations::{Direction, Operation},
    kmip_types::{
        Authentication, BatchErrorContinuationOption, OperationEnumeration, ProtocolVersion,
        ResultReason, ResultStatusEnumeration,
    },
};
use crate::ttlv::byte_string::{ByteStringDe, ByteStringSer};

/// A KMIP request: one header and `BatchCount` batch items, in order.
#[derive(PartialEq, Debug, Clone)]
pub struct RequestMessage {
    pub request_header: RequestMessageHeader,
    pub batch_item: Vec<RequestMessageBatchItem>,
}

impl Serialize for RequestMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let header_batch_count = usize::try_from(self.request_header.batch_count)
            .map_err(|e| ser::Error::custom(format!("invalid batch count: {e}")))?;
        if self.batch_item.is_empty() {
            return Err(ser::Error::custom(
                "a request message must contain at least one batch item",
            ));
        }
        if header_batch_count != self.batch_item.len() {
            return Err(ser::Error::custom(format!(
                "header batch count ({}) does not match the number of batch items ({})",
                self.request_header.batch_count,
                self.batch_item.len()
            )));
        }
        let mut st = serializer.serialize_struct("RequestMessage", 2)?;
        st.serialize_field("RequestHeader", &self.request_header)?;
        st.serialize_field("BatchItem", &self.batch_item)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for RequestMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            RequestHeader,
            BatchItem,
        }

        struct RequestMessageVisitor;

        impl<'de> Visitor<'de> for RequestMessageVisitor {
            type Value = RequestMessage;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct RequestMessage")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut request_header: Option<RequestMessageHeader> = None;
                let mut batch_item: Vec<RequestMessageBatchItem> = Vec::new();
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::RequestHeader => {
                            if request_header.is_some() {
                                return Err(de::Error::duplicate_field("RequestHeader"));
                            }
                            request_header = Some(map.next_value()?);
                        }
                        Field::BatchItem => {
                            batch_item.extend(map.next_value::<Vec<RequestMessageBatchItem>>()?);
                        }
                    }
                }
                if batch_item.is_empty() {
                    return Err(de::Error::custom(
                        "a request message must contain at least one batch item",
                    ));
                }
                Ok(RequestMessage {
                    request_header: request_header
                        .ok_or_else(|| de::Error::missing_field("RequestHeader"))?,
                    batch_item,
                })
            }
        }

        const FIELDS: &[&str] = &["RequestHeader", "BatchItem"];
        deserializer.deserialize_struct("RequestMessage", FIELDS, RequestMessageVisitor)
    }
}

/// The request header. Presence of most fields depends on the protocol
/// features in use; only the protocol version and the batch count are
/// required.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RequestMessageHeader {
    pub protocol_version: ProtocolVersion,

    /// Largest response, in bytes, the requester can handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_response_size: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_correlation_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_correlation_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub asynchronous_indicator: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_capable_indicator: Option<bool>,

    /// Credentials identifying the requester; carried to handlers,
    /// never validated by the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,

    /// `Stop` is assumed when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_error_continuation_option: Option<BatchErrorContinuationOption>,

    /// `true` (strictly ordered) is assumed when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_order_option: Option<bool>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::ttlv::date_time::option",
        default
    )]
    pub time_stamp: Option<OffsetDateTime>,

    pub batch_count: i32,
}

/// One request batch item. The payload is `None` when the operation has
/// no typed mapping in this stack; dispatch answers such items with
/// `OperationNotSupported`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct RequestMessageBatchItem {
    pub operation: OperationEnumeration,
    pub unique_batch_item_id: Option<Vec<u8>>,
    pub request_payload: Option<Operation>,
}

impl RequestMessageBatchItem {
    #[must_use]
    pub const fn new(request: Operation) -> Self {
        Self {
            operation: request.operation_enum(),
            unique_batch_item_id: None,
            request_payload: Some(request),
        }
    }

    #[must_use]
    pub fn with_id(request: Operation, id: Vec<u8>) -> Self {
        Self {
            operation: request.operation_enum(),
            unique_batch_item_id: Some(id),
            request_payload: Some(request),
        }
    }
}

impl Serialize for RequestMessageBatchItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let Some(request_payload) = &self.request_payload else {
            return Err(ser::Error::custom(
                "a request batch item without a payload cannot be serialized",
            ));
        };
        if self.operation != request_payload.operation_enum() {
            return Err(ser::Error::custom(format!(
                "operation ({}) does not correspond to the request payload ({})",
                self.operation,
                request_payload.operation_enum()
            )));
        }
        if request_payload.direction() != Direction::Request {
            return Err(ser::Error::custom(format!(
                "payload {request_payload} is not a request payload"
            )));
        }
        let mut st = serializer.serialize_struct("BatchItem", 3)?;
        st.serialize_field("Operation", &self.operation)?;
        if let Some(id) = &self.unique_batch_item_id {
            st.serialize_field("UniqueBatchItemID", &ByteStringSer(id))?;
        }
        st.serialize_field("RequestPayload", request_payload)?;
        st.end()
    }
}

/// The request payload is an untagged choice resolved by the Operation
/// field, which the KMIP field ordering rules guarantee to precede it.
impl<'de> Deserialize<'de> for RequestMessageBatchItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            Operation,
            UniqueBatchItemID,
            RequestPayload,
            MessageExtension,
        }

        struct BatchItemVisitor;

        impl<'de> Visitor<'de> for BatchItemVisitor {
            type Value = RequestMessageBatchItem;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct RequestMessageBatchItem")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut operation: Option<OperationEnumeration> = None;
                let mut unique_batch_item_id: Option<Vec<u8>> = None;
                let mut request_payload: Option<Operation> = None;
                let mut payload_seen = false;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Operation => {
                            if operation.is_some() {
                                return Err(de::Error::duplicate_field("Operation"));
                            }
                            operation = Some(map.next_value()?);
                        }
                        Field::UniqueBatchItemID => {
                            if unique_batch_item_id.is_some() {
                                return Err(de::Error::duplicate_field("UniqueBatchItemID"));
                            }
                            unique_batch_item_id = Some(map.next_value::<ByteStringDe>()?.0);
                        }
                        Field::MessageExtension => {
                            // vendor extensions are carried past, not modeled
                            let _extension: IgnoredAny = map.next_value()?;
                        }
                        Field::RequestPayload => {
                            if payload_seen {
                                return Err(de::Error::duplicate_field("RequestPayload"));
                            }
                            payload_seen = true;
                            let Some(operation) = &operation else {
                                return Err(de::Error::missing_field("Operation"));
                            };
                            request_payload = match *operation {
                                op if op == OperationEnumeration::ACTIVATE => {
                                    Some(Operation::Activate(map.next_value()?))
                                }
                                op if op == OperationEnumeration::CREATE => {
                                    Some(Operation::Create(map.next_value()?))
                                }
                                op if op == OperationEnumeration::DESTROY => {
                                    Some(Operation::Destroy(map.next_value()?))
                                }
                                op if op == OperationEnumeration::DISCOVER_VERSIONS => {
                                    Some(Operation::DiscoverVersions(map.next_value()?))
                                }
                                op if op == OperationEnumeration::GET => {
                                    Some(Operation::Get(map.next_value()?))
                                }
                                op if op == OperationEnumeration::QUERY => {
                                    Some(Operation::Query(map.next_value()?))
                                }
                                op if op == OperationEnumeration::REVOKE => {
                                    Some(Operation::Revoke(map.next_value()?))
                                }
                                _ => {
                                    // no typed mapping; dispatch reports the
                                    // operation as not supported
                                    let _payload: IgnoredAny = map.next_value()?;
                                    None
                                }
                            };
                        }
                    }
                }
                let operation = operation.ok_or_else(|| de::Error::missing_field("Operation"))?;
                if !payload_seen {
                    return Err(de::Error::missing_field("RequestPayload"));
                }
                Ok(RequestMessageBatchItem {
                    operation,
                    unique_batch_item_id,
                    request_payload,
                })
            }
        }

        const FIELDS: &[&str] = &[
            "Operation",
            "UniqueBatchItemID",
            "RequestPayload",
            "MessageExtension",
        ];
        deserializer.deserialize_struct("RequestMessageBatchItem", FIELDS, BatchItemVisitor)
    }
}

/// A KMIP response, mirroring the request's batch items in order.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseMessage {
    pub response_header: ResponseMessageHeader,
    pub batch_item: Vec<ResponseMessageBatchItem>,
}

impl Serialize for ResponseMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let header_batch_count = usize::try_from(self.response_header.batch_count)
            .map_err(|e| ser::Error::custom(format!("invalid batch count: {e}")))?;
        if self.batch_item.is_empty() {
            return Err(ser::Error::custom(
                "a response message must contain at least one batch item",
            ));
        }
        if header_batch_count != self.batch_item.len() {
            return Err(ser::Error::custom(format!(
                "header batch count ({}) does not match the number of batch items ({})",
                self.response_header.batch_count,
                self.batch_item.len()
            )));
        }
        let mut st = serializer.serialize_struct("ResponseMessage", 2)?;
        st.serialize_field("ResponseHeader", &self.response_header)?;
        st.serialize_field("BatchItem", &self.batch_item)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for ResponseMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            ResponseHeader,
            BatchItem,
        }

        struct ResponseMessageVisitor;

        impl<'de> Visitor<'de> for ResponseMessageVisitor {
            type Value = ResponseMessage;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct ResponseMessage")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut response_header: Option<ResponseMessageHeader> = None;
                let mut batch_item: Vec<ResponseMessageBatchItem> = Vec::new();
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::ResponseHeader => {
                            if response_header.is_some() {
                                return Err(de::Error::duplicate_field("ResponseHeader"));
                            }
                            response_header = Some(map.next_value()?);
                        }
                        Field::BatchItem => {
                            batch_item.extend(map.next_value::<Vec<ResponseMessageBatchItem>>()?);
                        }
                    }
                }
                if batch_item.is_empty() {
                    return Err(de::Error::custom(
                        "a response message must contain at least one batch item",
                    ));
                }
                Ok(ResponseMessage {
                    response_header: response_header
                        .ok_or_else(|| de::Error::missing_field("ResponseHeader"))?,
                    batch_item,
                })
            }
        }

        const FIELDS: &[&str] = &["ResponseHeader", "BatchItem"];
        deserializer.deserialize_struct("ResponseMessage", FIELDS, ResponseMessageVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMessageHeader {
    pub protocol_version: ProtocolVersion,

    #[serde(with = "crate::ttlv::date_time")]
    pub time_stamp: OffsetDateTime,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<super::kmip_types::Nonce>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_correlation_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_correlation_value: Option<String>,

    pub batch_count: i32,
}

/// One response batch item.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ResponseMessageBatchItem {
    /// Required when present in the request batch item.
    pub operation: Option<OperationEnumeration>,

    /// Echo of the request's Unique Batch Item ID.
    pub unique_batch_item_id: Option<Vec<u8>>,

    pub result_status: ResultStatusEnumeration,

    /// Required when `result_status` is `OperationFailed`.
    pub result_reason: Option<ResultReason>,

    /// Required unless `result_status` is `Success` or
    /// `OperationPending`.
    pub result_message: Option<String>,

    /// Required when `result_status` is `OperationPending`.
    pub asynchronous_correlation_value: Option<Vec<u8>>,

    /// Present on success, absent on failure.
    pub response_payload: Option<Operation>,
}

impl ResponseMessageBatchItem {
    #[must_use]
    pub const fn new(result_status: ResultStatusEnumeration) -> Self {
        Self {
            result_status,
            operation: None,
            unique_batch_item_id: None,
            result_reason: None,
            result_message: None,
            asynchronous_correlation_value: None,
            response_payload: None,
        }
    }

    #[must_use]
    pub const fn new_with_response(
        result_status: ResultStatusEnumeration,
        response: Operation,
    ) -> Self {
        Self {
            result_status,
            operation: Some(response.operation_enum()),
            unique_batch_item_id: None,
            result_reason: None,
            result_message: None,
            asynchronous_correlation_value: None,
            response_payload: Some(response),
        }
    }

    fn check_result_consistency<E: ser::Error>(&self) -> Result<(), E> {
        match self.result_status {
            ResultStatusEnumeration::OperationFailed if self.result_reason.is_none() => {
                Err(E::custom(
                    "ResultReason is required when ResultStatus is OperationFailed",
                ))
            }
            ResultStatusEnumeration::OperationFailed | ResultStatusEnumeration::OperationUndone
                if self.result_message.is_none() =>
            {
                Err(E::custom(
                    "ResultMessage is required when ResultStatus is OperationFailed or \
                     OperationUndone",
                ))
            }
            ResultStatusEnumeration::OperationPending
                if self.asynchronous_correlation_value.is_none() =>
            {
                Err(E::custom(
                    "AsynchronousCorrelationValue is required when ResultStatus is \
                     OperationPending",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Serialize for ResponseMessageBatchItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.check_result_consistency::<S::Error>()?;
        if let (Some(operation), Some(response_payload)) = (&self.operation, &self.response_payload)
        {
            if *operation != response_payload.operation_enum() {
                return Err(ser::Error::custom(format!(
                    "operation ({}) does not correspond to the response payload ({})",
                    operation,
                    response_payload.operation_enum()
                )));
            }
            if response_payload.direction() != Direction::Response {
                return Err(ser::Error::custom(format!(
                    "payload {response_payload} is not a response payload"
                )));
            }
        }
        let mut st = serializer.serialize_struct("BatchItem", 6)?;
        if let Some(operation) = &self.operation {
            st.serialize_field("Operation", operation)?;
        }
        if let Some(id) = &self.unique_batch_item_id {
            st.serialize_field("UniqueBatchItemID", &ByteStringSer(id))?;
        }
        st.serialize_field("ResultStatus", &self.result_status)?;
        if let Some(reason) = &self.result_reason {
            st.serialize_field("ResultReason", reason)?;
        }
        if let Some(message) = &self.result_message {
            st.serialize_field("ResultMessage", message)?;
        }
        if let Some(acv) = &self.asynchronous_correlation_value {
            st.serialize_field("AsynchronousCorrelationValue", &ByteStringSer(acv))?;
        }
        if let Some(payload) = &self.response_payload {
            st.serialize_field("ResponsePayload", payload)?;
        }
        st.end()
    }
}

impl<'de> Deserialize<'de> for ResponseMessageBatchItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier)]
        enum Field {
            Operation,
            UniqueBatchItemID,
            ResultStatus,
            ResultReason,
            ResultMessage,
            AsynchronousCorrelationValue,
            ResponsePayload,
            MessageExtension,
        }

        struct BatchItemVisitor;

        impl<'de> Visitor<'de> for BatchItemVisitor {
            type Value = ResponseMessageBatchItem;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct ResponseMessageBatchItem")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut operation: Option<OperationEnumeration> = None;
                let mut unique_batch_item_id: Option<Vec<u8>> = None;
                let mut result_status: Option<ResultStatusEnumeration> = None;
                let mut result_reason: Option<ResultReason> = None;
                let mut result_message: Option<String> = None;
                let mut asynchronous_correlation_value: Option<Vec<u8>> = None;
                let mut response_payload: Option<Operation> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Operation => {
                            if operation.is_some() {
                                return Err(de::Error::duplicate_field("Operation"));
                            }
                            operation = Some(map.next_value()?);
                        }
                        Field::UniqueBatchItemID => {
                            if unique_batch_item_id.is_some() {
                                return Err(de::Error::duplicate_field("UniqueBatchItemID"));
                            }
                            unique_batch_item_id = Some(map.next_value::<ByteStringDe>()?.0);
                        }
                        Field::ResultStatus => {
                            if result_status.is_some() {
                                return Err(de::Error::duplicate_field("ResultStatus"));
                            }
                            result_status = Some(map.next_value()?);
                        }
                        Field::ResultReason => {
                            if result_reason.is_some() {
                                return Err(de::Error::duplicate_field("ResultReason"));
                            }
                            result_reason = Some(map.next_value()?);
                        }
                        Field::ResultMessage => {
                            if result_message.is_some() {
                                return Err(de::Error::duplicate_field("ResultMessage"));
                            }
                            result_message = Some(map.next_value()?);
                        }
                        Field::AsynchronousCorrelationValue => {
                            if asynchronous_correlation_value.is_some() {
                                return Err(de::Error::duplicate_field(
                                    "AsynchronousCorrelationValue",
                                ));
                            }
                            asynchronous_correlation_value =
                                Some(map.next_value::<ByteStringDe>()?.0);
                        }
                        Field::MessageExtension => {
                            let _extension: IgnoredAny = map.next_value()?;
                        }
                        Field::ResponsePayload => {
                            if response_payload.is_some() {
                                return Err(de::Error::duplicate_field("ResponsePayload"));
                            }
                            let Some(operation) = &operation else {
                                return Err(de::Error::missing_field("Operation"));
                            };
                            response_payload = match *operation {
                                op if op == OperationEnumeration::ACTIVATE => {
                                    Some(Operation::ActivateResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::CREATE => {
                                    Some(Operation::CreateResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::DESTROY => {
                                    Some(Operation::DestroyResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::DISCOVER_VERSIONS => {
                                    Some(Operation::DiscoverVersionsResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::GET => {
                                    Some(Operation::GetResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::QUERY => {
                                    Some(Operation::QueryResponse(map.next_value()?))
                                }
                                op if op == OperationEnumeration::REVOKE => {
                                    Some(Operation::RevokeResponse(map.next_value()?))
                                }
                                _ => {
                                    let _payload: IgnoredAny = map.next_value()?;
                                    None
                                }
                            };
                        }
                    }
                }
                Ok(ResponseMessageBatchItem {
                    operation,
                    unique_batch_item_id,
                    result_status: result_status
                        .ok_or_else(|| de::Error::missing_field("ResultStatus"))?,
                    result_reason,
                    result_message,
                    asynchronous_correlation_value,
                    response_payload,
                })
            }
        }

        const FIELDS: &[&str] = &[
            "Operation",
            "UniqueBatchItemID",
            "ResultStatus",
            "ResultReason",
            "ResultMessage",
            "AsynchronousCorrelationValue",
            "ResponsePayload",
            "MessageExtension",
        ];
        deserializer.deserialize_struct("ResponseMessageBatchItem", FIELDS, BatchItemVisitor)
    }
}
