use std::time::Instant;

use crate::kmip_1_4::{
    kmip_messages::RequestMessageHeader,
    kmip_types::{Authentication, ProtocolVersion},
};

/// Per-request state handed to operation handlers: the request header,
/// a server-generated correlation identifier, the peer address and the
/// processing deadline. Handlers should honor the deadline
/// cooperatively.
#[derive(Debug)]
pub struct RequestContext<'a> {
    header: &'a RequestMessageHeader,
    correlation_id: String,
    peer: String,
    deadline: Instant,
}

impl<'a> RequestContext<'a> {
    #[must_use]
    pub fn new(
        header: &'a RequestMessageHeader,
        correlation_id: String,
        peer: &str,
        deadline: Instant,
    ) -> Self {
        Self {
            header,
            correlation_id,
            peer: peer.to_owned(),
            deadline,
        }
    }

    #[must_use]
    pub const fn header(&self) -> &'a RequestMessageHeader {
        self.header
    }

    #[must_use]
    pub const fn protocol_version(&self) -> ProtocolVersion {
        self.header.protocol_version
    }

    /// The credentials the request carried, if any. Validation is the
    /// handler's concern.
    #[must_use]
    pub const fn authentication(&self) -> Option<&'a Authentication> {
        self.header.authentication.as_ref()
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub fn deadline_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
