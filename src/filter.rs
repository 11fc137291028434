//! Predicates selecting which responses a listener accepts.

use crate::address::SerialNumber;
use crate::protocol::ApiId;
use crate::request::AtCommandName;
use crate::response::XBeeResponse;

/// Node discovery AT command name.
const NODE_DISCOVER: AtCommandName = AtCommandName(*b"ND");

/// Filter predicate over decoded responses.
///
/// All set conditions must hold for a response to be accepted; a default
/// filter accepts everything. Filters are evaluated on the dispatch path for
/// every registered listener, so they stay cheap field comparisons.
#[derive(Debug, Clone, Default)]
pub struct ResponseFilter {
    /// Accept only these frame kinds.
    pub api_ids: Option<Vec<ApiId>>,
    /// Accept only frames echoing this correlation id.
    pub frame_id: Option<u8>,
    /// Accept only frames from this sender.
    pub source: Option<SerialNumber>,
    /// Accept only AT responses to this command.
    pub at_command: Option<AtCommandName>,
}

impl ResponseFilter {
    /// Accepts everything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Accepts the given frame kinds.
    #[must_use]
    pub fn api_ids(ids: impl Into<Vec<ApiId>>) -> Self {
        Self {
            api_ids: Some(ids.into()),
            ..Self::default()
        }
    }

    /// Accepts frames echoing the given correlation id.
    #[must_use]
    pub fn frame_id(frame_id: u8) -> Self {
        Self {
            frame_id: Some(frame_id),
            ..Self::default()
        }
    }

    /// Accepts data frames received from the given sender.
    #[must_use]
    pub fn from_source(source: SerialNumber) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Accepts node-discovery records: AT responses to `ND`.
    #[must_use]
    pub fn node_discovery(frame_id: u8) -> Self {
        Self {
            api_ids: Some(vec![ApiId::AtResponse]),
            frame_id: Some(frame_id),
            at_command: Some(NODE_DISCOVER),
            ..Self::default()
        }
    }

    /// All inbound data frame kinds, 802.15.4 and ZigBee.
    #[must_use]
    pub fn incoming_data() -> Self {
        Self::api_ids(vec![
            ApiId::Rx64Response,
            ApiId::Rx16Response,
            ApiId::ZigbeeRxResponse,
            ApiId::ExplicitRxResponse,
        ])
    }

    /// Restricts the filter to the given frame kinds.
    #[must_use]
    pub fn with_api_ids(mut self, ids: impl Into<Vec<ApiId>>) -> Self {
        self.api_ids = Some(ids.into());
        self
    }

    /// Restricts the filter to the given correlation id.
    #[must_use]
    pub const fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    /// Restricts the filter to the given sender.
    #[must_use]
    pub const fn with_source(mut self, source: SerialNumber) -> Self {
        self.source = Some(source);
        self
    }

    /// Checks whether a response passes every set condition.
    #[must_use]
    pub fn matches(&self, response: &XBeeResponse) -> bool {
        if let Some(ref ids) = self.api_ids {
            if !ids.contains(&response.api_id()) {
                return false;
            }
        }

        if let Some(expected) = self.frame_id {
            if response.frame_id() != Some(expected) {
                return false;
            }
        }

        if let Some(expected) = self.source {
            match response.source() {
                Some(address) if address.serial == expected => {}
                _ => return false,
            }
        }

        if let Some(expected) = self.at_command {
            let command = match response {
                XBeeResponse::At(at) => at.command,
                XBeeResponse::RemoteAt(at) => at.command,
                _ => return false,
            };
            if command != expected {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::address::{NetworkAddress, XBeeAddress};
    use crate::protocol::AtStatus;
    use crate::response::{AtResponse, ModemStatusResponse, ZigbeeRxResponse};

    use super::*;

    fn rx_from(serial: u64) -> XBeeResponse {
        XBeeResponse::ZigbeeRx(ZigbeeRxResponse {
            source: XBeeAddress::new(SerialNumber(serial), NetworkAddress(0x0001)),
            options: 0,
            payload: Bytes::from_static(b"d"),
        })
    }

    fn at_response(command: [u8; 2], frame_id: u8) -> XBeeResponse {
        XBeeResponse::At(AtResponse {
            frame_id,
            command: AtCommandName(command),
            status: AtStatus::Ok,
            value: Bytes::new(),
        })
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = ResponseFilter::any();
        assert!(filter.matches(&rx_from(1)));
        assert!(filter.matches(&at_response(*b"NI", 3)));
    }

    #[test]
    fn test_api_id_filter() {
        let filter = ResponseFilter::api_ids(vec![ApiId::ModemStatus]);
        assert!(!filter.matches(&rx_from(1)));
        assert!(filter.matches(&XBeeResponse::ModemStatus(ModemStatusResponse {
            status: crate::protocol::ModemStatus::Joined,
        })));
    }

    #[test]
    fn test_frame_id_filter_rejects_unnumbered_frames() {
        let filter = ResponseFilter::frame_id(7);
        assert!(filter.matches(&at_response(*b"NI", 7)));
        assert!(!filter.matches(&at_response(*b"NI", 8)));
        // Rx frames carry no frame-id at all.
        assert!(!filter.matches(&rx_from(1)));
    }

    #[test]
    fn test_source_filter() {
        let filter = ResponseFilter::from_source(SerialNumber(42));
        assert!(filter.matches(&rx_from(42)));
        assert!(!filter.matches(&rx_from(43)));
        assert!(!filter.matches(&at_response(*b"NI", 1)));
    }

    #[test]
    fn test_node_discovery_filter() {
        let filter = ResponseFilter::node_discovery(5);
        assert!(filter.matches(&at_response(*b"ND", 5)));
        assert!(!filter.matches(&at_response(*b"ND", 6)));
        assert!(!filter.matches(&at_response(*b"NI", 5)));
        assert!(!filter.matches(&rx_from(1)));
    }

    #[test]
    fn test_composed_conditions_all_required() {
        let filter = ResponseFilter::incoming_data().with_source(SerialNumber(42));
        assert!(filter.matches(&rx_from(42)));
        assert!(!filter.matches(&rx_from(7)));
    }
}
