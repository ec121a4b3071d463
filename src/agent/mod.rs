//! Agent lookup for for-sale listings
//!
//! For-sale detail pages do not carry agent contact data. It is fetched with a
//! second GraphQL request keyed by the property URL and authorized by a CSRF
//! token scoped to the detail page the listing came from.

mod request;
mod response;

pub use request::{csrf_token, AgentLookup, AGENT_LOOKUP_QUERY, OPERATION_NAME};
pub use response::{parse_response, parse_response_body};

use crate::extract::ListingRecord;

/// Agent and broker contact fields of one listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentInfo {
    pub agent_name: String,
    pub agent_phone_num: String,
    pub listing_agency: String,
    pub listing_agency_phone: String,
}

impl AgentInfo {
    /// Copies the agent fields onto a record
    pub fn merge_into(self, record: &mut ListingRecord) {
        record.agent_name = self.agent_name;
        record.agent_phone_num = self.agent_phone_num;
        record.listing_agency = self.listing_agency;
        record.listing_agency_phone = self.listing_agency_phone;
    }
}
