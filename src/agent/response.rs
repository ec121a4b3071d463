use crate::agent::AgentInfo;
use crate::extract::{lookup, lookup_text};
use serde_json::Value;

const PROVIDER: &[&str] = &["homeDetailsByUrl", "provider"];

/// Reads agent and broker contact fields from a lookup response
///
/// The GraphQL `data` wrapper is optional. Each field falls back to the empty
/// string on its own, so a response without a `broker` node still yields the
/// agent's name and phone.
pub fn parse_response(json: &Value) -> AgentInfo {
    let root = lookup(json, &["data"]).unwrap_or(json);
    let Some(provider) = lookup(root, PROVIDER) else {
        return AgentInfo::default();
    };

    let field = |path: &[&str]| lookup_text(provider, path).unwrap_or_default();

    AgentInfo {
        agent_name: field(&["agent", "name"]),
        agent_phone_num: field(&["agent", "phone"]),
        listing_agency: field(&["broker", "name"]),
        listing_agency_phone: field(&["broker", "phone"]),
    }
}

/// Parses a raw response body, failing only if it is not JSON at all
pub fn parse_response_body(body: &str) -> Result<AgentInfo, serde_json::Error> {
    let json: Value = serde_json::from_str(body)?;
    Ok(parse_response(&json))
}
