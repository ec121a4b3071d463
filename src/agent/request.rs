use crate::extract::lookup_text;
use crate::ScrapeError;
use reqwest::{Client, Request};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// GraphQL document sent with every agent lookup
pub const AGENT_LOOKUP_QUERY: &str = include_str!("../../assets/agent_lookup.graphql");

/// Operation name declared in [`AGENT_LOOKUP_QUERY`]
pub const OPERATION_NAME: &str = "GetAgentContact";

const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupBody<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: LookupVariables<'a>,
}

#[derive(Debug, Serialize)]
struct LookupVariables<'a> {
    url: &'a str,
}

/// Reads the page-scoped CSRF token from a detail page payload
///
/// Returns `None` when the page carries no token, which means the listing
/// has no agent stage.
pub fn csrf_token(payload: &Value) -> Option<String> {
    lookup_text(payload, &["props", "authHeaders", CSRF_HEADER]).filter(|t| !t.trim().is_empty())
}

/// Builds agent lookup requests against a fixed GraphQL endpoint
#[derive(Debug, Clone)]
pub struct AgentLookup {
    endpoint: Url,
}

impl AgentLookup {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// Builds the POST request for one property
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client the request will be sent with
    /// * `property_url` - The detail page URL; sent without query or fragment
    /// * `csrf_token` - Token read from that detail page's payload
    pub fn build_request(
        &self,
        client: &Client,
        property_url: &str,
        csrf_token: &str,
    ) -> Result<Request, ScrapeError> {
        let canonical = canonical_property_url(property_url)?;
        let body = LookupBody {
            operation_name: OPERATION_NAME,
            query: AGENT_LOOKUP_QUERY,
            variables: LookupVariables { url: &canonical },
        };

        let request = client
            .post(self.endpoint.clone())
            .header(CSRF_HEADER, csrf_token)
            .json(&body)
            .build()?;

        Ok(request)
    }
}

/// The property URL without query string or fragment
fn canonical_property_url(property_url: &str) -> Result<String, ScrapeError> {
    let mut url = Url::parse(property_url)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
