//! GraphQL Listing Client
//!
//! Talks to the hosted GraphQL API: `listAccessPoints` for unverified access
//! points and `updateAccessPoint` for the review mutation.

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use std::time::Duration;

use super::{Cursor, ListingSource, RemoteBatch, ReviewStatusSink};
use crate::constants::API_KEY_HEADER;
use crate::domain::{AccessPointItem, ApiConfig, Filter, RecordKey};
use crate::error::{Error, FetchError, Result};

const LIST_UNVERIFIED_ACCESS_POINTS: &str = r#"
query ListUnverifiedAccessPoints(
  $limit: Int
  $nextToken: String
  $filter: ModelAccessPointFilterInput
) {
  listAccessPoints(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items {
      license
      licenseExpiration
      provider {
        fullName
        email
        phone
        liabilityPolicy
        licenseType
        url
      }
      state
      verified
      owner
    }
    nextToken
  }
}
"#;

const UPDATE_ACCESS_POINT_VERIFIED: &str = r#"
mutation UpdateAccessPointVerified($state: String!, $owner: String!, $verified: Boolean!) {
  updateAccessPoint(input: {state: $state, owner: $owner, verified: $verified}) {
    verified
  }
}
"#;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorItem>,
}

#[derive(Deserialize)]
struct GraphqlErrorItem {
    message: String,
}

impl<T> GraphqlResponse<T> {
    fn into_data(self) -> Result<T, FetchError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FetchError::GraphQl { message });
        }
        self.data.ok_or_else(|| FetchError::Malformed {
            message: "response has no data".to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAccessPointsData {
    list_access_points: Option<AccessPointConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessPointConnection {
    #[serde(default)]
    items: Vec<Option<AccessPointItem>>,
    next_token: Option<String>,
}

impl AccessPointConnection {
    fn into_batch(self) -> RemoteBatch<AccessPointItem> {
        RemoteBatch::new(
            self.items.into_iter().flatten().collect(),
            self.next_token.and_then(Cursor::new),
        )
    }
}

/// Translate equality criteria into the listing filter input, restricted to
/// access points that are not yet verified.
fn unverified_filter_input(filter: &Filter) -> Value {
    let mut input = Map::new();
    input.insert("verified".to_string(), json!({ "ne": true }));
    for (field, value) in filter.criteria() {
        input.insert(field.to_string(), json!({ "eq": value }));
    }
    Value::Object(input)
}

fn list_variables(filter: &Filter, limit: u32, cursor: Option<&Cursor>) -> Value {
    json!({
        "limit": limit,
        "nextToken": cursor.map(Cursor::as_str),
        "filter": unverified_filter_input(filter),
    })
}

fn parse_list_response(
    body: GraphqlResponse<ListAccessPointsData>,
) -> Result<RemoteBatch<AccessPointItem>, FetchError> {
    body.into_data()?
        .list_access_points
        .map(AccessPointConnection::into_batch)
        .ok_or_else(|| FetchError::Malformed {
            message: "listAccessPoints missing from response".to_string(),
        })
}

/// Client for the hosted GraphQL API
#[derive(Clone)]
pub struct GraphqlListing {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GraphqlListing {
    /// Create a client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Invalid {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<GraphqlResponse<T>, FetchError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ListingSource for GraphqlListing {
    type Item = AccessPointItem;

    async fn list(
        &self,
        filter: &Filter,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<RemoteBatch<AccessPointItem>, FetchError> {
        tracing::debug!(%filter, limit, cursor = ?cursor, "listAccessPoints");
        let body = self
            .execute(LIST_UNVERIFIED_ACCESS_POINTS, list_variables(filter, limit, cursor))
            .await?;
        parse_list_response(body)
    }
}

impl ReviewStatusSink for GraphqlListing {
    async fn set_verified(&self, key: &RecordKey, verified: bool) -> Result<(), FetchError> {
        tracing::info!(owner = %key.owner, state = %key.state, verified, "updateAccessPoint");
        let variables = json!({
            "owner": key.owner,
            "state": key.state,
            "verified": verified,
        });
        self.execute::<Value>(UPDATE_ACCESS_POINT_VERIFIED, variables)
            .await?
            .into_data()
            .map(|_| ())
    }
}

impl std::fmt::Debug for GraphqlListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlListing")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<RemoteBatch<AccessPointItem>, FetchError> {
        let body: GraphqlResponse<ListAccessPointsData> = serde_json::from_str(json).expect("json");
        parse_list_response(body)
    }

    #[test]
    fn filter_input_always_excludes_verified() {
        let input = unverified_filter_input(&Filter::none());
        assert_eq!(input, json!({ "verified": { "ne": true } }));

        let input = unverified_filter_input(&Filter::region(Some("CA")));
        assert_eq!(
            input,
            json!({ "verified": { "ne": true }, "state": { "eq": "CA" } })
        );
    }

    #[test]
    fn list_variables_carry_cursor() {
        let cursor = Cursor::new("tok-1");
        let vars = list_variables(&Filter::none(), 100, cursor.as_ref());
        assert_eq!(vars["limit"], json!(100));
        assert_eq!(vars["nextToken"], json!("tok-1"));

        let vars = list_variables(&Filter::none(), 100, None);
        assert_eq!(vars["nextToken"], Value::Null);
    }

    #[test]
    fn parses_batch_with_continuation() {
        let batch = parse(
            r#"{"data": {"listAccessPoints": {
                "items": [
                    {"owner": "u1", "state": "CA", "provider": {"fullName": "A"}},
                    null,
                    {"owner": "u2", "state": "CA"}
                ],
                "nextToken": "eyJvZmZzZXQiOjJ9"
            }}}"#,
        )
        .expect("batch");
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.next_cursor.as_ref().map(Cursor::as_str), Some("eyJvZmZzZXQiOjJ9"));
    }

    #[test]
    fn null_or_empty_token_is_exhaustion() {
        let batch = parse(r#"{"data": {"listAccessPoints": {"items": [], "nextToken": null}}}"#)
            .expect("batch");
        assert!(batch.is_last());

        let batch = parse(r#"{"data": {"listAccessPoints": {"items": [], "nextToken": ""}}}"#)
            .expect("batch");
        assert!(batch.is_last());
    }

    #[test]
    fn graphql_errors_fail_the_fetch() {
        let err = parse(
            r#"{"data": null, "errors": [{"message": "Unauthorized"}, {"message": "x"}]}"#,
        )
        .expect_err("error");
        assert!(matches!(err, FetchError::GraphQl { ref message } if message == "Unauthorized; x"));

        let err = parse(r#"{"data": {"listAccessPoints": null}}"#).expect_err("error");
        assert!(matches!(err, FetchError::Malformed { .. }));

        let err = parse(r#"{}"#).expect_err("error");
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn client_requires_endpoint() {
        assert!(GraphqlListing::new(&ApiConfig::default()).is_err());

        let config = ApiConfig {
            endpoint: "https://api.example.org/graphql".to_string(),
            api_key: Some("plain".to_string()),
            ..Default::default()
        };
        let client = GraphqlListing::new(&config).expect("client");
        assert_eq!(client.endpoint(), "https://api.example.org/graphql");
        assert!(!format!("{client:?}").contains("plain"));
    }
}
