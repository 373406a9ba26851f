//! GraphQL patent/publication search client.
//!
//! Provider-side ranking is not deterministic across identical queries; the
//! gateway treats result order as opaque.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use venturescope_protocol::{PatentRecord, PublicationRecord};

use crate::CollaboratorError;

const PATENT_QUERY: &str = r"
query SearchPatents($query: String!, $limit: Int!) {
  searchPatents(query: $query, limit: $limit) {
    id
    title
    abstract
    inventors
    assignee
    publicationDate
    similarityScore
    patentNumber
  }
}";

const PUBLICATION_QUERY: &str = r"
query SearchPublications($query: String!, $limit: Int!) {
  searchPublications(query: $query, limit: $limit) {
    id
    title
    abstract
    authors
    journal
    publicationDate
    similarityScore
    doi
  }
}";

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Client for the patent/publication search provider
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl SearchClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_token: api_token.into(),
        }
    }

    /// Search for patents similar to `query`
    pub async fn search_patents(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<PatentRecord>, CollaboratorError> {
        let records = self
            .execute(PATENT_QUERY, query, limit, "searchPatents")
            .await?;
        debug!(
            component = "collaborators",
            event = "search.patents.completed",
            results = records.len(),
            "patent search completed"
        );
        Ok(records)
    }

    /// Search for publications similar to `query`
    pub async fn search_publications(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<PublicationRecord>, CollaboratorError> {
        let records = self
            .execute(PUBLICATION_QUERY, query, limit, "searchPublications")
            .await?;
        debug!(
            component = "collaborators",
            event = "search.publications.completed",
            results = records.len(),
            "publication search completed"
        );
        Ok(records)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        gql: &str,
        query: &str,
        limit: u32,
        field: &str,
    ) -> Result<Vec<T>, CollaboratorError> {
        let body = GraphQlRequest {
            query: gql,
            variables: serde_json::json!({ "query": query, "limit": limit }),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Status(response.status()));
        }

        let reply: GraphQlResponse = response.json().await?;
        if !reply.errors.is_empty() {
            let joined = reply
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CollaboratorError::GraphQl(joined));
        }

        // An absent field means zero results, not a malformed reply.
        match reply.data.get(field) {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(records) => Ok(serde_json::from_value(records.clone())?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_patents_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer search-token"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"query": "solid-state battery", "limit": 5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "searchPatents": [{
                        "id": "pat-1",
                        "title": "Solid electrolyte cell",
                        "abstract": "A sulfide-based separator",
                        "inventors": ["A. Author"],
                        "similarityScore": 0.83
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SearchClient::new(reqwest::Client::new(), server.uri(), "search-token");
        let records = client
            .search_patents("solid-state battery", 5)
            .await
            .expect("search");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "pat-1");
        assert!((records[0].similarity_score - 0.83).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn graphql_errors_are_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{"message": "rate limited"}, {"message": "try later"}]
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new(reqwest::Client::new(), server.uri(), "search-token");
        let err = client
            .search_publications("anything", 5)
            .await
            .expect_err("should fail");
        assert!(matches!(
            err,
            CollaboratorError::GraphQl(msg) if msg == "rate limited, try later"
        ));
    }

    #[tokio::test]
    async fn null_result_field_means_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"searchPublications": null}
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new(reqwest::Client::new(), server.uri(), "search-token");
        let records = client
            .search_publications("anything", 5)
            .await
            .expect("search");
        assert!(records.is_empty());
    }
}
