//! services/client/src/repository/rest.rs
//!
//! The shared HTTP client every repository goes through. `RestClient::call` is
//! the single place where transport failures, non-success statuses and
//! missing bodies are translated into a `PortError`.

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use storybook_core::{PortError, PortResult};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("storybook-reader/", env!("CARGO_PKG_VERSION"));

/// A thin wrapper around `reqwest::Client` bound to the backend base URL.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            PortError::Precondition(format!("invalid backend url {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortError::Precondition(format!(
                "backend url {} cannot carry a path",
                base_url
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("could not build HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    pub fn url<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn request<I>(&self, method: Method, segments: I) -> RequestBuilder
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.http.request(method, self.url(segments))
    }

    /// Sends the request and decodes a JSON body of type `T`.
    ///
    /// A 2xx response without a usable body is a failure, never a success with
    /// an empty payload.
    pub async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed before a response arrived: {}", e);
            PortError::Transport(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            };
            warn!(path = %url, status = status.as_u16(), "Backend returned an error status");
            return Err(PortError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        debug!(path = %url, bytes = body.len(), "Backend response received");
        decode_body(&body)
    }
}

/// Decodes a JSON response body, treating empty and `null` bodies as missing.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> PortResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PortError::MissingBody("empty response body".to_string()));
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| PortError::MissingBody(e.to_string()))?;
    if value.is_null() {
        return Err(PortError::MissingBody("null response body".to_string()));
    }
    serde_json::from_value(value).map_err(|e| PortError::MissingBody(e.to_string()))
}

/// Rejects blank identifiers before any request is made.
pub(crate) fn require(value: &str, what: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::Precondition(format!("{} is required", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::protocol::StatsResponse;

    #[test]
    fn empty_body_is_missing() {
        let err = decode_body::<StatsResponse>(b"  \n").unwrap_err();
        assert!(matches!(err, PortError::MissingBody(_)));
    }

    #[test]
    fn null_body_is_missing() {
        let err = decode_body::<Option<StatsResponse>>(b"null").unwrap_err();
        assert!(matches!(err, PortError::MissingBody(_)));
    }

    #[test]
    fn wrong_shape_is_missing() {
        let err = decode_body::<StatsResponse>(br#"{"total_pages": "five"}"#).unwrap_err();
        assert!(matches!(err, PortError::MissingBody(_)));
    }

    #[test]
    fn decodes_valid_body() {
        let stats: StatsResponse = decode_body(
            br#"{"total_pages": 5, "total_words_read": 42, "total_time_spent": 310}"#,
        )
        .unwrap();
        assert_eq!(stats.total_pages, 5);
        assert_eq!(stats.total_words_read, 42);
        assert_eq!(stats.total_time_spent, 310);
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let client = RestClient::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        let url = client.url(["sessions", "a/b?c", "stats"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/sessions/a%2Fb%3Fc/stats");
    }

    #[test]
    fn base_without_path_gets_segments_appended() {
        let client = RestClient::new("http://localhost:8080", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(["users", "login"]).as_str(), "http://localhost:8080/users/login");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        assert!(matches!(
            RestClient::new("not a url", Duration::from_secs(1)),
            Err(PortError::Precondition(_))
        ));
    }

    #[test]
    fn blank_identifier_fails_precondition() {
        assert!(matches!(
            require(" ", "session id"),
            Err(PortError::Precondition(_))
        ));
        assert!(require("s1", "session id").is_ok());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = RestClient::new("http://localhost:9000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/api");
    }
}
