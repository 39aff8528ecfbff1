//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence content REST API with HTTP
//! Basic authentication (user name plus API token).

mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client authenticating as `username` with `api_token`.
    ///
    /// No request is made until the first API call.
    #[must_use]
    pub fn new(base_url: &str, username: &str, api_token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: basic_auth_header(username, api_token),
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn basic_auth_header(username: &str, api_token: &str) -> String {
    let credentials = BASE64_STANDARD.encode(format!("{username}:{api_token}"));
    format!("Basic {credentials}")
}

/// Read a response body, mapping error statuses to [`ConfluenceError`].
fn read_body(response: Response<ureq::Body>) -> Result<String, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::from_status(status, error_body));
    }

    Ok(body.read_to_string()?)
}
