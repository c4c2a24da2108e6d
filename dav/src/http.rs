// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and status mapping.

use reqwest::{Client, RequestBuilder, Response};

use crate::config::{AuthMethod, DavConfig};
use crate::error::DavError;

/// HTTP client for WebDAV operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: DavConfig,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: DavConfig) -> Result<Self, DavError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);

        match &self.config.auth {
            AuthMethod::Basic { username, password } => {
                req = req.basic_auth(username, Some(password));
            }
            AuthMethod::Bearer { token } => {
                req = req.bearer_auth(token);
            }
            AuthMethod::None => {}
        }

        req
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Status`] with the typed status code for any
    /// non-success response, so callers can branch on 403/404/410.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, DavError> {
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        Err(DavError::Status {
            code: status.as_u16(),
            message,
        })
    }
}
