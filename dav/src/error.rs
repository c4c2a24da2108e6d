// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// WebDAV client errors.
#[non_exhaustive]
#[derive(Debug)]
pub enum DavError {
    /// HTTP layer error (transport, timeout, TLS).
    Http(String),

    /// The server answered the request with a non-success status code.
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// XML parsing/writing error.
    Xml(String),

    /// Invalid response from server.
    InvalidResponse(String),

    /// Configuration error.
    Config(String),
}

impl DavError {
    /// The HTTP status code the server answered with, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the server reported the resource as gone (403, 404 or 410).
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(self.status(), Some(403 | 404 | 410))
    }

    /// Whether the server answered with any client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|code| (400..500).contains(&code))
    }
}

impl fmt::Display for DavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Status { code, message } => write!(f, "HTTP {code}: {message}"),
            Self::Xml(e) => write!(f, "XML error: {e}"),
            Self::InvalidResponse(e) => write!(f, "Invalid server response: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for DavError {}

impl From<reqwest::Error> for DavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<quick_xml::Error> for DavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::io::Error> for DavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(format!("IO error: {e}"))
    }
}

impl From<url::ParseError> for DavError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidResponse(format!("Invalid URL: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let gone = DavError::Status {
            code: 404,
            message: String::new(),
        };
        assert!(gone.is_gone());
        assert!(gone.is_client_error());

        let forbidden = DavError::Status {
            code: 403,
            message: String::new(),
        };
        assert!(forbidden.is_gone());

        let teapot = DavError::Status {
            code: 418,
            message: String::new(),
        };
        assert!(!teapot.is_gone());
        assert!(teapot.is_client_error());

        let server = DavError::Status {
            code: 503,
            message: String::new(),
        };
        assert!(!server.is_gone());
        assert!(!server.is_client_error());

        assert!(!DavError::Http("timeout".to_string()).is_client_error());
    }
}
