// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV client for collection discovery.

use std::sync::Arc;

use reqwest::Method;
use url::Url;

use crate::config::DavConfig;
use crate::error::DavError;
use crate::http::HttpClient;
use crate::request::{Prop, PropFindRequest};
use crate::response::{MultiStatus, Properties};

/// PROPFIND query scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the target resource.
    Zero,
    /// The target resource and its immediate children.
    One,
}

impl Depth {
    const fn header(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

/// How a multistatus entry relates to the queried URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The entry describes the queried URL itself.
    Target,
    /// The entry describes a depth-1 child of the queried URL.
    Member,
}

/// One entry of a PROPFIND result, with its href resolved to an absolute URL.
#[derive(Debug, Clone)]
pub struct PropFindEntry {
    /// Whether this entry is the queried resource or a member of it.
    pub relation: Relation,
    /// Absolute URL of the resource.
    pub url: Url,
    /// Per-entry HTTP status, when the server reported one.
    pub status: Option<u16>,
    /// Properties from the successful propstats of the entry.
    pub props: Properties,
}

impl PropFindEntry {
    /// Whether the entry itself succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_none_or(|code| (200..300).contains(&code))
    }
}

/// Result of a PROPFIND request.
#[derive(Debug, Clone)]
pub struct PropFindResult {
    /// The queried URL.
    pub base: Url,
    /// The response entries.
    pub entries: Vec<PropFindEntry>,
}

/// WebDAV client for discovering collections, home sets and principals.
///
/// # Example
///
/// ```ignore
/// use davmirror_dav::{AuthMethod, DavClient, DavConfig, Depth, Prop};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DavConfig {
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = DavClient::new(config)?;
/// let url = url::Url::parse("https://dav.example.com/principals/user/")?;
/// let result = client.propfind(&url, Depth::Zero, &[Prop::CalendarHomeSet]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DavClient {
    http: Arc<HttpClient>,
}

impl DavClient {
    /// Creates a new WebDAV client holding one authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: DavConfig) -> Result<Self, DavError> {
        let http = HttpClient::new(config)?;
        Ok(Self {
            http: Arc::new(http),
        })
    }

    /// Performs a PROPFIND against `url`, requesting `props`.
    ///
    /// Every entry of the multistatus answer is returned with its href
    /// resolved against the response base and tagged as [`Relation::Target`]
    /// or [`Relation::Member`].
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Status`] for a request-level non-success answer;
    /// per-entry failures are reported on the entries instead.
    pub async fn propfind(
        &self,
        url: &Url,
        depth: Depth,
        props: &[Prop],
    ) -> Result<PropFindResult, DavError> {
        let mut request = PropFindRequest::new();
        for prop in props {
            request.add_property(*prop);
        }
        let xml_body = request.build()?;

        tracing::debug!(%url, depth = depth.header(), "PROPFIND");
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(
                        Method::from_bytes(b"PROPFIND")
                            .map_err(|e| DavError::Http(format!("Invalid method: {e}")))?,
                        url.as_str(),
                    )
                    .header("Content-Type", "application/xml; charset=utf-8")
                    .header("Depth", depth.header())
                    .body(xml_body),
            )
            .await?;

        let xml = resp.text().await?;
        let multistatus = MultiStatus::from_xml(&xml)?;
        Ok(Self::resolve_entries(url, multistatus))
    }

    /// Resolves response hrefs to absolute URLs and tags their relation to
    /// the queried URL. Entries with unresolvable hrefs are dropped.
    fn resolve_entries(base: &Url, multistatus: MultiStatus) -> PropFindResult {
        let mut entries = Vec::new();
        for item in multistatus.responses {
            let resolved = match base.join(&item.href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(href = %item.href, error = %e, "skipping unresolvable href");
                    continue;
                }
            };
            let relation = if same_resource(base, &resolved) {
                Relation::Target
            } else {
                Relation::Member
            };
            let status = item.status;
            entries.push(PropFindEntry {
                relation,
                url: resolved,
                status,
                props: item.into_ok_props(),
            });
        }
        PropFindResult {
            base: base.clone(),
            entries,
        }
    }
}

/// Whether two URLs name the same resource, ignoring a trailing slash
/// difference on the path.
#[must_use]
pub fn same_resource(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
}

/// Returns the URL with its path normalized to end in a slash, the canonical
/// form for collection and home-set URLs.
#[must_use]
pub fn ensure_trailing_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        return url.clone();
    }
    let mut normalized = url.clone();
    let path = format!("{}/", url.path());
    normalized.set_path(&path);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_resource_ignores_trailing_slash() {
        let a = Url::parse("https://example.com/dav/calendars").unwrap();
        let b = Url::parse("https://example.com/dav/calendars/").unwrap();
        assert!(same_resource(&a, &b));

        let c = Url::parse("https://example.com/dav/calendars/work/").unwrap();
        assert!(!same_resource(&a, &c));

        let d = Url::parse("https://other.example.com/dav/calendars/").unwrap();
        assert!(!same_resource(&a, &d));
    }

    #[test]
    fn ensure_trailing_slash_normalizes() {
        let url = Url::parse("https://example.com/dav/calendars").unwrap();
        assert_eq!(
            ensure_trailing_slash(&url).as_str(),
            "https://example.com/dav/calendars/"
        );

        let url = Url::parse("https://example.com/dav/calendars/").unwrap();
        assert_eq!(ensure_trailing_slash(&url), url);
    }
}
