// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use davmirror_dav::DavError;

/// Errors of a refresh pass.
///
/// Per-resource 403/404/410 answers are handled inside the refresh steps
/// (the affected row is deleted or detached); only failures that abort the
/// pass surface here.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RefreshError {
    /// The service id does not exist locally; nothing was refreshed.
    #[error("service {0} not found")]
    ServiceNotFound(i64),

    /// A WebDAV request failed in a way no step tolerates.
    #[error("WebDAV error: {0}")]
    Dav(#[from] DavError),

    /// The local store failed.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    /// A stored URL could not be parsed back.
    #[error("invalid URL in local store: {0}")]
    Url(#[from] url::ParseError),
}
