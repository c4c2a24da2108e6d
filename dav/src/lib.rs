// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV client for discovering the calendars and address books of a
//! CalDAV/CardDAV account (RFC 4918 PROPFIND plus the discovery properties
//! of RFC 4791, RFC 6352 and the CalendarServer extensions).

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod client;
mod config;
mod error;
mod http;
mod request;
mod response;
mod xml;

pub use crate::client::{
    DavClient, Depth, PropFindEntry, PropFindResult, Relation, ensure_trailing_slash,
    same_resource,
};
pub use crate::config::{AuthMethod, DavConfig};
pub use crate::error::DavError;
pub use crate::request::{Prop, PropFindRequest};
pub use crate::response::{
    MultiStatus, Privileges, PropStat, Properties, ResourceType, ResponseItem,
};
