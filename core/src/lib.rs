// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Local mirror of the calendars and address books a CalDAV/CardDAV account
//! can sync, and the refresh engine that keeps it reconciled with the
//! server.

mod collection;
mod config;
mod error;
mod localdb;
mod policy;
mod refresh;
mod types;

pub use crate::collection::CollectionDescriptor;
pub use crate::config::{PreselectPolicy, RefreshSettings};
pub use crate::error::RefreshError;
pub use crate::localdb::{
    CollectionRecord, Collections, HomeSetRecord, HomeSets, LocalDb, NewCollection,
    PrincipalRecord, Principals, ServiceRecord, Services,
};
pub use crate::policy::should_preselect;
pub use crate::refresh::Refresher;
pub use crate::types::{CollectionType, ServiceType};
