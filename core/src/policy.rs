// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Preselection policy for newly discovered collections.

use std::collections::HashSet;

use crate::config::{PreselectPolicy, RefreshSettings};

/// Decides whether a newly discovered collection should be marked for sync
/// without user action.
///
/// `home_set_personal` is the `personal` flag of the home set the collection
/// was found in (false for collections outside any home set).
#[must_use]
pub fn should_preselect(
    policy: PreselectPolicy,
    excluded: &HashSet<String>,
    url: &str,
    home_set_personal: bool,
) -> bool {
    match policy {
        PreselectPolicy::None => false,
        PreselectPolicy::All => !excluded.contains(url),
        PreselectPolicy::Personal => home_set_personal && !excluded.contains(url),
    }
}

impl RefreshSettings {
    /// [`should_preselect`] against this settings snapshot.
    #[must_use]
    pub fn should_preselect(&self, url: &str, home_set_personal: bool) -> bool {
        should_preselect(
            self.preselect,
            &self.preselect_excluded,
            url,
            home_set_personal,
        )
    }
}
