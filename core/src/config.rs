// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

/// Policy for automatically marking newly discovered collections for sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreselectPolicy {
    /// Never preselect.
    #[default]
    None,
    /// Preselect every discovered collection.
    All,
    /// Preselect only collections of personal home sets.
    Personal,
}

/// User settings the refresh engine depends on.
///
/// Passed into the refresh components as a read-only snapshot; the engine
/// never reads ambient global state.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RefreshSettings {
    /// Enable sync for every newly discovered collection, regardless of the
    /// preselect policy.
    #[serde(default)]
    pub sync_all_collections: bool,

    /// Preselection policy for newly discovered collections.
    #[serde(default)]
    pub preselect: PreselectPolicy,

    /// Exact collection URLs never to preselect.
    #[serde(default)]
    pub preselect_excluded: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let settings: RefreshSettings = serde_json::from_str("{}").expect("Failed to parse");
        assert!(!settings.sync_all_collections);
        assert_eq!(settings.preselect, PreselectPolicy::None);
        assert!(settings.preselect_excluded.is_empty());

        let settings: RefreshSettings = serde_json::from_str(
            r#"{
                "sync_all_collections": true,
                "preselect": "personal",
                "preselect_excluded": ["https://example.com/dav/cal/"]
            }"#,
        )
        .expect("Failed to parse");
        assert!(settings.sync_all_collections);
        assert_eq!(settings.preselect, PreselectPolicy::Personal);
        assert!(
            settings
                .preselect_excluded
                .contains("https://example.com/dav/cal/")
        );
    }
}
