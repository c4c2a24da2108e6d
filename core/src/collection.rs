// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Typed collection descriptor parsed from a PROPFIND response entry.

use davmirror_dav::{Privileges, PropFindEntry, ensure_trailing_slash};
use url::Url;

use crate::types::{CollectionType, ServiceType};

/// A discovered collection, before it is persisted.
#[derive(Debug, Clone)]
pub struct CollectionDescriptor {
    /// Absolute URL, normalized to a trailing slash.
    pub url: Url,
    /// The kind the resource type markers map to.
    pub kind: CollectionType,
    /// Display name.
    pub display_name: Option<String>,
    /// Address book or calendar description, whichever was present.
    pub description: Option<String>,
    /// Calendar color (calendars only).
    pub color: Option<String>,
    /// Calendar timezone definition (calendars only).
    pub timezone: Option<String>,
    /// Whether VEVENT is supported. `None` when the server did not report
    /// a supported component set at all.
    pub supports_vevent: Option<bool>,
    /// Whether VTODO is supported; `None` means unknown.
    pub supports_vtodo: Option<bool>,
    /// Whether VJOURNAL is supported; `None` means unknown.
    pub supports_vjournal: Option<bool>,
    /// Webcal subscription source.
    pub source: Option<Url>,
    /// Owner principal URL.
    pub owner: Option<Url>,
    /// Granted privileges; full access when the server sent none.
    pub privileges: Privileges,
}

impl CollectionDescriptor {
    /// Parses a response entry into a descriptor.
    ///
    /// Returns `None` when the entry carries no resource type property, or
    /// one matching neither calendar nor address book nor webcal. That is
    /// not an error; the entry simply does not describe a collection.
    #[must_use]
    pub fn from_entry(entry: &PropFindEntry) -> Option<Self> {
        let resource_type = entry.props.resource_type.as_ref()?;
        let kind = if resource_type.addressbook {
            CollectionType::AddressBook
        } else if resource_type.calendar {
            CollectionType::Calendar
        } else if resource_type.subscribed {
            CollectionType::WebCal
        } else {
            return None;
        };

        let is_calendar = kind == CollectionType::Calendar;
        let (supports_vevent, supports_vtodo, supports_vjournal) =
            match (is_calendar, &entry.props.supported_components) {
                (true, Some(components)) => {
                    let has = |name: &str| components.iter().any(|c| c == name);
                    (
                        Some(has("VEVENT")),
                        Some(has("VTODO")),
                        Some(has("VJOURNAL")),
                    )
                }
                // absent property: unknown, not "none supported"
                _ => (None, None, None),
            };

        Some(Self {
            url: ensure_trailing_slash(&entry.url),
            kind,
            display_name: entry.props.display_name.clone(),
            description: entry
                .props
                .addressbook_description
                .clone()
                .or_else(|| entry.props.calendar_description.clone()),
            color: is_calendar
                .then(|| entry.props.calendar_color.clone())
                .flatten(),
            timezone: is_calendar
                .then(|| entry.props.calendar_timezone.clone())
                .flatten(),
            supports_vevent,
            supports_vtodo,
            supports_vjournal,
            source: entry
                .props
                .source
                .as_ref()
                .and_then(|href| entry.url.join(href).ok()),
            owner: entry
                .props
                .owner
                .as_ref()
                .and_then(|href| entry.url.join(href).ok()),
            privileges: entry.props.privileges.unwrap_or_default(),
        })
    }

    /// Whether this descriptor qualifies as a syncable collection of the
    /// given service.
    ///
    /// Webcal subscriptions with a source URL qualify regardless of the
    /// owning service type.
    #[must_use]
    pub fn is_usable(&self, service: ServiceType) -> bool {
        match (service, self.kind) {
            (ServiceType::CardDav, CollectionType::AddressBook)
            | (ServiceType::CalDav, CollectionType::Calendar | CollectionType::WebCal) => true,
            (_, CollectionType::WebCal) => self.source.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use davmirror_dav::{PropFindEntry, Properties, Relation, ResourceType};

    use super::*;

    fn entry(url: &str, props: Properties) -> PropFindEntry {
        PropFindEntry {
            relation: Relation::Member,
            url: Url::parse(url).expect("Failed to parse URL"),
            status: None,
            props,
        }
    }

    fn resource_type(
        collection: bool,
        calendar: bool,
        addressbook: bool,
        subscribed: bool,
    ) -> ResourceType {
        ResourceType {
            collection,
            calendar,
            addressbook,
            subscribed,
            principal: false,
        }
    }

    #[test]
    fn no_resource_type_yields_no_descriptor() {
        let props = Properties {
            display_name: Some("Something".to_string()),
            ..Default::default()
        };
        assert!(CollectionDescriptor::from_entry(&entry("https://example.com/x/", props)).is_none());
    }

    #[test]
    fn plain_collection_yields_no_descriptor() {
        let props = Properties {
            resource_type: Some(resource_type(true, false, false, false)),
            ..Default::default()
        };
        assert!(CollectionDescriptor::from_entry(&entry("https://example.com/x/", props)).is_none());
    }

    #[test]
    fn calendar_descriptor_with_components() {
        let props = Properties {
            resource_type: Some(resource_type(true, true, false, false)),
            display_name: Some("Work".to_string()),
            calendar_description: Some("Work calendar".to_string()),
            calendar_color: Some("#00FF00FF".to_string()),
            supported_components: Some(vec!["VEVENT".to_string()]),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/work", props))
                .expect("Expected a descriptor");

        assert_eq!(descriptor.kind, CollectionType::Calendar);
        assert_eq!(descriptor.url.as_str(), "https://example.com/dav/work/");
        assert_eq!(descriptor.description.as_deref(), Some("Work calendar"));
        assert_eq!(descriptor.supports_vevent, Some(true));
        assert_eq!(descriptor.supports_vtodo, Some(false));
        assert_eq!(descriptor.supports_vjournal, Some(false));
        assert!(descriptor.is_usable(ServiceType::CalDav));
        assert!(!descriptor.is_usable(ServiceType::CardDav));
    }

    #[test]
    fn missing_component_set_is_unknown() {
        let props = Properties {
            resource_type: Some(resource_type(true, true, false, false)),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/work/", props))
                .expect("Expected a descriptor");
        assert_eq!(descriptor.supports_vevent, None);
        assert_eq!(descriptor.supports_vtodo, None);
        assert_eq!(descriptor.supports_vjournal, None);
    }

    #[test]
    fn absent_privileges_mean_full_access() {
        let props = Properties {
            resource_type: Some(resource_type(true, false, true, false)),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/book/", props))
                .expect("Expected a descriptor");
        assert!(descriptor.privileges.write_content);
        assert!(descriptor.privileges.unbind);
    }

    #[test]
    fn empty_privilege_set_is_not_full_access() {
        let props = Properties {
            resource_type: Some(resource_type(true, true, false, false)),
            privileges: Some(Privileges::none()),
            supported_components: Some(Vec::new()),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/locked/", props))
                .expect("Expected a descriptor");
        assert!(!descriptor.privileges.write_content);
        assert!(!descriptor.privileges.unbind);
        // an empty component set reported nothing supported
        assert_eq!(descriptor.supports_vevent, Some(false));
        assert_eq!(descriptor.supports_vtodo, Some(false));
        assert_eq!(descriptor.supports_vjournal, Some(false));
    }

    #[test]
    fn webcal_usable_with_source_on_any_service() {
        let props = Properties {
            resource_type: Some(resource_type(true, false, false, true)),
            source: Some("https://example.com/holidays.ics".to_string()),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/holidays/", props))
                .expect("Expected a descriptor");
        assert_eq!(descriptor.kind, CollectionType::WebCal);
        assert!(descriptor.is_usable(ServiceType::CalDav));
        assert!(descriptor.is_usable(ServiceType::CardDav));

        let props = Properties {
            resource_type: Some(resource_type(true, false, false, true)),
            ..Default::default()
        };
        let sourceless =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/holidays/", props))
                .expect("Expected a descriptor");
        // still usable under CalDAV, but not under CardDAV without a source
        assert!(sourceless.is_usable(ServiceType::CalDav));
        assert!(!sourceless.is_usable(ServiceType::CardDav));
    }

    #[test]
    fn owner_href_resolved_against_entry_url() {
        let props = Properties {
            resource_type: Some(resource_type(true, true, false, false)),
            owner: Some("/principals/user/".to_string()),
            ..Default::default()
        };
        let descriptor =
            CollectionDescriptor::from_entry(&entry("https://example.com/dav/work/", props))
                .expect("Expected a descriptor");
        assert_eq!(
            descriptor.owner.as_ref().map(Url::as_str),
            Some("https://example.com/principals/user/")
        );
    }
}
