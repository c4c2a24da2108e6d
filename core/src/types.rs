// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use davmirror_dav::Prop;

/// The kind of DAV service a [`crate::localdb::ServiceRecord`] mirrors.
///
/// Service-type specific behavior (which home-set property to ask a
/// principal for, which resource types are usable) hangs off this enum
/// instead of being scattered through the refresh code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ServiceType {
    /// Calendar service (RFC 4791).
    CalDav,
    /// Address book service (RFC 6352).
    CardDav,
}

impl ServiceType {
    /// The property that names a principal's home sets for this service.
    #[must_use]
    pub const fn home_set_prop(self) -> Prop {
        match self {
            Self::CalDav => Prop::CalendarHomeSet,
            Self::CardDav => Prop::AddressbookHomeSet,
        }
    }

    /// Properties to request when querying a principal of this service.
    /// `personal` additionally asks for proxy and group relations, which are
    /// only followed from the account's own principal.
    #[must_use]
    pub fn principal_props(self, personal: bool) -> Vec<Prop> {
        let mut props = vec![Prop::DisplayName, self.home_set_prop()];
        if personal {
            props.extend([
                Prop::CalendarProxyReadFor,
                Prop::CalendarProxyWriteFor,
                Prop::GroupMembership,
            ]);
        }
        props
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalDav => write!(f, "caldav"),
            Self::CardDav => write!(f, "carddav"),
        }
    }
}

/// The kind of a discovered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CollectionType {
    /// CardDAV address book.
    AddressBook,
    /// CalDAV calendar.
    Calendar,
    /// Webcal subscription.
    WebCal,
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressBook => write!(f, "addressbook"),
            Self::Calendar => write!(f, "calendar"),
            Self::WebCal => write!(f, "webcal"),
        }
    }
}
