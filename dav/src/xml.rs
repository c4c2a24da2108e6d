// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! XML namespaces used in WebDAV discovery.

/// XML namespaces used in WebDAV/CalDAV/CardDAV properties.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";

    /// CalendarServer extensions (proxies, webcal subscriptions).
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";

    /// Apple iCal extensions (calendar color).
    pub const APPLE_ICAL: &str = "http://apple.com/ns/ical/";
}
