// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for WebDAV discovery operations.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::DavError;
use crate::xml::ns;

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

/// Properties to request in PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// Current user privilege set.
    CurrentUserPrivilegeSet,
    /// Owner principal href.
    Owner,
    /// Group membership hrefs of a principal.
    GroupMembership,
    /// Address book home set hrefs.
    AddressbookHomeSet,
    /// Address book description.
    AddressbookDescription,
    /// Calendar home set hrefs.
    CalendarHomeSet,
    /// Calendar description.
    CalendarDescription,
    /// Calendar timezone.
    CalendarTimezone,
    /// Supported calendar components.
    SupportedCalendarComponentSet,
    /// Calendar color.
    CalendarColor,
    /// Webcal subscription source href.
    Source,
    /// Principals this principal may read calendars for.
    CalendarProxyReadFor,
    /// Principals this principal may write calendars for.
    CalendarProxyWriteFor,
}

impl Prop {
    const fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::CurrentUserPrivilegeSet => "current-user-privilege-set",
            Self::Owner => "owner",
            Self::GroupMembership => "group-membership",
            Self::AddressbookHomeSet => "addressbook-home-set",
            Self::AddressbookDescription => "addressbook-description",
            Self::CalendarHomeSet => "calendar-home-set",
            Self::CalendarDescription => "calendar-description",
            Self::CalendarTimezone => "calendar-timezone",
            Self::SupportedCalendarComponentSet => "supported-calendar-component-set",
            Self::CalendarColor => "calendar-color",
            Self::Source => "source",
            Self::CalendarProxyReadFor => "calendar-proxy-read-for",
            Self::CalendarProxyWriteFor => "calendar-proxy-write-for",
        }
    }

    /// The XML prefix the property is written under. Matching namespace
    /// declarations go on the `propfind` root.
    const fn prefix(self) -> &'static str {
        match self {
            Self::DisplayName
            | Self::ResourceType
            | Self::CurrentUserPrivilegeSet
            | Self::Owner
            | Self::GroupMembership => "D",
            Self::CalendarHomeSet
            | Self::CalendarDescription
            | Self::CalendarTimezone
            | Self::SupportedCalendarComponentSet => "C",
            Self::AddressbookHomeSet | Self::AddressbookDescription => "CARD",
            Self::Source | Self::CalendarProxyReadFor | Self::CalendarProxyWriteFor => "CS",
            Self::CalendarColor => "A",
        }
    }
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        // <D:propfind xmlns:D="DAV:" ...>
        let mut propfind = BytesStart::new("D:propfind");
        propfind.push_attribute(("xmlns:D", ns::DAV));
        if self.props.iter().any(|p| p.prefix() == "C") {
            propfind.push_attribute(("xmlns:C", ns::CALDAV));
        }
        if self.props.iter().any(|p| p.prefix() == "CARD") {
            propfind.push_attribute(("xmlns:CARD", ns::CARDDAV));
        }
        if self.props.iter().any(|p| p.prefix() == "CS") {
            propfind.push_attribute(("xmlns:CS", ns::CALENDARSERVER));
        }
        if self.props.iter().any(|p| p.prefix() == "A") {
            propfind.push_attribute(("xmlns:A", ns::APPLE_ICAL));
        }
        writer.write_event(Event::Start(propfind))?;

        // <D:prop>
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        for prop in &self.props {
            let qualified = format!("{}:{}", prop.prefix(), prop.name());
            writer.write_event(Event::Start(BytesStart::new(qualified.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
        }

        // </D:prop>
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        // </D:propfind>
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| DavError::Xml(format!("UTF-8 error: {e}")))
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}
