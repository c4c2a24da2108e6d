// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Multistatus response parser for WebDAV discovery operations.

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

use crate::error::DavError;

/// `WebDAV` multistatus response.
#[derive(Debug, Clone)]
pub struct MultiStatus {
    /// The response items, one per resource the server reported on.
    pub responses: Vec<ResponseItem>,
}

/// Individual response in a multistatus.
#[derive(Debug, Clone)]
pub struct ResponseItem {
    /// The href of the resource, as sent by the server (possibly relative).
    pub href: String,
    /// Per-entry HTTP status code, when the server reported one directly
    /// under `<response>` instead of property data.
    pub status: Option<u16>,
    /// Property stats grouped by status.
    pub prop_stats: Vec<PropStat>,
}

/// Property stat with status and property values.
#[derive(Debug, Clone)]
pub struct PropStat {
    /// The properties reported under this status.
    pub props: Properties,
    /// The status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

/// Typed WebDAV/CalDAV/CardDAV properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// `resourcetype` markers. `None` when the property was entirely absent.
    pub resource_type: Option<ResourceType>,
    /// `current-user-privilege-set`. `None` when the property was absent,
    /// which callers must treat as full access.
    pub privileges: Option<Privileges>,
    /// `owner` principal href.
    pub owner: Option<String>,
    /// `addressbook-description`.
    pub addressbook_description: Option<String>,
    /// `calendar-description`.
    pub calendar_description: Option<String>,
    /// `calendar-color`, raw value such as `#FF0000FF`.
    pub calendar_color: Option<String>,
    /// `calendar-timezone`, raw VTIMEZONE data.
    pub calendar_timezone: Option<String>,
    /// `supported-calendar-component-set` names. `None` when the property
    /// was entirely absent, distinguishing "unknown" from "empty".
    pub supported_components: Option<Vec<String>>,
    /// Webcal subscription `source` href.
    pub source: Option<String>,
    /// `calendar-home-set` / `addressbook-home-set` hrefs.
    pub home_sets: Vec<String>,
    /// `calendar-proxy-read-for` hrefs.
    pub proxy_read_for: Vec<String>,
    /// `calendar-proxy-write-for` hrefs.
    pub proxy_write_for: Vec<String>,
    /// `group-membership` hrefs.
    pub group_membership: Vec<String>,
}

/// Markers found inside `resourcetype`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceType {
    /// `DAV:collection`.
    pub collection: bool,
    /// `CALDAV:calendar`.
    pub calendar: bool,
    /// `CARDDAV:addressbook`.
    pub addressbook: bool,
    /// `CS:subscribed` (webcal subscription).
    pub subscribed: bool,
    /// `DAV:principal`.
    pub principal: bool,
}

/// Privileges granted to the current user on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileges {
    /// May create members in the collection.
    pub bind: bool,
    /// May delete members of the collection.
    pub unbind: bool,
    /// May change member content.
    pub write_content: bool,
}

impl Privileges {
    /// No privileges at all; the parser starts from here and adds what the
    /// server actually granted.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            bind: false,
            unbind: false,
            write_content: false,
        }
    }
}

impl Default for Privileges {
    /// Absence of privilege information means "assume full access".
    fn default() -> Self {
        Self {
            bind: true,
            unbind: true,
            write_content: true,
        }
    }
}

/// Parses the status code out of a status line like `HTTP/1.1 404 Not Found`.
#[must_use]
pub fn status_code(status: &str) -> Option<u16> {
    status.split_whitespace().nth(1)?.parse().ok()
}

/// Whether a status line reports success.
fn status_ok(status: &str) -> bool {
    status_code(status).is_some_and(|code| (200..300).contains(&code))
}

impl ResponseItem {
    /// Whether the entry itself is a success. A per-entry `<status>` of 4xx
    /// or 5xx marks the entry failed even inside a 207 multistatus.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_none_or(|code| (200..300).contains(&code))
    }

    /// Merges the properties of all successful propstats into one bag.
    #[must_use]
    pub fn into_ok_props(self) -> Properties {
        let mut merged = Properties::default();
        for prop_stat in self.prop_stats {
            if status_ok(&prop_stat.status) {
                merged.merge(prop_stat.props);
            }
        }
        merged
    }
}

impl Properties {
    fn merge(&mut self, other: Self) {
        macro_rules! take_if_none {
            ($($field:ident),*) => {
                $(if self.$field.is_none() {
                    self.$field = other.$field;
                })*
            };
        }
        take_if_none!(
            display_name,
            resource_type,
            privileges,
            owner,
            addressbook_description,
            calendar_description,
            calendar_color,
            calendar_timezone,
            supported_components,
            source
        );
        self.home_sets.extend(other.home_sets);
        self.proxy_read_for.extend(other.proxy_read_for);
        self.proxy_write_for.extend(other.proxy_write_for);
        self.group_membership.extend(other.group_membership);
    }
}

/// Decodes the content of a text event.
fn xml_text(text: &BytesText) -> Result<String, DavError> {
    let content = text.xml_content().map_err(quick_xml::Error::from)?;
    Ok(content.to_string())
}

/// Collects all `<href>` texts nested under the current element, until the
/// matching end tag is seen.
fn read_hrefs(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<Vec<String>, DavError> {
    let mut hrefs = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::End(ref e) if e.name().local_name().into_inner() == end => break,
            Event::Start(ref e) if e.name().local_name().into_inner() == b"href" => {
                if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                    hrefs.push(xml_text(&text)?);
                }
            }
            Event::Eof => return Err(DavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(hrefs)
}

impl MultiStatus {
    /// Parses a multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    #[expect(clippy::too_many_lines)]
    pub fn from_xml(xml: &str) -> Result<Self, DavError> {
        let mut reader = Reader::from_str(xml);
        // Configure reader to trim text and check namespaces
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        let mut responses = Vec::new();
        let mut current_response: Option<ResponseItem> = None;
        let mut current_prop_stats: Vec<PropStat> = Vec::new();
        let mut current_props = Properties::default();
        let mut in_response = false;
        let mut in_propstat = false;
        let mut in_prop = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::End(ref e) if e.name().local_name().into_inner() == b"multistatus" => break,
                Event::Eof => break,

                Event::Start(ref e) => match e.name().local_name().into_inner() {
                    b"response" => {
                        in_response = true;
                        current_response = Some(ResponseItem {
                            href: String::new(),
                            status: None,
                            prop_stats: Vec::new(),
                        });
                    }
                    b"href" if in_response && !in_propstat => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            let href = xml_text(&text)?;
                            if let Some(ref mut resp) = current_response {
                                resp.href = href;
                            }
                        }
                    }
                    b"propstat" if in_response => {
                        in_propstat = true;
                        current_props = Properties::default();
                    }

                    b"prop" => in_prop = true,

                    b"displayname" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.display_name = Some(xml_text(&text)?);
                        }
                    }
                    b"resourcetype" if in_prop => {
                        let mut resource_type = ResourceType::default();
                        loop {
                            match reader.read_event_into(&mut buf)? {
                                Event::End(ref e)
                                    if e.name().local_name().into_inner() == b"resourcetype" =>
                                {
                                    break;
                                }
                                Event::Start(ref e) | Event::Empty(ref e) => {
                                    match e.name().local_name().into_inner() {
                                        b"collection" => resource_type.collection = true,
                                        b"calendar" => resource_type.calendar = true,
                                        b"addressbook" => resource_type.addressbook = true,
                                        b"subscribed" => resource_type.subscribed = true,
                                        b"principal" => resource_type.principal = true,
                                        _ => {}
                                    }
                                }
                                Event::Eof => {
                                    return Err(DavError::Xml("Unexpected EOF".to_string()));
                                }
                                _ => {}
                            }
                        }
                        current_props.resource_type = Some(resource_type);
                    }
                    b"current-user-privilege-set" if in_prop => {
                        let mut privileges = Privileges::none();
                        loop {
                            match reader.read_event_into(&mut buf)? {
                                Event::End(ref e)
                                    if e.name().local_name().into_inner()
                                        == b"current-user-privilege-set" =>
                                {
                                    break;
                                }
                                Event::Start(ref e) | Event::Empty(ref e) => {
                                    match e.name().local_name().into_inner() {
                                        b"all" | b"write" => {
                                            privileges.bind = true;
                                            privileges.unbind = true;
                                            privileges.write_content = true;
                                        }
                                        b"bind" => privileges.bind = true,
                                        b"unbind" => privileges.unbind = true,
                                        b"write-content" => privileges.write_content = true,
                                        _ => {}
                                    }
                                }
                                Event::Eof => {
                                    return Err(DavError::Xml("Unexpected EOF".to_string()));
                                }
                                _ => {}
                            }
                        }
                        current_props.privileges = Some(privileges);
                    }
                    b"owner" if in_prop => {
                        current_props.owner = read_hrefs(&mut reader, b"owner")?.into_iter().next();
                    }
                    b"source" if in_prop => {
                        current_props.source =
                            read_hrefs(&mut reader, b"source")?.into_iter().next();
                    }
                    b"addressbook-home-set" if in_prop => {
                        let hrefs = read_hrefs(&mut reader, b"addressbook-home-set")?;
                        current_props.home_sets.extend(hrefs);
                    }
                    b"calendar-home-set" if in_prop => {
                        let hrefs = read_hrefs(&mut reader, b"calendar-home-set")?;
                        current_props.home_sets.extend(hrefs);
                    }
                    b"calendar-proxy-read-for" if in_prop => {
                        let hrefs = read_hrefs(&mut reader, b"calendar-proxy-read-for")?;
                        current_props.proxy_read_for.extend(hrefs);
                    }
                    b"calendar-proxy-write-for" if in_prop => {
                        let hrefs = read_hrefs(&mut reader, b"calendar-proxy-write-for")?;
                        current_props.proxy_write_for.extend(hrefs);
                    }
                    b"group-membership" if in_prop => {
                        let hrefs = read_hrefs(&mut reader, b"group-membership")?;
                        current_props.group_membership.extend(hrefs);
                    }
                    b"addressbook-description" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.addressbook_description = Some(xml_text(&text)?);
                        }
                    }
                    b"calendar-description" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.calendar_description = Some(xml_text(&text)?);
                        }
                    }
                    b"calendar-color" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.calendar_color = Some(xml_text(&text)?);
                        }
                    }
                    b"calendar-timezone" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.calendar_timezone = Some(xml_text(&text)?);
                        }
                    }
                    b"supported-calendar-component-set" if in_prop => {
                        let mut components = Vec::new();
                        loop {
                            match reader.read_event_into(&mut buf)? {
                                Event::End(ref e)
                                    if e.name().local_name().into_inner()
                                        == b"supported-calendar-component-set" =>
                                {
                                    break;
                                }
                                Event::Start(ref e) | Event::Empty(ref e)
                                    if e.name().local_name().into_inner() == b"comp" =>
                                {
                                    if let Ok(Some(name_attr)) = e.try_get_attribute("name") {
                                        let name = std::str::from_utf8(&name_attr.value)
                                            .map_err(|e| {
                                                DavError::Xml(format!("UTF-8 error: {e}"))
                                            })?
                                            .to_string();
                                        components.push(name);
                                    }
                                }
                                Event::Eof => {
                                    return Err(DavError::Xml("Unexpected EOF".to_string()));
                                }
                                _ => {}
                            }
                        }
                        current_props.supported_components = Some(components);
                    }
                    b"status" => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            let status = xml_text(&text)?;
                            if in_propstat {
                                current_prop_stats.push(PropStat {
                                    props: std::mem::take(&mut current_props),
                                    status,
                                });
                            } else if in_response
                                && let Some(ref mut resp) = current_response
                            {
                                resp.status = status_code(&status);
                            }
                        }
                    }
                    _ => {}
                },
                // A self-closing property element is present but empty, not
                // absent: an empty privilege set grants nothing, an empty
                // component set supports nothing.
                Event::Empty(ref e) if in_prop => match e.name().local_name().into_inner() {
                    b"current-user-privilege-set" => {
                        current_props.privileges = Some(Privileges::none());
                    }
                    b"supported-calendar-component-set" => {
                        current_props.supported_components = Some(Vec::new());
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.name().local_name().into_inner() {
                    b"response" if in_response => {
                        in_response = false;
                        if let Some(mut resp) = current_response.take() {
                            resp.prop_stats.append(&mut current_prop_stats);
                            responses.push(resp);
                        }
                    }
                    b"propstat" if in_propstat => {
                        in_propstat = false;
                    }
                    b"prop" => {
                        in_prop = false;
                    }
                    _ => {}
                },
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { responses })
    }
}
