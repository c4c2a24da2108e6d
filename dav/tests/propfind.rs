// SPDX-FileCopyrightText: 2026 davmirror contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Client integration tests with wiremock.

use davmirror_dav::{AuthMethod, DavClient, DavConfig, Depth, Prop, Relation};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> DavClient {
    DavClient::new(DavConfig {
        auth: AuthMethod::None,
        ..Default::default()
    })
    .expect("Failed to create client")
}

#[tokio::test]
async fn propfind_tags_target_and_members() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/user/"))
        .and(header("Content-Type", "application/xml; charset=utf-8"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/dav/calendars/user/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Home</D:displayname>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/calendars/user/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Personal Calendar</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/dav/calendars/user/", mock_server.uri()))
        .expect("Failed to parse URL");
    let result = client()
        .propfind(
            &url,
            Depth::One,
            &[Prop::DisplayName, Prop::ResourceType],
        )
        .await
        .expect("PROPFIND failed");

    assert_eq!(result.entries.len(), 2);

    let target = &result.entries[0];
    assert_eq!(target.relation, Relation::Target);
    assert_eq!(target.props.display_name.as_deref(), Some("Home"));

    let member = &result.entries[1];
    assert_eq!(member.relation, Relation::Member);
    assert!(member.url.as_str().ends_with("/dav/calendars/user/personal/"));
    let rt = member.props.resource_type.expect("Missing resourcetype");
    assert!(rt.calendar);
}

#[tokio::test]
async fn propfind_resolves_absolute_hrefs() {
    let mock_server = MockServer::start().await;

    let body = format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>{}/principals/user</D:href>
    <D:propstat>
      <D:prop><D:displayname>User</D:displayname></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
        mock_server.uri()
    );

    Mock::given(method("PROPFIND"))
        .and(path("/principals/user/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/principals/user/", mock_server.uri()))
        .expect("Failed to parse URL");
    let result = client()
        .propfind(&url, Depth::Zero, &[Prop::DisplayName])
        .await
        .expect("PROPFIND failed");

    // Absolute href, trailing slash difference: still the target
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].relation, Relation::Target);
}

#[tokio::test]
async fn propfind_not_found_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/dav/calendars/gone/", mock_server.uri()))
        .expect("Failed to parse URL");
    let err = client()
        .propfind(&url, Depth::Zero, &[Prop::ResourceType])
        .await
        .expect_err("Expected PROPFIND to fail");

    assert_eq!(err.status(), Some(404));
    assert!(err.is_gone());
}

#[tokio::test]
async fn propfind_sends_basic_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:"></D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = DavClient::new(DavConfig {
        auth: AuthMethod::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        },
        ..Default::default()
    })
    .expect("Failed to create client");

    let url = Url::parse(&format!("{}/dav/", mock_server.uri())).expect("Failed to parse URL");
    let result = client
        .propfind(&url, Depth::Zero, &[Prop::ResourceType])
        .await
        .expect("PROPFIND failed");
    assert!(result.entries.is_empty());
}
