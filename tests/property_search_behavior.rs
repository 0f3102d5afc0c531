//! Behavior-driven tests for property searches through the registry.

mod support;

use alquileres_core::{PropertyFilter, SourceErrorKind};
use serde_json::{json, Value};

use support::{Reply, ScriptedBackend};

const SEARCH: &str = "/api/properties/search";

fn sent_body(backend: &ScriptedBackend) -> Value {
    let request = backend
        .requests_to(SEARCH)
        .into_iter()
        .next()
        .expect("search request sent");
    serde_json::from_str(request.body.as_deref().expect("body")).expect("json body")
}

// =============================================================================
// Request shaping
// =============================================================================

#[tokio::test]
async fn when_filter_is_empty_then_defaults_are_sent() {
    // Given
    let backend = ScriptedBackend::new(|path, _, _| (path == SEARCH).then(|| Reply::json(200, "[]")));
    let client = support::client(&backend, support::config());

    // When
    let records = client
        .search("inmoup", PropertyFilter::new())
        .await
        .expect("search");

    // Then
    assert!(records.is_empty());
    assert_eq!(
        sent_body(&backend),
        json!({
            "source": "inmoup",
            "province": "",
            "cities": [],
            "property_type": "Departamentos"
        })
    );
    let request = &backend.requests_to(SEARCH)[0];
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("authorization"), Some("Bearer token-1"));
}

#[tokio::test]
async fn when_filter_is_complete_then_it_is_forwarded_with_source_tag() {
    let backend = ScriptedBackend::new(|path, _, _| (path == SEARCH).then(|| Reply::json(200, "[]")));
    let client = support::client(&backend, support::config());

    let filter = PropertyFilter::new()
        .with_province("Mendoza")
        .with_cities(["Capital", "Godoy Cruz"])
        .with_property_type("Casas");
    client.search("MendozaProp", filter).await.expect("search");

    assert_eq!(
        sent_body(&backend),
        json!({
            "source": "mendozaprop",
            "province": "Mendoza",
            "cities": ["Capital", "Godoy Cruz"],
            "property_type": "Casas"
        })
    );
}

// =============================================================================
// Geolocation filtering
// =============================================================================

#[tokio::test]
async fn when_mendozaprop_returns_records_without_coordinates_then_they_are_dropped() {
    // Given: one located and one unlocated record
    let backend = ScriptedBackend::new(|path, _, _| {
        (path == SEARCH).then(|| {
            Reply::json(
                200,
                r#"[{"id":1,"lat":1,"lon":2},{"id":2,"lat":null,"lon":null},{"id":3}]"#,
            )
        })
    });
    let client = support::client(&backend, support::config());

    // When
    let records = client
        .search("mendozaprop", PropertyFilter::new())
        .await
        .expect("search");

    // Then
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("id"), Some(&json!(1)));
}

#[tokio::test]
async fn when_inmoup_returns_records_without_coordinates_then_all_are_kept() {
    let backend = ScriptedBackend::new(|path, _, _| {
        (path == SEARCH).then(|| Reply::json(200, r#"[{"id":1,"lat":1,"lon":2},{"id":2}]"#))
    });
    let client = support::client(&backend, support::config());

    let records = client
        .search("inmoup", PropertyFilter::new())
        .await
        .expect("search");

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].as_value(), &json!({"id": 2}));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn when_backend_returns_an_object_then_response_is_malformed() {
    let backend = ScriptedBackend::new(|path, _, _| {
        (path == SEARCH).then(|| Reply::json(200, r#"{"items":[]}"#))
    });
    let client = support::client(&backend, support::config());

    let error = client
        .search("inmoup", PropertyFilter::new())
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::MalformedResponse);
    assert_eq!(error.code(), "source.malformed_response");
}

#[tokio::test]
async fn when_backend_fails_then_upstream_status_is_reported() {
    let backend = ScriptedBackend::new(|path, _, _| {
        (path == SEARCH).then(|| Reply::json(502, "bad gateway"))
    });
    let client = support::client(&backend, support::config());

    let error = client
        .search("mendozaprop", PropertyFilter::new())
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::UpstreamStatus);
    assert!(error.retryable());
}

#[tokio::test]
async fn when_source_is_unknown_then_no_network_call_is_made() {
    let backend = ScriptedBackend::login_only();
    let client = support::client(&backend, support::config());

    let error = client
        .search("zonaprop", PropertyFilter::new())
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::UnknownSource);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn when_session_cannot_be_established_then_authentication_is_required() {
    let backend = ScriptedBackend::new(|path, _, _| {
        (path == "/token").then(|| Reply::json(401, r#"{"detail":"Incorrect username or password"}"#))
    });
    let client = support::client(&backend, support::config());

    let error = client
        .search("inmoup", PropertyFilter::new())
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::AuthenticationRequired);
    assert_eq!(backend.calls(SEARCH), 0);
}
