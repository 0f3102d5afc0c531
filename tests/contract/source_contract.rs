//! Contract every registered property source must satisfy.

#[path = "../support/mod.rs"]
mod support;

use alquileres_core::{PropertyFilter, SourceErrorKind, SourceId};
use serde_json::Value;

use support::{Reply, ScriptedBackend};

const SEARCH: &str = "/api/properties/search";

#[test]
fn every_source_id_is_registered_by_default() {
    let client = support::client(&ScriptedBackend::login_only(), support::config());

    assert_eq!(client.registry().ids(), SourceId::ALL.to_vec());
    for id in SourceId::ALL {
        let adapter = client.registry().get(id).expect("registered");
        assert_eq!(adapter.id(), id);
        assert!(client.registry().resolve(&id.as_str().to_uppercase()).is_ok());
    }
}

#[tokio::test]
async fn every_source_tags_requests_with_its_own_id() {
    for id in SourceId::ALL {
        let backend = ScriptedBackend::new(|path, _, _| (path == SEARCH).then(|| Reply::json(200, "[]")));
        let client = support::client(&backend, support::config());

        client
            .search(id.as_str(), PropertyFilter::new())
            .await
            .expect("search");

        let request = &backend.requests_to(SEARCH)[0];
        let body: Value = serde_json::from_str(request.body.as_deref().expect("body")).expect("json");
        assert_eq!(body["source"], id.as_str(), "source tag for {id}");
    }
}

#[tokio::test]
async fn every_source_keeps_located_records() {
    for id in SourceId::ALL {
        let backend = ScriptedBackend::new(|path, _, _| {
            (path == SEARCH).then(|| Reply::json(200, r#"[{"latitude":-32.9,"longitude":-68.8}]"#))
        });
        let client = support::client(&backend, support::config());

        let records = client
            .search(id.as_str(), PropertyFilter::new())
            .await
            .expect("search");

        assert_eq!(records.len(), 1, "located record dropped by {id}");
    }
}

#[tokio::test]
async fn every_source_rejects_non_array_bodies() {
    for id in SourceId::ALL {
        let backend = ScriptedBackend::new(|path, _, _| (path == SEARCH).then(|| Reply::json(200, "null")));
        let client = support::client(&backend, support::config());

        let error = client
            .search(id.as_str(), PropertyFilter::new())
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::MalformedResponse, "{id}");
        assert!(!error.retryable());
    }
}

#[test]
fn geolocation_filtering_is_declared_per_source() {
    let client = support::client(&ScriptedBackend::login_only(), support::config());

    let snapshots = client.registry().snapshots();
    let filtering = snapshots
        .iter()
        .filter(|snapshot| snapshot.requires_coordinates)
        .map(|snapshot| snapshot.id)
        .collect::<Vec<_>>();
    assert_eq!(filtering, vec![SourceId::Mendozaprop]);
}
