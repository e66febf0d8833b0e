// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `ProviderRegistry::resolve`
//!
//! These tests use wiremock to stand in for the three providers and check the
//! race semantics: first answer wins, provider failures stay silent, and an
//! unanswered lookup is reported at the deadline.

use std::{sync::Arc, time::Duration};

use api_client::AddressRecord;
use external_apis::{
    AddressLookup, LOOKUP_DEADLINE, Postmon, ProviderRegistry, RaceOutcome, RepublicaVirtual,
    ViaCep,
};
use tokio::time::Instant;
use tokio_test::assert_ok;
use wiremock::{MockServer, ResponseTemplate};

use fixtures::*;

const SHORT_DEADLINE: Duration = Duration::from_millis(300);

fn viacep_record() -> AddressRecord {
    AddressRecord::new("viacep", "São Paulo", "Bela Vista", "Av. Paulista", "SP")
}

fn postmon_record() -> AddressRecord {
    AddressRecord::new("postmon", "São Paulo", "Bela Vista", "Avenida Paulista", "SP")
}

fn republica_virtual_record() -> AddressRecord {
    AddressRecord::new(
        "republica_virtual",
        "São Paulo",
        "Bela Vista",
        "Avenida Paulista",
        "SP",
    )
}

/// Only ViaCEP knows the zip code; the others answer "not found"
#[tokio::test]
async fn single_valid_provider_resolves() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::viacep_found()),
    )
    .await;
    ProviderFixture::mount_postmon(&mock_server, ZIP_CODE, ResponseTemplate::new(200)).await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::republica_virtual_not_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let outcome = registry.resolve(ZIP_CODE, LOOKUP_DEADLINE).await;

    assert_eq!(outcome, RaceOutcome::Resolved(viacep_record()));
}

/// República Virtual joins the street type with the street name
#[tokio::test]
async fn republica_virtual_record_joins_street_type() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::viacep_not_found()),
    )
    .await;
    ProviderFixture::mount_postmon(&mock_server, ZIP_CODE, ResponseTemplate::new(200)).await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::republica_virtual_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let record = registry
        .resolve(ZIP_CODE, LOOKUP_DEADLINE)
        .await
        .into_record()
        .expect("republica virtual should resolve");

    assert_eq!(record, republica_virtual_record());
    assert_eq!(record.street(), "Avenida Paulista");
}

/// Every provider signals "not found" its own way
#[tokio::test]
async fn all_not_found_is_unresolved_at_deadline() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_all_not_found(&mock_server, ZIP_CODE).await;

    let registry = mocked_registry(&mock_server);
    let started = Instant::now();
    let outcome = registry.resolve(ZIP_CODE, LOOKUP_DEADLINE).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, RaceOutcome::Unresolved);
    assert!(elapsed >= LOOKUP_DEADLINE, "returned early after {elapsed:?}");
    assert!(
        elapsed < LOOKUP_DEADLINE + Duration::from_millis(500),
        "returned late after {elapsed:?}"
    );
}

/// Server errors, missing routes and malformed bodies are all silent
#[tokio::test]
async fn hard_failures_are_unresolved() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;
    // Postmon has no route mounted and gets wiremock's 404.

    let registry = mocked_registry(&mock_server);
    let started = Instant::now();
    let outcome = registry.resolve(ZIP_CODE, SHORT_DEADLINE).await;

    assert_eq!(outcome, RaceOutcome::Unresolved);
    assert!(started.elapsed() >= SHORT_DEADLINE);
}

/// Several valid answers still produce exactly one of them
#[tokio::test]
async fn multiple_successes_return_one_candidate() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::viacep_found()),
    )
    .await;
    ProviderFixture::mount_postmon(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::postmon_found()),
    )
    .await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::republica_virtual_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let record = registry
        .resolve(ZIP_CODE, LOOKUP_DEADLINE)
        .await
        .into_record()
        .expect("at least one provider should resolve");

    let candidates = [viacep_record(), postmon_record(), republica_virtual_record()];
    assert!(candidates.contains(&record), "unexpected record {record:?}");
}

/// The fastest valid answer wins over a slower, equally valid one
#[tokio::test]
async fn fastest_provider_wins() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200)
            .set_body_json(ProviderFixture::viacep_found())
            .set_delay(Duration::from_millis(800)),
    )
    .await;
    ProviderFixture::mount_postmon(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::postmon_found()),
    )
    .await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::republica_virtual_not_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let started = Instant::now();
    let outcome = registry.resolve(ZIP_CODE, LOOKUP_DEADLINE).await;

    assert_eq!(outcome, RaceOutcome::Resolved(postmon_record()));
    assert!(started.elapsed() < Duration::from_millis(700));
}

/// A valid answer that arrives after the deadline does not count
#[tokio::test]
async fn answer_after_deadline_is_unresolved() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_all_not_found(&mock_server, ZIP_CODE).await;

    let slow_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &slow_server,
        ZIP_CODE,
        ResponseTemplate::new(200)
            .set_body_json(ProviderFixture::viacep_found())
            .set_delay(Duration::from_millis(900)),
    )
    .await;

    let services: Vec<Arc<dyn AddressLookup>> = vec![
        Arc::new(ViaCep::with_base_url(slow_server.uri())),
        Arc::new(Postmon::with_base_url(mock_server.uri())),
        Arc::new(RepublicaVirtual::with_base_url(mock_server.uri())),
    ];
    let registry = assert_ok!(ProviderRegistry::with_services(services));

    let started = Instant::now();
    let outcome = registry.resolve(ZIP_CODE, SHORT_DEADLINE).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, RaceOutcome::Unresolved);
    assert!(elapsed >= SHORT_DEADLINE);
    assert!(elapsed < Duration::from_millis(800), "waited for the slow provider");
}

/// Providers are queried in parallel, not one after another
#[tokio::test]
async fn providers_are_queried_concurrently() {
    let delay = Duration::from_millis(300);
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200)
            .set_body_json(ProviderFixture::viacep_not_found())
            .set_delay(delay),
    )
    .await;
    ProviderFixture::mount_postmon(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_delay(delay),
    )
    .await;
    ProviderFixture::mount_republica_virtual(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200)
            .set_body_json(ProviderFixture::republica_virtual_found())
            .set_delay(delay),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let started = Instant::now();
    let outcome = registry.resolve(ZIP_CODE, LOOKUP_DEADLINE).await;

    assert_eq!(outcome, RaceOutcome::Resolved(republica_virtual_record()));
    assert!(started.elapsed() < delay * 2);

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 3);
}

/// An unreachable provider does not keep the others from winning
#[tokio::test]
async fn unreachable_provider_is_ignored() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_postmon(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::postmon_found()),
    )
    .await;

    let services: Vec<Arc<dyn AddressLookup>> = vec![
        Arc::new(ViaCep::with_base_url("http://127.0.0.1:1/")),
        Arc::new(Postmon::with_base_url(mock_server.uri())),
    ];
    let registry = assert_ok!(ProviderRegistry::with_services(services));

    let outcome = registry.resolve(ZIP_CODE, LOOKUP_DEADLINE).await;

    assert_eq!(outcome, RaceOutcome::Resolved(postmon_record()));
}

/// An unbounded deadline still returns as soon as a provider answers
#[tokio::test]
async fn oversized_deadline_does_not_overflow() {
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        ZIP_CODE,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::viacep_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);
    let outcome = registry.resolve(ZIP_CODE, Duration::MAX).await;

    assert_eq!(outcome, RaceOutcome::Resolved(viacep_record()));
}

/// Zip codes are forwarded exactly as received
#[tokio::test]
async fn raw_zip_code_is_forwarded_unchanged() {
    let raw_zip_code = "01310100";
    let mock_server = MockServer::start().await;
    ProviderFixture::mount_viacep(
        &mock_server,
        raw_zip_code,
        ResponseTemplate::new(200).set_body_json(ProviderFixture::viacep_found()),
    )
    .await;

    let registry = mocked_registry(&mock_server);

    let outcome = registry.resolve(raw_zip_code, LOOKUP_DEADLINE).await;
    assert_eq!(outcome, RaceOutcome::Resolved(viacep_record()));

    // The punctuated form maps to different routes, none of which are mounted.
    let outcome = registry.resolve("01310-100", SHORT_DEADLINE).await;
    assert_eq!(outcome, RaceOutcome::Unresolved);
}
