// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Mocked postal code providers

use std::{net::SocketAddr, sync::Arc};

use api::{Server, ServerConfig, ShutdownConfig};
use external_apis::{AddressLookup, Postmon, ProviderRegistry, RepublicaVirtual, ViaCep};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const ZIP_CODE: &str = "01310-100";

/// Mount ViaCEP knowing `zip_code` and the other two answering "not found"
pub async fn mount_viacep_only(server: &MockServer, zip_code: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ws/{zip_code}/json/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "01310-100",
            "logradouro": "Av. Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        })))
        .mount(server)
        .await;
    mount_postmon_not_found(server, zip_code).await;
    mount_republica_virtual_not_found(server, zip_code).await;
}

/// Mount every provider answering "not found"
pub async fn mount_all_not_found(server: &MockServer, zip_code: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ws/{zip_code}/json/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": "true" })))
        .mount(server)
        .await;
    mount_postmon_not_found(server, zip_code).await;
    mount_republica_virtual_not_found(server, zip_code).await;
}

async fn mount_postmon_not_found(server: &MockServer, zip_code: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/cep/{zip_code}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_republica_virtual_not_found(server: &MockServer, zip_code: &str) {
    Mock::given(method("GET"))
        .and(path("/web_cep.php"))
        .and(query_param("cep", zip_code))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultado": "0",
            "resultado_txt": "sucesso - cep não encontrado"
        })))
        .mount(server)
        .await;
}

/// Registry racing the three production adapters pointed at `server`
pub fn mocked_registry(server: &MockServer) -> Arc<ProviderRegistry> {
    let services: Vec<Arc<dyn AddressLookup>> = vec![
        Arc::new(ViaCep::with_base_url(server.uri())),
        Arc::new(Postmon::with_base_url(server.uri())),
        Arc::new(RepublicaVirtual::with_base_url(server.uri())),
    ];
    Arc::new(ProviderRegistry::with_services(services).expect("registry builds"))
}

/// Start a test server racing the mocked providers
pub async fn spawn_server(
    server: &MockServer,
    config: ServerConfig,
) -> (SocketAddr, CancellationToken) {
    Server::with_registry(config, ShutdownConfig::default(), mocked_registry(server))
        .run_for_testing()
        .await
        .expect("Failed to start test server")
}
