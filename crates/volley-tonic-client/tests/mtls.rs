//! Live mutual-TLS handshake tests against a real in-process server.
//!
//! The PEM material under `tests/testdata/` is a throwaway ECDSA chain: one
//! CA signing the server identity (SAN `localhost` / `127.0.0.1`) and a
//! client identity, plus a second client identity signed by an unrelated CA.

mod common;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use common::TestEcho;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use volley_tonic_client::channel::{self, ChannelConfig, KeepaliveConfig};
use volley_tonic_client::procedures;
use volley_tonic_core::proto::echo_server::EchoServer;
use volley_tonic_core::{CertificateMaterial, TrustMode, server_tls_config};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata")).join(name)
}

fn pair(cert: &str, key: &str) -> CertificateMaterial {
    CertificateMaterial {
        certificate: Some(fixture(cert)),
        private_key: Some(fixture(key)),
        ca_certificate: Some(fixture("ca.crt")),
    }
}

async fn spawn_mtls_server() -> SocketAddr {
    let tls = server_tls_config(TrustMode::MutualAuth, &pair("server.crt", "server.key"))
        .unwrap()
        .expect("mutual auth always yields a TLS config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .tls_config(tls)
            .unwrap()
            .add_service(EchoServer::new(TestEcho))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

fn config(addr: SocketAddr, trust: TrustMode, material: CertificateMaterial) -> ChannelConfig {
    ChannelConfig {
        target_addr: addr.to_string(),
        trust,
        material,
        // The server certificate names `localhost`, not the dialed IP.
        domain_override: Some("localhost".to_string()),
        keepalive: Some(KeepaliveConfig::default()),
    }
}

/// Connects and issues one greeting, flattening both failure stages into a
/// printable error.
async fn try_greet(config: &ChannelConfig) -> Result<String, String> {
    let channel = channel::connect(config)
        .await
        .map_err(|err| err.to_string())?;
    procedures::greet_once(channel, "Ada")
        .await
        .map_err(|err| err.to_string())
}

#[tokio::test]
async fn signed_client_completes_the_handshake_and_a_call() {
    let addr = spawn_mtls_server().await;
    let config = config(addr, TrustMode::MutualAuth, pair("client.crt", "client.key"));

    let greeting = tokio::time::timeout(Duration::from_secs(10), try_greet(&config))
        .await
        .unwrap()
        .unwrap();
    assert!(greeting.contains("Ada"), "greeting was {greeting:?}");
}

#[tokio::test]
async fn client_presenting_no_certificate_is_rejected() {
    let addr = spawn_mtls_server().await;
    // Server-auth material only: the client trusts the CA but presents no
    // identity of its own.
    let material = CertificateMaterial {
        certificate: None,
        private_key: None,
        ca_certificate: Some(fixture("ca.crt")),
    };
    let config = config(addr, TrustMode::ServerAuth, material);

    let result = tokio::time::timeout(Duration::from_secs(10), try_greet(&config))
        .await
        .unwrap();
    assert!(
        result.is_err(),
        "a certificate-less client must not complete a call: {result:?}"
    );
}

#[tokio::test]
async fn client_signed_by_an_untrusted_ca_is_rejected() {
    let addr = spawn_mtls_server().await;
    let config = config(
        addr,
        TrustMode::MutualAuth,
        pair("rogue-client.crt", "rogue-client.key"),
    );

    let result = tokio::time::timeout(Duration::from_secs(10), try_greet(&config))
        .await
        .unwrap();
    assert!(
        result.is_err(),
        "an identity outside the server's CA pool must not complete a call: {result:?}"
    );
}
