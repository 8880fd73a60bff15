mod server;

use anyhow::Context;
use clap::Parser;
use server::config::{CliArgs, ServerConfig};
use server::service::handler::EchoService;
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use volley_tonic_core::proto::FILE_DESCRIPTOR_SET;
use volley_tonic_core::proto::echo_server::EchoServer;
use volley_tonic_core::server_tls_config;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry();
    let config = ServerConfig::try_from(args)?;

    // Credential failures are fatal before the listener binds.
    let tls = server_tls_config(config.trust, &config.material)?;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    let incoming = TcpListenerStream::new(listener);

    tracing::info!(
        addr = %bind_addr,
        trust = %config.trust,
        keepalive = config.keepalive.is_some(),
        "server listening"
    );
    if !config.allowed_callers.is_empty() {
        tracing::info!(callers = ?config.allowed_callers, "expecting mtls callers");
    }

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<EchoServer<EchoService>>()
        .await;

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let mut builder = Server::builder();
    if let Some(tls) = tls {
        builder = builder.tls_config(tls)?;
    }
    if let Some(ka) = config.keepalive {
        // Server-side probing detects and terminates dead client sessions;
        // it composes independently of the trust mode.
        builder = builder
            .http2_keepalive_interval(Some(ka.interval))
            .http2_keepalive_timeout(Some(ka.timeout));
    }

    builder
        .add_service(health_service)
        .add_service(reflection)
        .add_service(EchoServer::new(EchoService))
        .serve_with_incoming_shutdown(incoming, shutdown_signal(health_reporter))
        .await?;

    tracing::info!("service shut down");
    Ok(())
}

async fn shutdown_signal(health_reporter: HealthReporter) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    // Publish the status before the listener stops accepting.
    health_reporter
        .set_not_serving::<EchoServer<EchoService>>()
        .await;
}
