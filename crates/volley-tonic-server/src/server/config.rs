//! Runtime configuration for the server binary.
//!
//! All values are parsed from CLI arguments or environment variables and
//! validated into an immutable [`ServerConfig`] before the listener binds.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use volley_tonic_core::{CertificateMaterial, CredentialError, InvalidDuration, TrustMode};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "volley-tonic-server",
    version,
    about = "gRPC echo server with configurable transport trust"
)]
pub struct CliArgs {
    /// Port to listen on (binds 0.0.0.0).
    ///
    /// Environment variable: `LISTEN_PORT`
    #[arg(long, env = "LISTEN_PORT", default_value_t = 50051)]
    pub port: u16,

    /// Transport trust mode: none, oneway or mtls.
    ///
    /// Environment variable: `TRUST_MODE`
    #[arg(long, env = "TRUST_MODE", default_value_t = String::from("none"))]
    pub trust: String,

    /// Server certificate (PEM). Required for oneway and mtls.
    #[arg(long, env = "CERT_PATH")]
    pub cert: Option<PathBuf>,

    /// Server private key (PEM). Required for oneway and mtls.
    #[arg(long, env = "KEY_PATH")]
    pub key: Option<PathBuf>,

    /// CA pool used to verify client certificates (PEM). Required for mtls.
    #[arg(long, env = "CA_CERT_PATH")]
    pub cacert: Option<PathBuf>,

    /// Comma-separated caller identities expected under mtls.
    #[arg(long, env = "ALLOWED_CALLERS")]
    pub allowed_callers: Option<String>,

    /// Probe client connections and close the ones that stop answering.
    #[arg(long, env = "KEEPALIVE", default_value_t = true, action = clap::ArgAction::Set)]
    pub keepalive: bool,

    /// Interval between server-side keepalive probes.
    #[arg(long, env = "KEEPALIVE_INTERVAL", default_value_t = String::from("5s"))]
    pub keepalive_interval: String,

    /// How long an unanswered probe may linger before the connection is
    /// closed.
    #[arg(long, env = "KEEPALIVE_TIMEOUT", default_value_t = String::from("20s"))]
    pub keepalive_timeout: String,
}

/// Startup configuration failures, all fatal before the listener binds.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("invalid value for --{option}")]
    InvalidDuration {
        option: &'static str,
        #[source]
        source: InvalidDuration,
    },
}

/// Server-side HTTP/2 keepalive policy.
#[derive(Clone, Copy, Debug)]
pub struct KeepalivePolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Immutable server configuration, fully validated at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub trust: TrustMode,
    pub material: CertificateMaterial,
    pub allowed_callers: Vec<String>,
    pub keepalive: Option<KeepalivePolicy>,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let trust = args.trust.parse::<TrustMode>()?;

        let allowed_callers: Vec<String> = args
            .allowed_callers
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|caller| !caller.is_empty())
            .map(str::to_string)
            .collect();
        if !allowed_callers.is_empty() && trust != TrustMode::MutualAuth {
            tracing::warn!(
                ?allowed_callers,
                %trust,
                "allowed caller list is only honored under mtls"
            );
        }

        let keepalive = if args.keepalive {
            Some(KeepalivePolicy {
                interval: parse_option("keepalive-interval", &args.keepalive_interval)?,
                timeout: parse_option("keepalive-timeout", &args.keepalive_timeout)?,
            })
        } else {
            None
        };

        Ok(Self {
            port: args.port,
            trust,
            material: CertificateMaterial {
                certificate: args.cert,
                private_key: args.key,
                ca_certificate: args.cacert,
            },
            allowed_callers,
            keepalive,
        })
    }
}

fn parse_option(option: &'static str, input: &str) -> Result<Duration, ConfigError> {
    volley_tonic_core::parse_duration(input)
        .map_err(|source| ConfigError::InvalidDuration { option, source })
}
