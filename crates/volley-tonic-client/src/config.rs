//! Runtime configuration for the client binary.
//!
//! All values are parsed from CLI arguments or environment variables; the
//! validated [`ClientConfig`] is immutable once constructed and passed by
//! reference into each component. No component reads global state.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use volley_tonic_core::{CertificateMaterial, CredentialError, InvalidDuration, TrustMode};

use crate::channel::{ChannelConfig, KeepaliveConfig};
use crate::invoker::{FailurePolicy, InvocationPlan};

/// Which remote procedure the load run drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Procedure {
    Greet,
    Delay,
    Ingest,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "volley-tonic-client",
    version,
    about = "Concurrent load generator for the volley echo service"
)]
pub struct CliArgs {
    /// Address of the server to connect to.
    ///
    /// Environment variable: `TARGET_ADDR`
    #[arg(long, env = "TARGET_ADDR", default_value_t = String::from("localhost:50051"))]
    pub target_addr: String,

    /// Transport trust mode: none, oneway or mtls.
    ///
    /// Environment variable: `TRUST_MODE`
    #[arg(long, env = "TRUST_MODE", default_value_t = String::from("none"))]
    pub trust: String,

    /// Client certificate (PEM). Required for mtls.
    #[arg(long, env = "CERT_PATH")]
    pub cert: Option<PathBuf>,

    /// Client private key (PEM). Required for mtls.
    #[arg(long, env = "KEY_PATH")]
    pub key: Option<PathBuf>,

    /// CA certificate pool (PEM). Required for mtls; under oneway the system
    /// root pool is trusted when this is absent.
    #[arg(long, env = "CA_CERT_PATH")]
    pub cacert: Option<PathBuf>,

    /// Expected server name on the presented certificate, when it differs
    /// from the dialed host.
    #[arg(long, env = "TLS_DOMAIN")]
    pub tls_domain: Option<String>,

    /// Probe the connection while idle and drop it when probes go unanswered.
    #[arg(long, env = "KEEPALIVE", default_value_t = true, action = clap::ArgAction::Set)]
    pub keepalive: bool,

    /// Interval between keepalive probes.
    #[arg(long, env = "KEEPALIVE_INTERVAL", default_value_t = String::from("10s"))]
    pub keepalive_interval: String,

    /// How long an unanswered probe may linger before the connection is
    /// considered dead.
    #[arg(long, env = "KEEPALIVE_TIMEOUT", default_value_t = String::from("5s"))]
    pub keepalive_timeout: String,

    /// Per-call deadline, e.g. "1s" or "500ms".
    ///
    /// Environment variable: `CALL_DEADLINE`
    #[arg(long, env = "CALL_DEADLINE", default_value_t = String::from("1s"))]
    pub call_deadline: String,

    /// Number of concurrent workers.
    #[arg(long, env = "WORKER_COUNT", default_value_t = 10)]
    pub workers: usize,

    /// Sequential calls issued by each worker.
    #[arg(long, env = "LOOPS_PER_WORKER", default_value_t = 10)]
    pub loops: usize,

    /// Payload size in bytes for the ingest procedure.
    #[arg(long, env = "PAYLOAD_SIZE_BYTES", default_value_t = 4096)]
    pub payload_size: usize,

    /// Sleep requested from the delay procedure, in milliseconds.
    #[arg(long, env = "DELAY_MS", default_value_t = 100)]
    pub delay_ms: i64,

    /// Name sent in the greeting.
    #[arg(long, env = "GREET_NAME", default_value_t = String::from("Scott"))]
    pub name: String,

    /// Procedure driven by the load run.
    #[arg(long, env = "PROCEDURE", value_enum, default_value = "delay")]
    pub procedure: Procedure,

    /// What a worker does after one of its calls fails.
    #[arg(long, env = "FAILURE_POLICY", value_enum, default_value = "abort-on-first-error")]
    pub policy: FailurePolicy,
}

/// Startup configuration failures, all fatal before any channel is built.
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

/// Immutable client configuration, fully validated at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub channel: ChannelConfig,
    pub call_deadline: Duration,
    pub plan: InvocationPlan,
    pub delay_ms: i64,
    pub name: String,
    pub procedure: Procedure,
    pub policy: FailurePolicy,
}

impl TryFrom<CliArgs> for ClientConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let trust = args.trust.parse::<TrustMode>()?;

        let keepalive = if args.keepalive {
            Some(KeepaliveConfig {
                interval: parse_option("keepalive-interval", &args.keepalive_interval)?,
                timeout: parse_option("keepalive-timeout", &args.keepalive_timeout)?,
                permit_without_stream: true,
            })
        } else {
            None
        };

        Ok(Self {
            channel: ChannelConfig {
                target_addr: args.target_addr,
                trust,
                material: CertificateMaterial {
                    certificate: args.cert,
                    private_key: args.key,
                    ca_certificate: args.cacert,
                },
                domain_override: args.tls_domain,
                keepalive,
            },
            call_deadline: parse_option("call-deadline", &args.call_deadline)?,
            plan: InvocationPlan {
                worker_count: args.workers,
                loops_per_worker: args.loops,
                payload_size_bytes: args.payload_size,
            },
            delay_ms: args.delay_ms,
            name: args.name,
            procedure: args.procedure,
            policy: args.policy,
        })
    }
}

fn parse_option(option: &'static str, input: &str) -> Result<Duration, ConfigError> {
    volley_tonic_core::parse_duration(input)
        .map_err(|source| ConfigError::InvalidDuration { option, source })
}
